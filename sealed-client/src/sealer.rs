//! Encryption orchestration: validate, fetch, seal, assemble.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sealed_envelope::validate::{validate_key, validate_namespace, validate_resource_name, validate_value};
use sealed_envelope::{
    encrypt_key_values, CertificateInfo, CiphertextValue, ExpiryAdvisory, PemCertificate,
    PlaintextValue, SealingCertificate, SealingScope, ValidationError,
};
use serde::Serialize;

use crate::cache::CertificateCache;
use crate::config::ControllerConfig;
use crate::controller::{CertificateSource, HttpCertificateSource};
use crate::error::{FetchError, SealingError};
use crate::resource::SealedSecret;
use crate::retry::{is_network_error, retry_with_backoff, RetryOptions};

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

/// What to seal. Values are kept in insertion order.
#[derive(Clone, Debug)]
pub struct EncryptionRequest {
    pub name: String,
    pub namespace: String,
    pub scope: SealingScope,
    pub values: Vec<(String, PlaintextValue)>,
    /// Secret `type` for the template; `Opaque` when unset.
    pub secret_type: Option<String>,
    pub labels: BTreeMap<String, String>,
}

impl EncryptionRequest {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, scope: SealingScope) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            scope,
            values: Vec::new(),
            secret_type: None,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: PlaintextValue) -> Self {
        self.values.push((key.into(), value));
        self
    }

    pub fn with_secret_type(mut self, secret_type: impl Into<String>) -> Self {
        self.secret_type = Some(secret_type.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Check every field without touching the network.
    ///
    /// Order: name, namespace, then each pair's key (including duplicates)
    /// and value. The first failure is returned.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_resource_name(&self.name)?;
        validate_namespace(&self.namespace)?;
        if self.values.is_empty() {
            return Err(ValidationError::NoValues);
        }

        let mut seen = BTreeSet::new();
        for (key, value) in &self.values {
            validate_key(key)?;
            if !seen.insert(key.as_str()) {
                return Err(ValidationError::DuplicateKey(key.clone()));
            }
            validate_value(key, value.as_str())?;
        }
        Ok(())
    }
}

/// Non-fatal notice attached to a successful result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "advisory", rename_all = "kebab-case")]
pub enum Advisory {
    CertificateExpiry(ExpiryAdvisory),
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CertificateExpiry(a) => a.fmt(f),
        }
    }
}

/// Output of a successful [`SecretSealer::encrypt`].
#[derive(Clone, Debug)]
pub struct EncryptionResult {
    pub encrypted_data: BTreeMap<String, CiphertextValue>,
    pub certificate: CertificateInfo,
    pub advisories: Vec<Advisory>,
    pub document: SealedSecret,
}

// ---------------------------------------------------------------------------
// Sealer
// ---------------------------------------------------------------------------

/// Seals secrets against the controller's current certificate.
///
/// Share it behind an `Arc`; concurrent `encrypt` calls are allowed and
/// counted by [`is_busy`](Self::is_busy).
pub struct SecretSealer {
    source: Arc<dyn CertificateSource>,
    cache: Arc<CertificateCache>,
    retry: RetryOptions,
    in_flight: AtomicUsize,
}

impl SecretSealer {
    pub fn new(source: Arc<dyn CertificateSource>) -> Self {
        Self {
            source,
            cache: Arc::new(CertificateCache::new()),
            retry: RetryOptions::default().with_retryable(is_network_error),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Sealer backed by the controller's HTTP endpoint.
    pub fn from_config(config: ControllerConfig) -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(HttpCertificateSource::new(config)?)))
    }

    /// Share a cache between sealers.
    pub fn with_cache(mut self, cache: Arc<CertificateCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &Arc<CertificateCache> {
        &self.cache
    }

    /// True while any `encrypt` call is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Seal `request` and build its `SealedSecret` document.
    pub async fn encrypt(&self, request: &EncryptionRequest) -> Result<EncryptionResult, SealingError> {
        self.encrypt_at(request, Utc::now()).await
    }

    /// As [`encrypt`](Self::encrypt), evaluating certificate expiry at `now`.
    pub async fn encrypt_at(
        &self,
        request: &EncryptionRequest,
        now: DateTime<Utc>,
    ) -> Result<EncryptionResult, SealingError> {
        let _guard = InFlight::enter(&self.in_flight);

        request.validate()?;

        let cert = self.sealing_certificate().await?;

        let certificate = cert.info(now);
        let mut advisories = Vec::new();
        if let Some(a) = certificate.advisory() {
            tracing::warn!(
                fingerprint = %certificate.fingerprint,
                days_until_expiry = certificate.days_until_expiry,
                "{}",
                a
            );
            advisories.push(Advisory::CertificateExpiry(a));
        }

        let pairs = request.values.iter().map(|(k, v)| (k.as_str(), v));
        let encrypted_data = encrypt_key_values(
            cert.sealing_key(),
            pairs,
            &request.namespace,
            &request.name,
            request.scope,
        )?;

        let document = SealedSecret::assemble(
            &request.name,
            &request.namespace,
            request.scope,
            encrypted_data.clone(),
            request.labels.clone(),
            request.secret_type.as_deref(),
        );

        tracing::info!(
            name = %request.name,
            namespace = %request.namespace,
            scope = %request.scope,
            keys = encrypted_data.len(),
            advisories = advisories.len(),
            "sealed secret"
        );

        Ok(EncryptionResult {
            encrypted_data,
            certificate,
            advisories,
            document,
        })
    }

    /// Current certificate: cached snapshot if fresh, otherwise a retried fetch.
    pub async fn certificate(&self) -> Result<PemCertificate, SealingError> {
        if let Some(cached) = self.cache.get() {
            tracing::debug!(source = %self.source.describe(), "certificate cache hit");
            return Ok(cached.pem.clone());
        }

        let pem = retry_with_backoff(|| self.source.fetch_certificate(), &self.retry).await?;
        self.cache.set(pem.clone());
        Ok(pem)
    }

    /// Metadata of the current certificate, fetched and retried like
    /// [`encrypt`](Self::encrypt) does.
    pub async fn certificate_info(
        &self,
        now: DateTime<Utc>,
    ) -> Result<CertificateInfo, SealingError> {
        Ok(self.sealing_certificate().await?.info(now))
    }

    async fn sealing_certificate(&self) -> Result<SealingCertificate, SealingError> {
        let pem = self.certificate().await?;
        SealingCertificate::parse(&pem).map_err(|e| {
            // a cached certificate that cannot be used must not be served again
            self.cache.clear();
            SealingError::from(e)
        })
    }
}

impl fmt::Debug for SecretSealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretSealer")
            .field("source", &self.source.describe())
            .field("retry", &self.retry)
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish()
    }
}

/// Holds the in-flight count up for the lifetime of one `encrypt`, including
/// early returns and a dropped future.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
