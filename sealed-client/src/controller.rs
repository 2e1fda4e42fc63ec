//! Certificate sources: where the sealing certificate comes from.

use std::path::PathBuf;

use futures::future::BoxFuture;
use futures::FutureExt;
use sealed_envelope::validate::validate_certificate_pem;
use sealed_envelope::PemCertificate;

use crate::config::ControllerConfig;
use crate::error::FetchError;

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// One attempt at obtaining the controller's PEM certificate.
///
/// Implementations do not retry; the sealer wraps calls in
/// [`retry_with_backoff`](crate::retry::retry_with_backoff).
pub trait CertificateSource: Send + Sync {
    fn fetch_certificate(&self) -> BoxFuture<'_, Result<PemCertificate, FetchError>>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}

fn checked(body: String) -> Result<PemCertificate, FetchError> {
    validate_certificate_pem(&body).map_err(FetchError::InvalidBody)?;
    Ok(PemCertificate::new(body))
}

// ---------------------------------------------------------------------------
// HTTP source
// ---------------------------------------------------------------------------

/// Fetches `GET {base}/v1/cert.pem` from the controller service.
#[derive(Clone, Debug)]
pub struct HttpCertificateSource {
    client: reqwest::Client,
    config: ControllerConfig,
}

impl HttpCertificateSource {
    pub fn new(config: ControllerConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("build client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Reuse an existing client. Its timeout settings are kept as they are.
    pub fn with_client(client: reqwest::Client, config: ControllerConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    async fn get_certificate(&self) -> Result<PemCertificate, FetchError> {
        let url = self.config.cert_url();
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/x-pem-file, text/plain")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url });
        }

        let body = resp.text().await?;
        tracing::debug!(url = %url, bytes = body.len(), "fetched controller certificate");
        checked(body)
    }

    /// `GET {base}/healthz`; `Ok(())` on any 2xx.
    pub async fn health(&self) -> Result<(), FetchError> {
        let url = self.config.healthz_url();
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(FetchError::Status { status: status.as_u16(), url })
        }
    }
}

impl CertificateSource for HttpCertificateSource {
    fn fetch_certificate(&self) -> BoxFuture<'_, Result<PemCertificate, FetchError>> {
        self.get_certificate().boxed()
    }

    fn describe(&self) -> String {
        self.config.cert_url()
    }
}

// ---------------------------------------------------------------------------
// Static source
// ---------------------------------------------------------------------------

/// Serves a certificate already in memory (offline sealing, tests).
#[derive(Clone, Debug)]
pub struct StaticCertificateSource {
    pem: PemCertificate,
}

impl StaticCertificateSource {
    pub fn new(pem: PemCertificate) -> Self {
        Self { pem }
    }
}

impl CertificateSource for StaticCertificateSource {
    fn fetch_certificate(&self) -> BoxFuture<'_, Result<PemCertificate, FetchError>> {
        let pem = self.pem.clone();
        async move { checked(pem.into_inner()) }.boxed()
    }

    fn describe(&self) -> String {
        "static certificate".into()
    }
}

// ---------------------------------------------------------------------------
// File source
// ---------------------------------------------------------------------------

/// Reads the certificate from disk on every fetch.
#[derive(Clone, Debug)]
pub struct FileCertificateSource {
    path: PathBuf,
}

impl FileCertificateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CertificateSource for FileCertificateSource {
    fn fetch_certificate(&self) -> BoxFuture<'_, Result<PemCertificate, FetchError>> {
        async move {
            let body = tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| FetchError::Io(format!("{}: {}", self.path.display(), e)))?;
            checked(body)
        }
        .boxed()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
