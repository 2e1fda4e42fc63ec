//! Controller certificate: parse, inspect, extract the sealing key.
//!
//! The controller publishes a self-signed X.509 certificate whose subject
//! public key is the RSA key used to unwrap session keys. Only the key is
//! needed to seal; the rest of the certificate feeds expiry advisories.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

use crate::branded::PemCertificate;
use crate::error::CryptoError;
use crate::kem::SealingKey;

/// Days before `valid_to` at which an expiry advisory is raised.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

const SECONDS_PER_DAY: i64 = 86_400;

// ---------------------------------------------------------------------------
// Parsed certificate
// ---------------------------------------------------------------------------

/// A parsed controller certificate. Parse once per sealing operation.
#[derive(Clone, Debug)]
pub struct SealingCertificate {
    pem: PemCertificate,
    key: SealingKey,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    issuer: String,
    subject: String,
    serial_number: String,
    fingerprint: [u8; 32],
}

impl SealingCertificate {
    pub fn parse(pem: &PemCertificate) -> Result<Self, CryptoError> {
        let cert = Certificate::from_pem(pem.as_str().trim().as_bytes())
            .map_err(|e| CryptoError::MalformedCertificate(e.to_string()))?;
        let tbs = &cert.tbs_certificate;

        let spki_der = tbs
            .subject_public_key_info
            .to_der()
            .map_err(|e| CryptoError::MalformedCertificate(e.to_string()))?;
        let key = SealingKey::from_public_key_der(&spki_der)?;

        let cert_der = cert
            .to_der()
            .map_err(|e| CryptoError::MalformedCertificate(e.to_string()))?;
        let mut fingerprint = [0u8; 32];
        fingerprint.copy_from_slice(&Sha256::digest(&cert_der));

        Ok(Self {
            pem: pem.clone(),
            key,
            valid_from: to_datetime(tbs.validity.not_before.to_unix_duration())?,
            valid_to: to_datetime(tbs.validity.not_after.to_unix_duration())?,
            issuer: tbs.issuer.to_string(),
            subject: tbs.subject.to_string(),
            serial_number: hex::encode_upper(tbs.serial_number.as_bytes()),
            fingerprint,
        })
    }

    pub fn pem(&self) -> &PemCertificate {
        &self.pem
    }

    pub fn sealing_key(&self) -> &SealingKey {
        &self.key
    }

    pub fn into_sealing_key(self) -> SealingKey {
        self.key
    }

    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub fn valid_to(&self) -> DateTime<Utc> {
        self.valid_to
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// SHA-256 over the DER encoding, as `AB:CD:...`.
    pub fn fingerprint(&self) -> String {
        format_fingerprint(&self.fingerprint)
    }

    /// Constant-time check against a pinned fingerprint. Accepts the
    /// colon-separated or bare hex form, any case.
    pub fn matches_fingerprint(&self, expected: &str) -> bool {
        let cleaned: String = expected.chars().filter(|c| *c != ':').collect();
        match hex::decode(cleaned) {
            Ok(bytes) if bytes.len() == self.fingerprint.len() => {
                bool::from(self.fingerprint[..].ct_eq(bytes.as_slice()))
            }
            _ => false,
        }
    }

    /// Metadata snapshot evaluated at `now`.
    pub fn info(&self, now: DateTime<Utc>) -> CertificateInfo {
        CertificateInfo::new(
            self.valid_from,
            self.valid_to,
            self.issuer.clone(),
            self.subject.clone(),
            self.serial_number.clone(),
            self.fingerprint(),
            self.key.bits(),
            now,
        )
    }
}

fn to_datetime(since_epoch: core::time::Duration) -> Result<DateTime<Utc>, CryptoError> {
    let secs = i64::try_from(since_epoch.as_secs())
        .map_err(|_| CryptoError::MalformedCertificate("validity out of range".into()))?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| CryptoError::MalformedCertificate("validity out of range".into()))
}

fn format_fingerprint(bytes: &[u8]) -> String {
    let hex = hex::encode_upper(bytes);
    let mut out = String::with_capacity(hex.len() + hex.len() / 2);
    for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.push(pair[0] as char);
        out.push(pair[1] as char);
    }
    out
}

// ---------------------------------------------------------------------------
// Certificate metadata
// ---------------------------------------------------------------------------

/// Read-only certificate metadata for display and advisories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub issuer: String,
    pub subject: String,
    pub serial_number: String,
    pub fingerprint: String,
    pub key_bits: usize,
    pub is_expired: bool,
    /// Whole days until `valid_to`, rounded down. Negative once expired.
    pub days_until_expiry: i64,
}

impl CertificateInfo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
        issuer: String,
        subject: String,
        serial_number: String,
        fingerprint: String,
        key_bits: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            valid_from,
            valid_to,
            issuer,
            subject,
            serial_number,
            fingerprint,
            key_bits,
            is_expired: now > valid_to,
            days_until_expiry: days_until(valid_to, now),
        }
    }

    /// Non-fatal notice for an expired or soon-to-expire certificate.
    pub fn advisory(&self) -> Option<ExpiryAdvisory> {
        if self.is_expired {
            Some(ExpiryAdvisory::Expired {
                valid_to: self.valid_to,
                days_ago: -self.days_until_expiry,
            })
        } else if self.days_until_expiry <= EXPIRY_WARNING_DAYS {
            Some(ExpiryAdvisory::ExpiringSoon {
                valid_to: self.valid_to,
                days_left: self.days_until_expiry,
            })
        } else {
            None
        }
    }
}

/// Floor of whole days from `now` to `valid_to`.
pub fn days_until(valid_to: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (valid_to - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Certificate lifetime notice. Never blocks sealing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExpiryAdvisory {
    Expired { valid_to: DateTime<Utc>, days_ago: i64 },
    ExpiringSoon { valid_to: DateTime<Utc>, days_left: i64 },
}

impl fmt::Display for ExpiryAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired { valid_to, days_ago } => write!(
                f,
                "sealing certificate expired on {} ({} days ago); the controller may have rotated its key",
                valid_to.format("%Y-%m-%d"),
                days_ago
            ),
            Self::ExpiringSoon { valid_to, days_left } => write!(
                f,
                "sealing certificate expires on {} ({} days left)",
                valid_to.format("%Y-%m-%d"),
                days_left
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Extract the sealing key from a PEM certificate.
pub fn parse_public_key(pem: &PemCertificate) -> Result<SealingKey, CryptoError> {
    SealingCertificate::parse(pem).map(SealingCertificate::into_sealing_key)
}

/// Extract certificate metadata evaluated at `now`.
pub fn parse_certificate_info(
    pem: &PemCertificate,
    now: DateTime<Utc>,
) -> Result<CertificateInfo, CryptoError> {
    SealingCertificate::parse(pem).map(|cert| cert.info(now))
}
