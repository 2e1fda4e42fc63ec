//! Error types for the sealing client.

use sealed_envelope::{CryptoError, ValidationError};
use std::fmt;

use crate::retry::RetryError;

// ---------------------------------------------------------------------------
// Top-level sealing error
// ---------------------------------------------------------------------------

/// Why a call to [`SecretSealer::encrypt`](crate::SecretSealer::encrypt) failed.
///
/// Certificate expiry is not an error; it travels in the result as an advisory.
#[derive(Debug)]
pub enum SealingError {
    /// Input rejected before any network or crypto work.
    Validation(ValidationError),
    /// Certificate could not be fetched within the retry budget.
    Network(RetryError),
    /// Certificate unusable or encryption failed. Never retried.
    Crypto(CryptoError),
}

impl fmt::Display for SealingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "validation failed: {}", e),
            Self::Network(e) => write!(f, "could not fetch sealing certificate: {}", e),
            Self::Crypto(e) => write!(f, "encryption failed: {}", e),
        }
    }
}

impl std::error::Error for SealingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Network(e) => Some(e),
            Self::Crypto(e) => Some(e),
        }
    }
}

impl From<ValidationError> for SealingError {
    fn from(e: ValidationError) -> Self { Self::Validation(e) }
}

impl From<RetryError> for SealingError {
    fn from(e: RetryError) -> Self { Self::Network(e) }
}

impl From<CryptoError> for SealingError {
    fn from(e: CryptoError) -> Self { Self::Crypto(e) }
}

// ---------------------------------------------------------------------------
// Certificate fetch
// ---------------------------------------------------------------------------

/// One failed attempt to obtain the controller certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS or timeout failure.
    Transport(String),
    /// The controller answered with a non-success status.
    Status { status: u16, url: String },
    /// The body is not a single PEM certificate.
    InvalidBody(ValidationError),
    /// Reading a certificate from disk failed.
    Io(String),
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => crate::retry::is_retryable_http_error(*status),
            Self::InvalidBody(_) | Self::Io(_) => false,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "network error: {}", msg),
            Self::Status { status, url } => {
                write!(f, "controller returned HTTP {} for {}", status, url)
            }
            Self::InvalidBody(e) => write!(f, "controller returned an invalid certificate: {}", e),
            Self::Io(msg) => write!(f, "read certificate: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        let kind = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connection refused"
        } else {
            "request failed"
        };
        Self::Transport(format!("{}: {}", kind, e))
    }
}
