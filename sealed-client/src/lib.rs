//! # sealed-client
//!
//! Fetches the sealing controller's certificate, seals secret values with
//! `sealed-envelope`, and assembles the `SealedSecret` document to submit.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sealed_client::{ControllerConfig, EncryptionRequest, SecretSealer};
//! use sealed_envelope::{PlaintextValue, SealingScope};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let sealer = SecretSealer::from_config(ControllerConfig::from_env())?;
//!
//! let request = EncryptionRequest::new("db-creds", "prod", SealingScope::Strict)
//!     .with_value("password", PlaintextValue::new("p@ss"));
//!
//! let result = sealer.encrypt(&request).await?;
//! for advisory in &result.advisories {
//!     eprintln!("warning: {}", advisory);
//! }
//! println!("{}", serde_json::to_string_pretty(&result.document)?);
//! # Ok(())
//! # }
//! ```
//!
//! Only the certificate fetch is retried. Validation and crypto failures are
//! returned on the first occurrence.

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod fault;
pub mod resource;
pub mod retry;
pub mod sealer;

// Re-export main types for convenience
pub use cache::{CachedCertificate, CertificateCache, DEFAULT_TTL};
pub use config::ControllerConfig;
pub use controller::{
    CertificateSource, FileCertificateSource, HttpCertificateSource, StaticCertificateSource,
};
pub use error::{FetchError, SealingError};
pub use fault::{try_catch, try_catch_async, Fault};
pub use resource::{ObjectMeta, SealedSecret, SealedSecretSpec, SecretTemplate};
pub use retry::{
    is_network_error, is_retryable_http_error, retry_with_backoff, RetryError, RetryOptions,
};
pub use sealer::{Advisory, EncryptionRequest, EncryptionResult, SecretSealer};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
