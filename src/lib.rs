//! # sealed-envelope
//!
//! Client-side hybrid encryption for Kubernetes `SealedSecret` resources.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sealed_envelope::{encrypt_value, parse_public_key, PemCertificate, PlaintextValue, SealingScope};
//!
//! let pem = PemCertificate::new(std::fs::read_to_string("cert.pem").unwrap());
//! let key = parse_public_key(&pem).unwrap();
//!
//! let sealed = encrypt_value(
//!     &key,
//!     &PlaintextValue::new("p@ss"),
//!     "prod",
//!     "db-creds",
//!     SealingScope::Strict,
//! )
//! .unwrap();
//! println!("{}", sealed);
//! ```
//!
//! ## Security Properties
//!
//! - **Fresh session key per value**: RSA-OAEP wraps 32 random bytes
//! - **Scope binding**: namespace/name label is the OAEP label
//! - **Controller-compatible wire format**: `u16 len || wrapped key || AES-GCM`
//! - **Typed values**: plaintext and ciphertext cannot be swapped at compile time
//!
//! ## What's NOT Provided
//!
//! - Decryption (the in-cluster controller owns the private key)
//! - Key management or rotation
//! - Network access (see the `sealed-client` crate)

#![deny(unsafe_code)]

extern crate alloc;

// ---------------------------------------------------------------------------
// Internal modules (not part of public API)
// ---------------------------------------------------------------------------

mod aead;
mod error;

// Wire module is public for tests and fuzzing but should not be considered
// stable API
#[doc(hidden)]
pub mod wire;

// ---------------------------------------------------------------------------
// Public modules
// ---------------------------------------------------------------------------

pub mod branded;
pub mod certificate;
pub mod envelope;
pub mod kem;
pub mod label;
pub mod validate;

pub use branded::{Base64Value, CiphertextValue, PemCertificate, PlaintextValue};
pub use certificate::{
    days_until, parse_certificate_info, parse_public_key, CertificateInfo, ExpiryAdvisory,
    SealingCertificate, EXPIRY_WARNING_DAYS,
};
pub use envelope::{encrypt_key_values, encrypt_value, inspect, seal_with_label, CiphertextInfo};
pub use error::{CryptoError, ValidationError};
pub use kem::SealingKey;
pub use label::{ParseScopeError, SealingScope, CLUSTER_WIDE_ANNOTATION, NAMESPACE_WIDE_ANNOTATION};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum sealed blob size in bytes for a 2048-bit recipient.
pub const MIN_CIPHERTEXT_BYTES: usize = wire::MIN_CIPHERTEXT_BYTES;
