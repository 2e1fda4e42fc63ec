//! Error types for sealed-envelope.

use core::fmt;

/// Failure of a certificate or encryption primitive.
///
/// Never retried: parsing and encryption are deterministic in their inputs,
/// so a second attempt fails the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The PEM envelope or DER body could not be decoded.
    MalformedCertificate(String),
    /// The certificate carries a key that is not RSA.
    UnsupportedKey(String),
    /// RSA-OAEP wrapping of the session key failed.
    KeyWrap(String),
    /// AES-GCM sealing failed.
    Aead,
    /// The system RNG could not produce a session key.
    Random,
    /// A sealed blob does not follow the controller layout.
    MalformedCiphertext(&'static str),
    /// Encryption of one key in a batch failed.
    Value { key: String, source: Box<CryptoError> },
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedCertificate(msg) => write!(f, "malformed certificate: {}", msg),
            Self::UnsupportedKey(msg) => write!(f, "unsupported certificate key: {}", msg),
            Self::KeyWrap(msg) => write!(f, "session key wrapping failed: {}", msg),
            Self::Aead => write!(f, "symmetric encryption failed"),
            Self::Random => write!(f, "random number generator unavailable"),
            Self::MalformedCiphertext(msg) => write!(f, "malformed ciphertext: {}", msg),
            Self::Value { key, source } => write!(f, "failed to encrypt key '{}': {}", key, source),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Input rejected by a validator. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    NameTooLong { len: usize },
    InvalidName(String),
    EmptyNamespace,
    NamespaceTooLong { len: usize },
    InvalidNamespace(String),
    EmptyKey,
    KeyTooLong { len: usize },
    InvalidKey(String),
    DuplicateKey(String),
    EmptyValue { key: String },
    ValueTooLarge { key: String, bytes: usize },
    NoValues,
    InvalidCertificate(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::validate::{MAX_NAME_LEN, MAX_NAMESPACE_LEN, MAX_VALUE_BYTES};

        match self {
            Self::EmptyName => write!(f, "name is required"),
            Self::NameTooLong { len } => {
                write!(f, "name must be at most {} characters (got {})", MAX_NAME_LEN, len)
            }
            Self::InvalidName(name) => write!(
                f,
                "invalid name '{}': use lowercase letters, digits, '-' and '.', starting and ending with a letter or digit",
                name
            ),
            Self::EmptyNamespace => write!(f, "namespace is required"),
            Self::NamespaceTooLong { len } => write!(
                f,
                "namespace must be at most {} characters (got {})",
                MAX_NAMESPACE_LEN, len
            ),
            Self::InvalidNamespace(ns) => write!(
                f,
                "invalid namespace '{}': use lowercase letters, digits and '-', starting and ending with a letter or digit",
                ns
            ),
            Self::EmptyKey => write!(f, "key name is required"),
            Self::KeyTooLong { len } => {
                write!(f, "key name must be at most {} characters (got {})", MAX_NAME_LEN, len)
            }
            Self::InvalidKey(key) => write!(
                f,
                "invalid key name '{}': use letters, digits, '-', '_' and '.', starting and ending with a letter or digit",
                key
            ),
            Self::DuplicateKey(key) => write!(f, "duplicate key name '{}'", key),
            Self::EmptyValue { key } => write!(f, "value for '{}' must not be empty", key),
            Self::ValueTooLarge { key, bytes } => write!(
                f,
                "value for '{}' is {} bytes; the limit is {} bytes",
                key, bytes, MAX_VALUE_BYTES
            ),
            Self::NoValues => write!(f, "at least one key/value pair is required"),
            Self::InvalidCertificate(reason) => write!(f, "invalid certificate: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}
