//! Nominal string types.
//!
//! Plaintext, ciphertext, generic base64 and PEM certificates share a `String`
//! representation but must never be confused. Each wrapper is entered through
//! `new` and left through `into_inner`; there are no implicit conversions, so
//! passing a [`CiphertextValue`] where a [`PlaintextValue`] is expected does
//! not compile.
//!
//! Constructors do not validate. Use [`crate::validate`] before labelling
//! untrusted input.

use core::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// Plaintext
// ---------------------------------------------------------------------------

/// A secret value before encryption.
///
/// `Debug` is redacted and the buffer is wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PlaintextValue(String);

impl PlaintextValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Leave the plaintext domain. The caller takes over responsibility for
    /// wiping the returned buffer.
    pub fn into_inner(mut self) -> String {
        core::mem::take(&mut self.0)
    }
}

impl fmt::Debug for PlaintextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlaintextValue(<{} bytes redacted>)", self.0.len())
    }
}

// ---------------------------------------------------------------------------
// Ciphertext
// ---------------------------------------------------------------------------

/// Base64 output of the sealing engine, ready for `spec.encryptedData`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CiphertextValue(String);

impl CiphertextValue {
    /// Label a string as ciphertext. Only the engine and callers that already
    /// hold sealed data (e.g. read back from a cluster) should do this.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CiphertextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Base64
// ---------------------------------------------------------------------------

/// Base64 text with no further meaning attached (e.g. a Secret `data` field).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base64Value(String);

impl Base64Value {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// ---------------------------------------------------------------------------
// PEM certificate
// ---------------------------------------------------------------------------

/// PEM-encoded X.509 certificate text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PemCertificate(String);

impl PemCertificate {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
