//! Sealing engine: one fresh session key per value.
//!
//! ```text
//! session_key  <- 32 random bytes
//! wrapped_key  <- RSA-OAEP-SHA256(recipient, label = scope label)(session_key)
//! aead_ct      <- AES-256-GCM(session_key, zero nonce)(plaintext)
//! blob         <- u16_be(len(wrapped_key)) || wrapped_key || aead_ct
//! value        <- base64(blob)
//! ```

use alloc::collections::BTreeMap;
use alloc::string::String;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::branded::{CiphertextValue, PlaintextValue};
use crate::error::CryptoError;
use crate::kem::SealingKey;
use crate::label::SealingScope;
use crate::{aead, wire};

/// Seal one value for the object `namespace/name` under `scope`.
pub fn encrypt_value(
    key: &SealingKey,
    plaintext: &PlaintextValue,
    namespace: &str,
    name: &str,
    scope: SealingScope,
) -> Result<CiphertextValue, CryptoError> {
    let label = scope.label(namespace, name);
    seal_with_label(key, plaintext.as_bytes(), &label)
}

/// Seal every pair, all or nothing: the first failure is returned and no
/// partial map escapes.
pub fn encrypt_key_values<'a, I>(
    key: &SealingKey,
    pairs: I,
    namespace: &str,
    name: &str,
    scope: SealingScope,
) -> Result<BTreeMap<String, CiphertextValue>, CryptoError>
where
    I: IntoIterator<Item = (&'a str, &'a PlaintextValue)>,
{
    let label = scope.label(namespace, name);
    let mut out = BTreeMap::new();
    for (k, v) in pairs {
        let sealed = seal_with_label(key, v.as_bytes(), &label).map_err(|e| CryptoError::Value {
            key: k.into(),
            source: alloc::boxed::Box::new(e),
        })?;
        out.insert(String::from(k), sealed);
    }
    Ok(out)
}

/// Seal raw bytes under an explicit label.
pub fn seal_with_label(
    key: &SealingKey,
    plaintext: &[u8],
    label: &str,
) -> Result<CiphertextValue, CryptoError> {
    let session_key = aead::session_key()?;
    let wrapped_key = key.wrap(&session_key, label)?;
    let aead_ct = aead::aead_seal(&session_key, plaintext)?;
    let blob = wire::encode_wire(&wrapped_key, &aead_ct)?;
    Ok(CiphertextValue::new(STANDARD.encode(blob)))
}

// ---------------------------------------------------------------------------
// Inspection utilities (for ops/debugging)
// ---------------------------------------------------------------------------

/// Sealed value metadata (extracted without decrypting).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiphertextInfo {
    /// Wrapped session key size; equals the recipient modulus size.
    pub wrapped_key_bytes: usize,
    /// Total decoded blob length.
    pub total_bytes: usize,
    /// Plaintext length (AES-GCM does not pad).
    pub plaintext_bytes: usize,
}

impl core::fmt::Display for CiphertextInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "RSA-{}-OAEP + AES-256-GCM | {} bytes ({} plaintext)",
            self.wrapped_key_bytes * 8,
            self.total_bytes,
            self.plaintext_bytes
        )
    }
}

/// Inspect a sealed value without decrypting it.
pub fn inspect(value: &CiphertextValue) -> Result<CiphertextInfo, CryptoError> {
    let blob = STANDARD
        .decode(value.as_str())
        .map_err(|_| CryptoError::MalformedCiphertext("not base64"))?;
    let parts = wire::decode_wire(&blob)?;
    Ok(CiphertextInfo {
        wrapped_key_bytes: parts.wrapped_key.len(),
        total_bytes: blob.len(),
        plaintext_bytes: parts.plaintext_len(),
    })
}
