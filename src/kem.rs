//! Session key wrapping: RSA-OAEP with SHA-256 (digest and MGF1).
//!
//! The scope label (see [`crate::label`]) is the OAEP label, so unwrapping
//! under any other label fails inside the controller before AES-GCM runs.
//!
//! Wrapped key size equals the modulus size (256 bytes for RSA-2048).

extern crate alloc;
use alloc::vec::Vec;

use rand_core::OsRng;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;

use crate::error::CryptoError;
use crate::wire::SESSION_KEY_BYTES;

/// Smallest modulus the engine will wrap to.
pub const MIN_MODULUS_BITS: usize = 2048;

/// Recipient public key extracted from the controller certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealingKey {
    inner: RsaPublicKey,
}

impl SealingKey {
    pub fn from_rsa(inner: RsaPublicKey) -> Result<Self, CryptoError> {
        let bits = inner.size() * 8;
        if bits < MIN_MODULUS_BITS {
            return Err(CryptoError::UnsupportedKey(format!(
                "RSA modulus of {} bits is below {}",
                bits, MIN_MODULUS_BITS
            )));
        }
        Ok(Self { inner })
    }

    /// Parse a DER `SubjectPublicKeyInfo`.
    pub fn from_public_key_der(der: &[u8]) -> Result<Self, CryptoError> {
        let inner = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| CryptoError::UnsupportedKey(e.to_string()))?;
        Self::from_rsa(inner)
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.inner.size() * 8
    }

    /// Size of a wrapped session key for this recipient.
    pub fn wrapped_len(&self) -> usize {
        self.inner.size()
    }

    pub fn as_rsa(&self) -> &RsaPublicKey {
        &self.inner
    }

    /// Wrap a session key under `label`. An empty label is the
    /// cluster-wide case and hashes the same as "no label".
    pub fn wrap(
        &self,
        session_key: &[u8; SESSION_KEY_BYTES],
        label: &str,
    ) -> Result<Vec<u8>, CryptoError> {
        let padding = if label.is_empty() {
            Oaep::new::<Sha256>()
        } else {
            Oaep::new_with_label::<Sha256, _>(label)
        };
        self.inner
            .encrypt(&mut OsRng, padding, session_key)
            .map_err(|e| CryptoError::KeyWrap(e.to_string()))
    }
}
