//! AEAD: AES-256-GCM under a single-use session key.
//!
//! The controller opens the payload with an all-zero nonce. That is sound
//! only because every session key seals exactly one value, so the nonce is
//! never transmitted and never reused under the same key.

extern crate alloc;
use alloc::vec::Vec;

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use getrandom::getrandom;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::wire::{NONCE_BYTES, SESSION_KEY_BYTES};

/// Nonce paired with every session key.
pub const ZERO_NONCE: [u8; NONCE_BYTES] = [0u8; NONCE_BYTES];

/// Generate a fresh 32-byte session key.
pub fn session_key() -> Result<Zeroizing<[u8; SESSION_KEY_BYTES]>, CryptoError> {
    let mut key = Zeroizing::new([0u8; SESSION_KEY_BYTES]);
    getrandom(&mut key[..]).map_err(|_| CryptoError::Random)?;
    Ok(key)
}

/// AEAD seal. Output is `ciphertext || tag[16]`, no associated data.
pub fn aead_seal(
    key: &[u8; SESSION_KEY_BYTES],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::Aead)?;
    let n = Nonce::from_slice(&ZERO_NONCE);
    let payload = Payload {
        msg: plaintext,
        aad: &[],
    };
    cipher.encrypt(n, payload).map_err(|_| CryptoError::Aead)
}
