//! Wire format (controller hybrid layout)
//!
//! Format:
//!   rsa_ct_len[2, big-endian] || rsa_ct[rsa_ct_len] || aead_ct[0+] || tag[16]
//!
//! rsa_ct  = RSA-OAEP-SHA256(label)(session_key[32])
//! aead_ct = AES-256-GCM(session_key, nonce = 0^12, aad = empty)(plaintext)
//!
//! The nonce is fixed and therefore not carried on the wire. There is no
//! version byte: the controller recognises the layout by position alone.

extern crate alloc;
use alloc::vec::Vec;

use crate::error::CryptoError;

// ---------------------------------------------------------------------------
// Component sizes
// ---------------------------------------------------------------------------

/// Session key size (AES-256).
pub const SESSION_KEY_BYTES: usize = 32;

pub const NONCE_BYTES: usize = 12;
pub const AEAD_TAG_BYTES: usize = 16;

/// Length prefix for the wrapped session key.
pub const HEADER_BYTES: usize = 2;

/// Wrapped key size for the 2048-bit keys the controller generates.
pub const RSA_2048_CIPHERTEXT_BYTES: usize = 256;

/// Minimum blob size for a 2048-bit recipient and an empty plaintext.
pub const MIN_CIPHERTEXT_BYTES: usize = HEADER_BYTES + RSA_2048_CIPHERTEXT_BYTES + AEAD_TAG_BYTES; // 274

/// Borrowed view of a sealed blob.
#[derive(Debug, Clone, Copy)]
pub struct WireComponents<'a> {
    pub rsa_ct_len: u16,
    pub wrapped_key: &'a [u8],
    pub aead_ciphertext: &'a [u8],
}

impl WireComponents<'_> {
    /// Length of the plaintext this blob carries.
    pub fn plaintext_len(&self) -> usize {
        self.aead_ciphertext.len() - AEAD_TAG_BYTES
    }
}

pub fn decode_wire(data: &[u8]) -> Result<WireComponents<'_>, CryptoError> {
    if data.len() < HEADER_BYTES {
        return Err(CryptoError::MalformedCiphertext("missing length prefix"));
    }

    let rsa_ct_len = u16::from_be_bytes([data[0], data[1]]);
    if rsa_ct_len == 0 {
        return Err(CryptoError::MalformedCiphertext("empty wrapped key"));
    }

    let key_start = HEADER_BYTES;
    let key_end = key_start + rsa_ct_len as usize;
    if data.len() < key_end + AEAD_TAG_BYTES {
        return Err(CryptoError::MalformedCiphertext("truncated"));
    }

    Ok(WireComponents {
        rsa_ct_len,
        wrapped_key: &data[key_start..key_end],
        aead_ciphertext: &data[key_end..],
    })
}

pub fn encode_wire(wrapped_key: &[u8], aead_ct: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let rsa_ct_len = u16::try_from(wrapped_key.len())
        .map_err(|_| CryptoError::MalformedCiphertext("wrapped key too long"))?;
    if rsa_ct_len == 0 {
        return Err(CryptoError::MalformedCiphertext("empty wrapped key"));
    }
    if aead_ct.len() < AEAD_TAG_BYTES {
        return Err(CryptoError::MalformedCiphertext("missing authentication tag"));
    }

    let mut out = Vec::with_capacity(HEADER_BYTES + wrapped_key.len() + aead_ct.len());

    out.extend_from_slice(&rsa_ct_len.to_be_bytes());
    out.extend_from_slice(wrapped_key);
    out.extend_from_slice(aead_ct);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_splits_components() {
        let wrapped = [0xAAu8; RSA_2048_CIPHERTEXT_BYTES];
        let aead = [0xBBu8; 5 + AEAD_TAG_BYTES];
        let blob = encode_wire(&wrapped, &aead).unwrap();

        assert_eq!(&blob[..2], &[0x01u8, 0x00]);
        let parts = decode_wire(&blob).unwrap();
        assert_eq!(parts.rsa_ct_len as usize, RSA_2048_CIPHERTEXT_BYTES);
        assert_eq!(parts.wrapped_key, &wrapped[..]);
        assert_eq!(parts.aead_ciphertext, &aead[..]);
        assert_eq!(parts.plaintext_len(), 5);
    }

    #[test]
    fn decode_rejects_short_input() {
        assert!(decode_wire(&[]).is_err());
        assert!(decode_wire(&[0x00]).is_err());
        assert!(decode_wire(&[0x00, 0x00, 0x01]).is_err());
        // claims 256 bytes of key but carries 10
        assert!(decode_wire(&[0x01, 0x00, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).is_err());
    }

    #[test]
    fn encode_rejects_missing_tag() {
        assert!(encode_wire(&[1u8; 256], &[0u8; 15]).is_err());
        assert!(encode_wire(&[], &[0u8; 16]).is_err());
    }

    #[test]
    fn minimum_size_constant() {
        assert_eq!(MIN_CIPHERTEXT_BYTES, 274);
    }
}
