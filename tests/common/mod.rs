//! Shared fixtures and a test-side opener that mirrors the controller.

#![allow(dead_code)]

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Oaep, RsaPrivateKey};
use sha2::Sha256;

use sealed_envelope::{wire, CiphertextValue, PemCertificate};

pub const CONTROLLER_CERT: &str = include_str!("../../testdata/controller.crt");
pub const CONTROLLER_KEY: &str = include_str!("../../testdata/controller.key");
pub const EXPIRED_CERT: &str = include_str!("../../testdata/expired.crt");
pub const EC_CERT: &str = include_str!("../../testdata/ec.crt");

pub fn controller_cert() -> PemCertificate {
    PemCertificate::new(CONTROLLER_CERT)
}

pub fn controller_key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(CONTROLLER_KEY).expect("fixture key")
}

/// Open a sealed value the way the controller does: split the blob,
/// unwrap the session key under `label`, then AES-GCM with a zero nonce.
pub fn open(sk: &RsaPrivateKey, value: &CiphertextValue, label: &str) -> Result<Vec<u8>, String> {
    let blob = STANDARD.decode(value.as_str()).map_err(|e| e.to_string())?;
    let parts = wire::decode_wire(&blob).map_err(|e| e.to_string())?;

    let padding = if label.is_empty() {
        Oaep::new::<Sha256>()
    } else {
        Oaep::new_with_label::<Sha256, _>(label)
    };
    let session_key = sk
        .decrypt(padding, parts.wrapped_key)
        .map_err(|e| e.to_string())?;

    let cipher = Aes256Gcm::new_from_slice(&session_key).map_err(|e| e.to_string())?;
    cipher
        .decrypt(Nonce::from_slice(&[0u8; 12]), parts.aead_ciphertext)
        .map_err(|e| e.to_string())
}
