#![no_main]

use libfuzzer_sys::fuzz_target;
use sealed_envelope::wire::{decode_wire, AEAD_TAG_BYTES, HEADER_BYTES};

fuzz_target!(|data: &[u8]| {
    if let Ok(parts) = decode_wire(data) {
        assert_eq!(parts.wrapped_key.len(), parts.rsa_ct_len as usize);
        assert!(parts.aead_ciphertext.len() >= AEAD_TAG_BYTES);
        assert_eq!(
            HEADER_BYTES + parts.wrapped_key.len() + parts.aead_ciphertext.len(),
            data.len()
        );
    }

    let text = String::from_utf8_lossy(data);
    let _ = sealed_envelope::inspect(&sealed_envelope::CiphertextValue::new(text));
});
