#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;
use sealed_envelope::{inspect, seal_with_label, PemCertificate, SealingKey};

static KEY: Lazy<SealingKey> = Lazy::new(|| {
    let pem = PemCertificate::new(include_str!("../../testdata/controller.crt"));
    sealed_envelope::parse_public_key(&pem).unwrap()
});

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split = (data[0] as usize) % data.len();
    let label = String::from_utf8_lossy(&data[1..split.max(1)]);
    let plaintext = &data[split..];

    let sealed = seal_with_label(&KEY, plaintext, &label).unwrap();
    let info = inspect(&sealed).unwrap();
    assert_eq!(info.plaintext_bytes, plaintext.len());
    assert_eq!(info.wrapped_key_bytes, KEY.wrapped_len());
});
