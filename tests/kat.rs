//! Known-answer tests against the fixture certificates in `testdata/`.

mod common;

use chrono::{TimeZone, Utc};
use sealed_envelope::{
    inspect, parse_certificate_info, parse_public_key, CryptoError, ExpiryAdvisory,
    PemCertificate, PlaintextValue, SealingCertificate, SealingScope, MIN_CIPHERTEXT_BYTES,
};

use common::{controller_cert, CONTROLLER_CERT, EC_CERT, EXPIRED_CERT};

const CONTROLLER_FINGERPRINT: &str =
    "0A:3F:C1:1F:1B:1D:FF:EB:9A:A4:33:CF:73:66:48:84:7F:7C:AE:21:6B:EC:41:22:CC:0E:38:89:67:4C:BF:94";
const CONTROLLER_SERIAL: &str = "504A15D416DE20B15EBC68E5FD119E046572E5B6";

#[test]
fn test_controller_certificate_metadata() {
    let cert = SealingCertificate::parse(&controller_cert()).unwrap();

    assert_eq!(cert.valid_from(), Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(cert.valid_to(), Utc.with_ymd_and_hms(2035, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(cert.fingerprint(), CONTROLLER_FINGERPRINT);
    assert_eq!(cert.serial_number(), CONTROLLER_SERIAL);
    assert!(cert.subject().contains("CN=sealed-secret"));
    assert!(cert.issuer().contains("O=sealed-secret"));
    assert_eq!(cert.sealing_key().bits(), 2048);
}

#[test]
fn test_fingerprint_pinning() {
    let cert = SealingCertificate::parse(&controller_cert()).unwrap();
    assert!(cert.matches_fingerprint(CONTROLLER_FINGERPRINT));
    assert!(cert.matches_fingerprint(&CONTROLLER_FINGERPRINT.replace(':', "").to_lowercase()));
    assert!(!cert.matches_fingerprint(&CONTROLLER_FINGERPRINT.replace("0A", "0B")));
    assert!(!cert.matches_fingerprint("not hex"));
    assert!(!cert.matches_fingerprint("0A:3F"));
}

#[test]
fn test_info_for_valid_certificate() {
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
    let info = parse_certificate_info(&controller_cert(), now).unwrap();
    assert!(!info.is_expired);
    assert!(info.days_until_expiry > 3000);
    assert_eq!(info.advisory(), None);
    assert_eq!(info.key_bits, 2048);
}

#[test]
fn test_info_for_expired_certificate() {
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
    let info = parse_certificate_info(&PemCertificate::new(EXPIRED_CERT), now).unwrap();
    assert!(info.is_expired);
    assert!(info.days_until_expiry < 0);
    assert!(matches!(info.advisory(), Some(ExpiryAdvisory::Expired { .. })));
}

#[test]
fn test_expired_certificate_still_seals() {
    let pk = parse_public_key(&PemCertificate::new(EXPIRED_CERT)).unwrap();
    let ct = sealed_envelope::encrypt_value(
        &pk,
        &PlaintextValue::new("v"),
        "ns",
        "n",
        SealingScope::Strict,
    );
    assert!(ct.is_ok());
}

#[test]
fn test_non_rsa_certificate_rejected() {
    let err = parse_public_key(&PemCertificate::new(EC_CERT)).unwrap_err();
    assert!(matches!(err, CryptoError::UnsupportedKey(_)));
}

#[test]
fn test_malformed_certificates_rejected() {
    let garbage = PemCertificate::new("-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n");
    assert!(matches!(
        parse_public_key(&garbage),
        Err(CryptoError::MalformedCertificate(_))
    ));
    assert!(parse_public_key(&PemCertificate::new("")).is_err());

    // truncated body
    let truncated = CONTROLLER_CERT.replacen("MII", "MIA", 1);
    assert!(parse_public_key(&PemCertificate::new(truncated)).is_err());
}

#[test]
fn test_surrounding_whitespace_accepted() {
    let padded = format!("\n\n{}\n  ", CONTROLLER_CERT);
    assert!(parse_public_key(&PemCertificate::new(padded)).is_ok());
}

#[test]
fn test_inspect_sealed_value() {
    let pk = parse_public_key(&controller_cert()).unwrap();
    let ct = sealed_envelope::encrypt_value(
        &pk,
        &PlaintextValue::new("abc"),
        "ns",
        "n",
        SealingScope::Strict,
    )
    .unwrap();
    let info = inspect(&ct).unwrap();
    assert_eq!(info.wrapped_key_bytes, 256);
    assert_eq!(info.plaintext_bytes, 3);
    assert_eq!(info.total_bytes, MIN_CIPHERTEXT_BYTES + 3);
    assert!(info.to_string().starts_with("RSA-2048-OAEP + AES-256-GCM"));
}

#[test]
fn test_inspect_rejects_garbage() {
    assert!(inspect(&sealed_envelope::CiphertextValue::new("!!!")).is_err());
    assert!(inspect(&sealed_envelope::CiphertextValue::new("AAAA")).is_err());
}
