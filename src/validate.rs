//! Input validation for sealing requests.
//!
//! Every check here is pure: no I/O, no allocation beyond error messages,
//! safe to call in any order. Callers run them before touching the network.

use crate::error::ValidationError;

/// Maximum length of an object name or key name.
pub const MAX_NAME_LEN: usize = 253;

/// Maximum length of a namespace (DNS-1123 label).
pub const MAX_NAMESPACE_LEN: usize = 63;

/// Maximum size of a single secret value (1 MiB).
pub const MAX_VALUE_BYTES: usize = 1_048_576;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

// ---------------------------------------------------------------------------
// Object names
// ---------------------------------------------------------------------------

/// DNS-1123 subdomain: dot-separated labels of `[a-z0-9-]`, each starting
/// and ending with an alphanumeric character.
pub fn validate_resource_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong { len: name.len() });
    }
    if !name.split('.').all(is_dns_label) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

pub fn is_valid_resource_name(name: &str) -> bool {
    validate_resource_name(name).is_ok()
}

/// DNS-1123 label: like a subdomain but at most 63 characters and no dots.
pub fn validate_namespace(namespace: &str) -> Result<(), ValidationError> {
    if namespace.is_empty() {
        return Err(ValidationError::EmptyNamespace);
    }
    if namespace.len() > MAX_NAMESPACE_LEN {
        return Err(ValidationError::NamespaceTooLong {
            len: namespace.len(),
        });
    }
    if !is_dns_label(namespace) {
        return Err(ValidationError::InvalidNamespace(namespace.to_string()));
    }
    Ok(())
}

pub fn is_valid_namespace(namespace: &str) -> bool {
    validate_namespace(namespace).is_ok()
}

fn is_dns_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            is_lower_alnum(*first)
                && is_lower_alnum(*last)
                && bytes.iter().all(|b| is_lower_alnum(*b) || *b == b'-')
        }
        _ => false,
    }
}

fn is_lower_alnum(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit()
}

// ---------------------------------------------------------------------------
// Secret keys and values
// ---------------------------------------------------------------------------

/// Secret data key: `[-._a-zA-Z0-9]+`, starting and ending alphanumeric.
pub fn validate_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }
    if key.len() > MAX_NAME_LEN {
        return Err(ValidationError::KeyTooLong { len: key.len() });
    }

    let bytes = key.as_bytes();
    let edges_ok = bytes[0].is_ascii_alphanumeric() && bytes[bytes.len() - 1].is_ascii_alphanumeric();
    let body_ok = bytes
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if !edges_ok || !body_ok {
        return Err(ValidationError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub fn is_valid_key(key: &str) -> bool {
    validate_key(key).is_ok()
}

/// Values must carry something other than whitespace and fit in 1 MiB.
///
/// `key` is only used for the error message.
pub fn validate_value(key: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyValue {
            key: key.to_string(),
        });
    }
    if value.len() > MAX_VALUE_BYTES {
        return Err(ValidationError::ValueTooLarge {
            key: key.to_string(),
            bytes: value.len(),
        });
    }
    Ok(())
}

pub fn is_valid_value(value: &str) -> bool {
    validate_value("", value).is_ok()
}

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

/// Exactly one `CERTIFICATE` PEM block with base64 content and nothing else
/// around it but whitespace.
pub fn validate_certificate_pem(text: &str) -> Result<(), ValidationError> {
    let text = text.trim();
    let body = text
        .strip_prefix(PEM_BEGIN)
        .ok_or(ValidationError::InvalidCertificate("missing BEGIN CERTIFICATE header"))?
        .strip_suffix(PEM_END)
        .ok_or(ValidationError::InvalidCertificate("missing END CERTIFICATE footer"))?;

    if body.contains("-----") {
        return Err(ValidationError::InvalidCertificate(
            "expected exactly one certificate block",
        ));
    }

    let mut content = 0usize;
    for b in body.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' | b'=' => content += 1,
            b' ' | b'\t' | b'\r' | b'\n' => {}
            _ => {
                return Err(ValidationError::InvalidCertificate(
                    "certificate body is not base64",
                ))
            }
        }
    }
    if content == 0 {
        return Err(ValidationError::InvalidCertificate("certificate body is empty"));
    }
    Ok(())
}

pub fn is_valid_certificate_pem(text: &str) -> bool {
    validate_certificate_pem(text).is_ok()
}
