//! Controller endpoint configuration.
//!
//! Environment variables:
//!   SEALED_SECRETS_CONTROLLER_NAME       - Service name (default: sealed-secrets-controller)
//!   SEALED_SECRETS_CONTROLLER_NAMESPACE  - Service namespace (default: kube-system)
//!   SEALED_SECRETS_CONTROLLER_PORT       - Service port (default: 8080)
//!   SEALED_SECRETS_CONTROLLER_URL        - Full base URL, overrides the three above

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_NAME: &str = "SEALED_SECRETS_CONTROLLER_NAME";
pub const ENV_NAMESPACE: &str = "SEALED_SECRETS_CONTROLLER_NAMESPACE";
pub const ENV_PORT: &str = "SEALED_SECRETS_CONTROLLER_PORT";
pub const ENV_URL: &str = "SEALED_SECRETS_CONTROLLER_URL";

/// Where the sealing controller listens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    pub controller_name: String,
    pub controller_namespace: String,
    pub controller_port: u16,
    pub scheme: String,
    /// Replaces the in-cluster service address when set.
    pub base_url: Option<String>,
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            controller_name: "sealed-secrets-controller".into(),
            controller_namespace: "kube-system".into(),
            controller_port: 8080,
            scheme: "http".into(),
            base_url: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ControllerConfig {
    /// Defaults overridden by whatever is set in the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    /// Unparseable values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup(ENV_NAME).filter(|v| !v.is_empty()) {
            cfg.controller_name = v;
        }
        if let Some(v) = lookup(ENV_NAMESPACE).filter(|v| !v.is_empty()) {
            cfg.controller_namespace = v;
        }
        if let Some(port) = lookup(ENV_PORT).and_then(|v| v.parse().ok()) {
            cfg.controller_port = port;
        }
        if let Some(v) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            cfg.base_url = Some(v);
        }
        cfg
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "{}://{}.{}.svc:{}",
                self.scheme, self.controller_name, self.controller_namespace, self.controller_port
            ),
        }
    }

    pub fn cert_url(&self) -> String {
        format!("{}/v1/cert.pem", self.base())
    }

    pub fn healthz_url(&self) -> String {
        format!("{}/healthz", self.base())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
