//! The `SealedSecret` custom resource, as submitted to the Kubernetes API.

use std::collections::BTreeMap;

use sealed_envelope::{CiphertextValue, SealingScope};
use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "bitnami.com/v1alpha1";
pub const KIND: &str = "SealedSecret";
pub const DEFAULT_SECRET_TYPE: &str = "Opaque";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedSecret {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: SealedSecretSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SealedSecretStatus>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedSecretSpec {
    pub encrypted_data: BTreeMap<String, CiphertextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<SecretTemplate>,
}

/// Shape of the Secret the controller will create on decryption.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
}

/// Written by the controller; never set by this crate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedSecretStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<chrono::DateTime<chrono::Utc>>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

impl SealedSecret {
    /// Build the document for freshly sealed values.
    ///
    /// Scope annotations go on both the object and the template so the
    /// controller and the Secret it produces agree on the scope.
    pub fn assemble(
        name: &str,
        namespace: &str,
        scope: SealingScope,
        encrypted_data: BTreeMap<String, CiphertextValue>,
        labels: BTreeMap<String, String>,
        secret_type: Option<&str>,
    ) -> Self {
        let annotations: BTreeMap<String, String> = scope
            .annotation()
            .map(|a| (a.to_string(), "true".to_string()))
            .into_iter()
            .collect();

        let metadata = ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: labels.clone(),
            annotations: annotations.clone(),
        };

        let template = SecretTemplate {
            metadata: Some(ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                labels,
                annotations,
            }),
            secret_type: Some(secret_type.unwrap_or(DEFAULT_SECRET_TYPE).to_string()),
        };

        Self {
            api_version: API_VERSION.into(),
            kind: KIND.into(),
            metadata,
            spec: SealedSecretSpec {
                encrypted_data,
                template: Some(template),
            },
            status: None,
        }
    }

    /// Scope recorded in the annotations. Strict when neither is present.
    pub fn scope(&self) -> SealingScope {
        SealingScope::ALL
            .into_iter()
            .find(|s| {
                s.annotation()
                    .and_then(|a| self.metadata.annotations.get(a))
                    .is_some_and(|v| v == "true")
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealed_envelope::{CLUSTER_WIDE_ANNOTATION, NAMESPACE_WIDE_ANNOTATION};

    fn data() -> BTreeMap<String, CiphertextValue> {
        [("password".to_string(), CiphertextValue::new("AgBy"))].into_iter().collect()
    }

    #[test]
    fn test_strict_document_json() {
        let doc = SealedSecret::assemble("db-creds", "prod", SealingScope::Strict, data(), BTreeMap::new(), None);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "apiVersion": "bitnami.com/v1alpha1",
                "kind": "SealedSecret",
                "metadata": { "name": "db-creds", "namespace": "prod" },
                "spec": {
                    "encryptedData": { "password": "AgBy" },
                    "template": {
                        "metadata": { "name": "db-creds", "namespace": "prod" },
                        "type": "Opaque"
                    }
                }
            })
        );
    }

    #[test]
    fn test_scope_annotations() {
        let doc = SealedSecret::assemble("x", "ns", SealingScope::ClusterWide, data(), BTreeMap::new(), None);
        assert_eq!(doc.metadata.annotations.get(CLUSTER_WIDE_ANNOTATION).map(String::as_str), Some("true"));
        let tmpl = doc.spec.template.as_ref().unwrap().metadata.as_ref().unwrap();
        assert_eq!(tmpl.annotations.get(CLUSTER_WIDE_ANNOTATION).map(String::as_str), Some("true"));
        assert_eq!(doc.scope(), SealingScope::ClusterWide);

        let doc = SealedSecret::assemble("x", "ns", SealingScope::NamespaceWide, data(), BTreeMap::new(), None);
        assert!(doc.metadata.annotations.contains_key(NAMESPACE_WIDE_ANNOTATION));
        assert_eq!(doc.scope(), SealingScope::NamespaceWide);

        let doc = SealedSecret::assemble("x", "ns", SealingScope::Strict, data(), BTreeMap::new(), None);
        assert!(doc.metadata.annotations.is_empty());
        assert_eq!(doc.scope(), SealingScope::Strict);
    }

    #[test]
    fn test_labels_and_type() {
        let labels: BTreeMap<_, _> = [("app".to_string(), "api".to_string())].into_iter().collect();
        let doc = SealedSecret::assemble("tls", "ns", SealingScope::Strict, data(), labels, Some("kubernetes.io/tls"));
        assert_eq!(doc.metadata.labels["app"], "api");
        let tmpl = doc.spec.template.unwrap();
        assert_eq!(tmpl.secret_type.as_deref(), Some("kubernetes.io/tls"));
        assert_eq!(tmpl.metadata.unwrap().labels["app"], "api");
    }

    #[test]
    fn test_parse_controller_document() {
        let json = r#"{
            "apiVersion": "bitnami.com/v1alpha1",
            "kind": "SealedSecret",
            "metadata": {"name": "a", "namespace": "b"},
            "spec": {"encryptedData": {"k": "AgA="}},
            "status": {"observedGeneration": 2, "conditions": [
                {"type": "Synced", "status": "True", "lastTransitionTime": "2026-01-02T03:04:05Z"}
            ]}
        }"#;
        let doc: SealedSecret = serde_json::from_str(json).unwrap();
        let status = doc.status.unwrap();
        assert_eq!(status.observed_generation, Some(2));
        assert_eq!(status.conditions[0].condition_type, "Synced");
        assert!(doc.spec.template.is_none());
    }
}
