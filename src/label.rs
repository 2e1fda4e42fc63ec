//! Scope labels (locked convention, defined by the decrypting controller).
//!
//! The label is passed as the RSA-OAEP label when the session key is wrapped,
//! so a blob sealed for one object cannot be opened under another identity.
//!
//! Label (bytes):
//!   strict          -> namespace + b"/" + name
//!   namespace-wide  -> namespace
//!   cluster-wide    -> b"" (empty label)
//!
//! The scope also travels with the resource as an annotation, because the
//! controller derives the label from the annotations it finds on the object.

extern crate alloc;

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub const NAMESPACE_WIDE_ANNOTATION: &str = "sealedsecrets.bitnami.com/namespace-wide";
pub const CLUSTER_WIDE_ANNOTATION: &str = "sealedsecrets.bitnami.com/cluster-wide";

/// Which identity a sealed value is bound to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SealingScope {
    /// Bound to namespace and name. The controller default.
    #[default]
    Strict,
    /// Bound to the namespace; the object may be renamed.
    NamespaceWide,
    /// Not bound; the object may be moved anywhere.
    ClusterWide,
}

impl SealingScope {
    pub const ALL: [SealingScope; 3] = [Self::Strict, Self::NamespaceWide, Self::ClusterWide];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::NamespaceWide => "namespace-wide",
            Self::ClusterWide => "cluster-wide",
        }
    }

    /// Annotation the controller reads to pick this scope, if any.
    pub fn annotation(&self) -> Option<&'static str> {
        match self {
            Self::Strict => None,
            Self::NamespaceWide => Some(NAMESPACE_WIDE_ANNOTATION),
            Self::ClusterWide => Some(CLUSTER_WIDE_ANNOTATION),
        }
    }

    /// Build the OAEP label for an object under this scope.
    pub fn label(&self, namespace: &str, name: &str) -> String {
        match self {
            Self::Strict => {
                let mut out = String::with_capacity(namespace.len() + 1 + name.len());
                out.push_str(namespace);
                out.push('/');
                out.push_str(name);
                out
            }
            Self::NamespaceWide => String::from(namespace),
            Self::ClusterWide => String::new(),
        }
    }
}

impl fmt::Display for SealingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown scope name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseScopeError(pub String);

impl fmt::Display for ParseScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown scope '{}' (expected strict, namespace-wide or cluster-wide)",
            self.0
        )
    }
}

impl std::error::Error for ParseScopeError {}

impl FromStr for SealingScope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "namespace-wide" => Ok(Self::NamespaceWide),
            "cluster-wide" => Ok(Self::ClusterWide),
            other => Err(ParseScopeError(other.into())),
        }
    }
}
