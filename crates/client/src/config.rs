//! Schema configuration.
//!
//! [`Config`] is built once per bootstrap and handed to both the schema
//! builder and the service factory. The bootstrap never interprets its
//! contents; it only decides which configuration to use.
//!
//! Callers used to pass a bare namespace mapping instead of a [`Config`].
//! That form is still accepted but deprecated. [`SchemaOptions`] makes the
//! two forms mutually exclusive at the call boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::UsageError;

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

/// XML namespace prefixes used when reading the metadata document,
/// mapped to their namespace URIs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceMap(BTreeMap<String, String>);

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `prefix` to `uri`, returning the URI previously mapped to it.
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Option<String> {
        self.0.insert(prefix.into(), uri.into())
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for NamespaceMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Error policies
// ---------------------------------------------------------------------------

/// How the schema builder should react to a malformed metadata element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort schema construction.
    #[default]
    Fatal,
    /// Log a warning and continue with a placeholder.
    Warning,
    /// Continue silently with a placeholder.
    Ignore,
}

/// Kinds of metadata elements an [`ErrorPolicy`] can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaElement {
    Property,
    Annotation,
    Association,
    AssociationSet,
    EnumType,
    EntityType,
    ComplexType,
    FunctionImport,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Options controlling schema construction.
///
/// Every field has a default so partial configuration files deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Namespace prefixes for reading the metadata document.
    pub namespaces: NamespaceMap,

    /// Policy applied to element kinds without a custom policy.
    pub default_error_policy: ErrorPolicy,

    /// Per-element-kind policy overrides.
    pub custom_error_policies: BTreeMap<SchemaElement, ErrorPolicy>,

    /// Keep explicit `null` property values instead of replacing them with the
    /// type's default value.
    pub retain_null: bool,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of `self` using `namespaces`.
    #[must_use]
    pub fn with_namespaces(mut self, namespaces: NamespaceMap) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Returns a copy of `self` with `policy` applied to `element`.
    #[must_use]
    pub fn with_error_policy(mut self, element: SchemaElement, policy: ErrorPolicy) -> Self {
        self.custom_error_policies.insert(element, policy);
        self
    }

    /// Returns the policy for `element`: its custom policy if one is set,
    /// otherwise the default policy.
    pub fn error_policy(&self, element: SchemaElement) -> ErrorPolicy {
        self.custom_error_policies
            .get(&element)
            .copied()
            .unwrap_or(self.default_error_policy)
    }
}

// ---------------------------------------------------------------------------
// Call-boundary options
// ---------------------------------------------------------------------------

/// Which schema configuration a bootstrap call uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchemaOptions {
    /// Neither namespaces nor a config were supplied.
    #[default]
    Default,
    /// A bare namespace mapping (deprecated; use [`SchemaOptions::Config`]).
    Namespaces(NamespaceMap),
    /// A complete configuration.
    Config(Config),
}

impl SchemaOptions {
    /// Builds the options from the two independently optional arguments.
    ///
    /// Supplying both is a [`UsageError::ConflictingSchemaOptions`].
    pub fn from_parts(
        namespaces: Option<NamespaceMap>,
        config: Option<Config>,
    ) -> Result<Self, UsageError> {
        match (namespaces, config) {
            (Some(_), Some(_)) => Err(UsageError::ConflictingSchemaOptions),
            (Some(namespaces), None) => Ok(Self::Namespaces(namespaces)),
            (None, Some(config)) => Ok(Self::Config(config)),
            (None, None) => Ok(Self::Default),
        }
    }

    /// Resolves into the configuration handed to the builder and factory.
    ///
    /// The deprecated namespaces form logs one warning and is merged into a
    /// fresh default configuration.
    pub fn into_config(self) -> Config {
        match self {
            Self::Default => Config::default(),
            Self::Config(config) => config,
            Self::Namespaces(namespaces) => {
                warn!(
                    target: "odata_client::deprecation",
                    prefixes = ?namespaces.iter().map(|(prefix, _)| prefix).collect::<Vec<_>>(),
                    "Passing namespaces directly is deprecated. Use Config instead"
                );
                Config::default().with_namespaces(namespaces)
            }
        }
    }
}
