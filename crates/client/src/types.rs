//! Value types shared by the bootstrap and its collaborators.
//!
//! These types carry the invariants the bootstrap relies on: a [`ServiceUrl`]
//! always ends in exactly one `/`, an [`ODataVersion`] is always a version this
//! crate implements, and a [`MetadataDocument`] never changes after construction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::UsageError;

// ---------------------------------------------------------------------------
// Service URL
// ---------------------------------------------------------------------------

/// Relative path of the metadata document below the service root.
const METADATA_PATH: &str = "$metadata";

/// Base URL of an OData service, normalized to end in exactly one `/`.
///
/// Normalization is not validation: the scheme, host, and path are passed
/// through untouched and only trailing slashes are rewritten. Parsing the URL
/// is the connection's business.
///
/// Deserializing goes through [`ServiceUrl::normalize`] as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct ServiceUrl(String);

impl ServiceUrl {
    /// Strips every trailing `/` from `raw` and appends exactly one.
    pub fn normalize(raw: &str) -> Self {
        let mut url = raw.trim_end_matches('/').to_owned();
        url.push('/');
        Self(url)
    }

    /// Returns the normalized URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the URL of the service's `$metadata` document.
    pub fn metadata_url(&self) -> String {
        format!("{}{METADATA_PATH}", self.0)
    }
}

impl From<String> for ServiceUrl {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl std::fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Protocol version
// ---------------------------------------------------------------------------

/// OData protocol versions this crate can bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ODataVersion {
    /// OData V2 (the only implemented version).
    V2,
}

impl ODataVersion {
    /// Returns the numeric protocol version.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::V2 => 2,
        }
    }
}

impl TryFrom<u32> for ODataVersion {
    type Error = UsageError;

    fn try_from(version: u32) -> Result<Self, Self::Error> {
        match version {
            2 => Ok(Self::V2),
            other => Err(UsageError::UnsupportedVersion { version: other }),
        }
    }
}

impl std::fmt::Display for ODataVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifies a single bootstrap call.
///
/// Generated fresh for every [`crate::ClientBootstrap::create`] invocation and
/// recorded on its tracing span so all events of one call can be correlated,
/// even when several bootstraps run concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BootstrapId(Uuid);

impl BootstrapId {
    /// Generates a new random identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for BootstrapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// When a metadata document was received. Serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

// ---------------------------------------------------------------------------
// Metadata document
// ---------------------------------------------------------------------------

/// Where a [`MetadataDocument`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataSource {
    /// Supplied directly by the caller; no request was made.
    Static,
    /// Downloaded from the service's `$metadata` endpoint.
    Fetched {
        /// URL the document was requested from.
        url: String,
        /// Value of the response's `content-type` header.
        content_type: String,
        /// When the response body finished reading.
        fetched_at: Timestamp,
    },
}

/// The raw `$metadata` payload of an OData service.
///
/// Immutable once built; clones share the same buffer. The bytes are handed
/// to the schema builder verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDocument {
    content: Arc<[u8]>,
    source: MetadataSource,
}

impl MetadataDocument {
    /// Wraps caller-supplied metadata. Using it bypasses the network entirely.
    pub fn from_static(content: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = content.into();
        Self {
            content: bytes.into(),
            source: MetadataSource::Static,
        }
    }

    /// Wraps a body downloaded from `url`.
    pub fn fetched(content: Vec<u8>, url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: MetadataSource::Fetched {
                url: url.into(),
                content_type: content_type.into(),
                fetched_at: Timestamp::now(),
            },
        }
    }

    /// Returns the raw document bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Returns the document as UTF-8 text.
    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.content)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn source(&self) -> &MetadataSource {
        &self.source
    }

    /// Copies the document bytes out into an owned buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.content.to_vec()
    }
}

impl From<&str> for MetadataDocument {
    fn from(content: &str) -> Self {
        Self::from_static(content)
    }
}

impl From<String> for MetadataDocument {
    fn from(content: String) -> Self {
        Self::from_static(content)
    }
}

impl From<Vec<u8>> for MetadataDocument {
    fn from(content: Vec<u8>) -> Self {
        Self::from_static(content)
    }
}
