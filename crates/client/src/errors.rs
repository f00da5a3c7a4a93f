//! Error types for the OData client bootstrap.
//!
//! [`ClientError`] is what [`crate::ClientBootstrap::create`] returns. It
//! separates three families:
//!
//! - [`UsageError`]: the call itself is invalid. Raised before any I/O.
//! - [`TransportError`]: the metadata request failed or returned something
//!   that is not an XML document. Carries the status or MIME type plus the
//!   response body for diagnosis.
//! - Delegated errors: whatever the schema builder or service factory
//!   returned, passed through untouched.
//!
//! None of these are retried by the bootstrap.

use thiserror::Error;

/// Maximum number of body bytes rendered in an error message.
///
/// The full body stays available through [`TransportError::body`].
const BODY_PREVIEW_LIMIT: usize = 1024;

fn body_preview(body: &[u8]) -> String {
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).into_owned();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview
}

// ---------------------------------------------------------------------------
// Usage errors
// ---------------------------------------------------------------------------

/// The arguments passed to the bootstrap are not acceptable.
///
/// Always raised before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// The requested protocol version has no implementation.
    #[error("No implementation for selected odata version {version}")]
    UnsupportedVersion {
        /// The version the caller asked for.
        version: u32,
    },

    /// Both a raw namespace mapping and a full configuration were supplied.
    #[error("You cannot pass namespaces and config at the same time")]
    ConflictingSchemaOptions,
}

// ---------------------------------------------------------------------------
// Connection errors
// ---------------------------------------------------------------------------

/// Failures raised by [`crate::Connection`] implementations.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The connection could not be set up (bad header, TLS backend failure).
    #[error("Connection configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The request could not be sent or no response arrived.
    #[error("Request to {url} failed: {message}")]
    Request {
        /// The URL that was requested.
        url: String,
        /// Description of the failure reported by the transport.
        message: String,
    },

    /// The response body could not be read.
    #[error("Failed to read response body: {message}")]
    Body {
        /// Description of the failure reported by the transport.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// The metadata request did not yield a usable document.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The service answered with a status other than `200`.
    #[error("Metadata request failed, status code: {status}, body:\n{}", body_preview(.body))]
    Status {
        /// HTTP status code of the response.
        status: u16,
        /// Full response body.
        body: Vec<u8>,
    },

    /// The service answered `200` but the content type is not XML.
    #[error("Metadata request did not return XML, MIME type: {mime_type}, body:\n{}", body_preview(.body))]
    MimeType {
        /// Raw `content-type` header value (empty when the header was absent).
        mime_type: String,
        /// Full response body.
        body: Vec<u8>,
    },

    /// The connection itself failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl TransportError {
    /// HTTP status code, when the failure was an unexpected status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Offending MIME type, when the failure was a non-XML response.
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::MimeType { mime_type, .. } => Some(mime_type),
            _ => None,
        }
    }

    /// Response body, when a response was received.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Status { body, .. } | Self::MimeType { body, .. } => Some(body),
            Self::Connection(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Bootstrap errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::ClientBootstrap::create`].
///
/// `S` is the schema builder's error type and `F` the service factory's.
/// Both are forwarded transparently: `Display` and `source()` are those of
/// the wrapped error, and the value itself is available by matching.
#[derive(Debug, Error)]
pub enum ClientError<S, F> {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The schema builder rejected the metadata document.
    #[error(transparent)]
    Schema(S),

    /// The service factory could not construct the service.
    #[error(transparent)]
    Service(F),
}

impl<S, F> ClientError<S, F> {
    /// Returns `true` if the call was rejected before any I/O.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Returns `true` if the metadata request failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            Self::Usage(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}
