//! Port traits: the capabilities the bootstrap consumes but does not implement.
//!
//! - [`Connection`] / [`HttpResponse`]: performs the metadata GET. Supplied by
//!   the caller; TLS, authentication, and timeouts are its business.
//! - [`SchemaBuilder`]: turns the metadata document into a schema model.
//! - [`ServiceFactory`]: binds a schema, URL, and connection into a service.
//!
//! The bootstrap depends only on these contracts, so any of them can be
//! replaced by a stub in tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::ConnectionError;
use crate::types::{MetadataDocument, ServiceUrl};

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// A connection shared between the bootstrap and the service it produces.
pub type SharedConnection = Arc<dyn Connection>;

/// Caller-supplied capability for performing HTTP GET requests.
///
/// The bootstrap issues exactly one request per call and does not pool,
/// mutate, or close the connection. Implementations shared between concurrent
/// bootstraps must be safe for concurrent use.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Sends a GET request to `url` and returns once the status line and
    /// headers are available.
    async fn get(&self, url: &str) -> Result<Box<dyn HttpResponse>, ConnectionError>;
}

/// A response whose body may not have been read yet.
///
/// Holding a response may pin an underlying socket or buffer. The bootstrap
/// wraps every response it receives in a guard that calls
/// [`HttpResponse::release`] exactly once, on success, on error, and when the
/// surrounding future is dropped mid-read.
#[async_trait]
pub trait HttpResponse: Send {
    /// HTTP status code.
    fn status(&self) -> u16;

    /// Value of the header `name`, matched case-insensitively.
    ///
    /// Returns `None` when the header is absent or not valid text.
    fn header(&self, name: &str) -> Option<&str>;

    /// All headers as `(name, value)` pairs, for diagnostics.
    fn headers(&self) -> Vec<(String, String)>;

    /// Reads the full response body.
    async fn read(&mut self) -> Result<Vec<u8>, ConnectionError>;

    /// Releases any resource still held by the response.
    fn release(&mut self) {}
}

// ---------------------------------------------------------------------------
// Delegated construction
// ---------------------------------------------------------------------------

/// Parses a metadata document into a schema model.
pub trait SchemaBuilder {
    type Schema;
    type Error: std::error::Error + Send + Sync + 'static;

    fn build(&self, metadata: &MetadataDocument, config: &Config) -> Result<Self::Schema, Self::Error>;
}

/// Constructs the service handle callers use to issue OData requests.
pub trait ServiceFactory<S> {
    type Service;
    type Error: std::error::Error + Send + Sync + 'static;

    fn create(
        &self,
        url: ServiceUrl,
        schema: S,
        connection: SharedConnection,
        config: Config,
    ) -> Result<Self::Service, Self::Error>;
}
