//! Client bootstrap: from a base URL to a ready service handle.
//!
//! [`ClientBootstrap::create`] runs one linear pipeline:
//!
//! 1. Check the protocol version and the namespaces/config combination.
//!    Both checks run before any I/O.
//! 2. Normalize the URL.
//! 3. Fetch `$metadata` through the caller's [`Connection`], unless the
//!    caller supplied the document.
//! 4. Build the schema with the injected [`SchemaBuilder`].
//! 5. Build the service with the injected [`ServiceFactory`].
//!
//! No step starts before the previous one has succeeded, and nothing is
//! retried.

use std::ops::{Deref, DerefMut};

use tracing::{debug, info, info_span, Instrument};

use crate::config::{Config, NamespaceMap, SchemaOptions};
use crate::errors::{ClientError, TransportError};
use crate::ports::{Connection, HttpResponse, SchemaBuilder, ServiceFactory, SharedConnection};
use crate::types::{BootstrapId, MetadataDocument, ODataVersion, ServiceUrl};

/// MIME types accepted for a metadata document.
pub const XML_MIME_TYPES: [&str; 3] = ["application/xml", "application/atom+xml", "text/xml"];

/// Returns `true` if any `;`-separated segment of `content_type` is exactly
/// one of [`XML_MIME_TYPES`].
///
/// Segments are compared verbatim: no trimming, no case folding. So
/// `application/xml; charset=utf-8` matches but `text/plain; text/xml` does
/// not (the second segment starts with a space).
pub fn is_xml_mime_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .any(|segment| XML_MIME_TYPES.contains(&segment))
}

// ---------------------------------------------------------------------------
// Response guard
// ---------------------------------------------------------------------------

/// Owns a response for the duration of the fetch and releases it on drop.
///
/// Dropping happens on every exit path of [`fetch_metadata`]: normal return,
/// early validation failure, body read error, and cancellation of the
/// enclosing future while suspended on the read.
struct ResponseGuard {
    response: Box<dyn HttpResponse>,
}

impl ResponseGuard {
    fn new(response: Box<dyn HttpResponse>) -> Self {
        Self { response }
    }
}

impl Deref for ResponseGuard {
    type Target = dyn HttpResponse;

    fn deref(&self) -> &Self::Target {
        self.response.as_ref()
    }
}

impl DerefMut for ResponseGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.response.as_mut()
    }
}

impl Drop for ResponseGuard {
    fn drop(&mut self) {
        self.response.release();
    }
}

// ---------------------------------------------------------------------------
// Metadata fetch
// ---------------------------------------------------------------------------

/// Downloads and validates the `$metadata` document of the service at `url`.
///
/// The response must have status `200` and an XML content type (see
/// [`is_xml_mime_type`]); otherwise the body is returned inside the error.
pub async fn fetch_metadata(
    connection: &dyn Connection,
    url: &ServiceUrl,
) -> Result<MetadataDocument, TransportError> {
    let metadata_url = url.metadata_url();
    info!(url = %metadata_url, "Fetching metadata");

    let mut response = ResponseGuard::new(connection.get(&metadata_url).await?);
    let content = response.read().await?;
    let status = response.status();
    debug!(
        status,
        headers = ?response.headers(),
        body = %String::from_utf8_lossy(&content),
        "Retrieved the response"
    );

    if status != 200 {
        return Err(TransportError::Status {
            status,
            body: content,
        });
    }

    let mime_type = response.header("content-type").unwrap_or_default().to_owned();
    if !is_xml_mime_type(&mime_type) {
        return Err(TransportError::MimeType {
            mime_type,
            body: content,
        });
    }

    Ok(MetadataDocument::fetched(content, metadata_url, mime_type))
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Optional arguments of [`ClientBootstrap::create`].
///
/// The protocol version is kept as a raw number so that an unsupported value
/// is reported as a [`crate::UsageError`] rather than rejected at compile time.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    odata_version: u32,
    namespaces: Option<NamespaceMap>,
    config: Option<Config>,
    metadata: Option<MetadataDocument>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            odata_version: ODataVersion::V2.as_u32(),
            namespaces: None,
            config: None,
            metadata: None,
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protocol version to bootstrap. Defaults to `2`, the only supported value.
    #[must_use]
    pub fn odata_version(mut self, version: u32) -> Self {
        self.odata_version = version;
        self
    }

    /// Schema configuration. Mutually exclusive with [`ClientOptions::namespaces`].
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Bare namespace mapping, merged into a default [`Config`].
    ///
    /// Mutually exclusive with [`ClientOptions::config`].
    #[deprecated(note = "set `Config::namespaces` and pass it with `ClientOptions::config`")]
    #[must_use]
    pub fn namespaces(mut self, namespaces: NamespaceMap) -> Self {
        self.namespaces = Some(namespaces);
        self
    }

    /// Metadata document to use instead of fetching one. No request is made.
    #[must_use]
    pub fn metadata(mut self, metadata: impl Into<MetadataDocument>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Creates OData service handles using an injected schema builder and
/// service factory.
///
/// Holds no per-call state; one instance can serve any number of concurrent
/// [`ClientBootstrap::create`] calls.
#[derive(Debug, Clone)]
pub struct ClientBootstrap<B, F> {
    schema_builder: B,
    service_factory: F,
}

impl<B, F> ClientBootstrap<B, F>
where
    B: SchemaBuilder,
    F: ServiceFactory<B::Schema>,
{
    pub fn new(schema_builder: B, service_factory: F) -> Self {
        Self {
            schema_builder,
            service_factory,
        }
    }

    /// Builds a service handle for the OData service at `url`.
    ///
    /// `connection` is used for the metadata request (unless
    /// [`ClientOptions::metadata`] was set) and is then handed to the service
    /// factory. The returned handle is owned by the caller; the bootstrap keeps
    /// no reference to it.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Usage`] for an unsupported version or conflicting
    ///   schema options. No request is made.
    /// - [`ClientError::Transport`] if the metadata request fails.
    /// - [`ClientError::Schema`] / [`ClientError::Service`] with the error the
    ///   builder or factory returned.
    pub async fn create(
        &self,
        url: &str,
        connection: SharedConnection,
        options: ClientOptions,
    ) -> Result<F::Service, ClientError<B::Error, F::Error>> {
        let bootstrap_id = BootstrapId::new_random();
        let span = info_span!("odata_bootstrap", %bootstrap_id, url);
        self.run(url, connection, options).instrument(span).await
    }

    async fn run(
        &self,
        url: &str,
        connection: SharedConnection,
        options: ClientOptions,
    ) -> Result<F::Service, ClientError<B::Error, F::Error>> {
        let ClientOptions {
            odata_version,
            namespaces,
            config,
            metadata,
        } = options;

        let version = ODataVersion::try_from(odata_version)?;
        let schema_options = SchemaOptions::from_parts(namespaces, config)?;

        let url = ServiceUrl::normalize(url);

        let metadata = match metadata {
            Some(metadata) => {
                info!(bytes = metadata.len(), "Using static metadata");
                metadata
            }
            None => fetch_metadata(connection.as_ref(), &url).await?,
        };

        let config = schema_options.into_config();

        info!(%version, "Creating OData Schema");
        let schema = self
            .schema_builder
            .build(&metadata, &config)
            .map_err(ClientError::Schema)?;

        info!(%version, "Creating OData Service");
        self.service_factory
            .create(url, schema, connection, config)
            .map_err(ClientError::Service)
    }
}
