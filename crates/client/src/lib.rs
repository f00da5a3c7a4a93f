//! Bootstrap for OData service clients.
//!
//! This crate turns a base URL and a caller-supplied connection into a service
//! handle: it fetches the `$metadata` document, validates the response, resolves
//! the schema configuration, and hands everything to an injected schema builder
//! and service factory.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed from the network, the schema model, and the
//! service layer; other crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | Value types (`ServiceUrl`, `ODataVersion`, `MetadataDocument`, etc.) |
//! | [`config`] | Schema configuration and the namespaces/config call-boundary union |
//! | [`errors`] | Usage, transport, and delegated error types |
//! | [`ports`] | `Connection`, `HttpResponse`, `SchemaBuilder`, `ServiceFactory` traits |
//! | [`bootstrap`] | `ClientBootstrap::create` and the metadata fetch protocol |

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use bootstrap::{fetch_metadata, is_xml_mime_type, ClientBootstrap, ClientOptions, XML_MIME_TYPES};
pub use config::{Config, ErrorPolicy, NamespaceMap, SchemaElement, SchemaOptions};
pub use errors::{ClientError, ConnectionError, TransportError, UsageError};
pub use ports::{Connection, HttpResponse, SchemaBuilder, ServiceFactory, SharedConnection};
pub use types::{BootstrapId, MetadataDocument, MetadataSource, ODataVersion, ServiceUrl, Timestamp};
