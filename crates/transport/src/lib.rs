//! OData HTTP transport adapter.
//!
//! Implements the [`odata_client::Connection`] and [`odata_client::HttpResponse`]
//! ports over [`reqwest`], so a [`ReqwestConnection`] can be handed straight to
//! [`odata_client::ClientBootstrap::create`] and on to the service it builds.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** TLS, authentication headers, timeouts, and body
//! streaming all live here. The [`odata_client`] crate sees only
//! [`odata_client::Connection`].
//!
//! ## Configuration
//!
//! [`ConnectionSettings`] is deserializable so it can sit in a configuration
//! file next to the schema [`odata_client::Config`]:
//!
//! ```toml
//! [connection]
//! timeout_secs = 30
//! headers = { sap-client = "100" }
//! basic_auth = { username = "DEVELOPER", password = "..." }
//! ```

pub mod connection;
pub mod settings;

pub use connection::{ReqwestConnection, ReqwestResponse};
pub use settings::{BasicAuth, ConnectionSettings, Secret};
