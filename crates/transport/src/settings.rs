//! Connection settings for [`crate::ReqwestConnection`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("odata-client/", env!("CARGO_PKG_VERSION"));

/// A credential that never appears in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value. Only call this when building the request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// HTTP basic authentication credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: Secret,
}

/// How [`crate::ReqwestConnection`] talks to the service.
///
/// All fields are optional in configuration files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Total time allowed per request, including reading the body.
    pub timeout_secs: Option<u64>,

    /// Time allowed to establish the TCP/TLS connection.
    pub connect_timeout_secs: Option<u64>,

    /// `User-Agent` header. Defaults to [`DEFAULT_USER_AGENT`].
    pub user_agent: Option<String>,

    /// Extra headers sent with every request (e.g. `sap-client`).
    pub headers: BTreeMap<String, String>,

    /// Basic authentication. Mutually exclusive with `bearer_token`.
    pub basic_auth: Option<BasicAuth>,

    /// Bearer token authentication. Mutually exclusive with `basic_auth`.
    pub bearer_token: Option<Secret>,

    /// Skip TLS certificate verification. Only for test systems.
    pub accept_invalid_certs: bool,
}

impl ConnectionSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}
