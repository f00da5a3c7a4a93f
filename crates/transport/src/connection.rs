//! [`reqwest`]-backed implementation of the connection ports.

use std::error::Error as StdError;

use async_trait::async_trait;
use odata_client::{Connection, ConnectionError, HttpResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, trace};

use crate::settings::{ConnectionSettings, Secret};

/// Renders an error and its `source()` chain on one line.
///
/// `reqwest` puts the useful part (connection refused, certificate invalid)
/// in the source, not in the top-level message.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn configuration_error(message: impl Into<String>) -> ConnectionError {
    ConnectionError::Configuration {
        message: message.into(),
    }
}

#[derive(Debug, Clone)]
enum Auth {
    Basic { username: String, password: Secret },
    Bearer(Secret),
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// HTTP connection over a shared [`reqwest::Client`].
///
/// Cloning is cheap and clones share the client's connection pool, so one
/// instance can serve concurrent bootstraps and the services they create.
#[derive(Debug, Clone)]
pub struct ReqwestConnection {
    client: reqwest::Client,
    auth: Option<Auth>,
}

impl ReqwestConnection {
    /// Builds a connection from `settings`.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::Configuration`] if a header name or value is
    /// invalid, both basic and bearer authentication are set, or the TLS
    /// backend cannot be initialised.
    pub fn new(settings: &ConnectionSettings) -> Result<Self, ConnectionError> {
        let auth = match (&settings.basic_auth, &settings.bearer_token) {
            (Some(_), Some(_)) => {
                return Err(configuration_error(
                    "basic_auth and bearer_token cannot be used together",
                ))
            }
            (Some(basic), None) => Some(Auth::Basic {
                username: basic.username.clone(),
                password: basic.password.clone(),
            }),
            (None, Some(token)) => Some(Auth::Bearer(token.clone())),
            (None, None) => None,
        };

        let mut builder = reqwest::Client::builder()
            .user_agent(settings.user_agent())
            .default_headers(default_headers(settings)?)
            .danger_accept_invalid_certs(settings.accept_invalid_certs);
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = settings.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| configuration_error(format!("Failed to create HTTP client: {}", error_chain(&e))))?;

        Ok(Self { client, auth })
    }

    /// Wraps an already configured client. No authentication is added.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client, auth: None }
    }
}

fn default_headers(settings: &ConnectionSettings) -> Result<HeaderMap, ConnectionError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &settings.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| configuration_error(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| configuration_error(format!("Invalid header value for '{name}': {e}")))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

#[async_trait]
impl Connection for ReqwestConnection {
    async fn get(&self, url: &str) -> Result<Box<dyn HttpResponse>, ConnectionError> {
        let mut request = self.client.get(url);
        request = match &self.auth {
            Some(Auth::Basic { username, password }) => {
                request.basic_auth(username, Some(password.expose()))
            }
            Some(Auth::Bearer(token)) => request.bearer_auth(token.expose()),
            None => request,
        };

        debug!(url, "Sending GET request");
        let response = request.send().await.map_err(|e| ConnectionError::Request {
            url: url.to_string(),
            message: error_chain(&e),
        })?;
        debug!(url, status = response.status().as_u16(), "Received response headers");

        Ok(Box::new(ReqwestResponse::new(response)))
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A [`reqwest::Response`] whose body has not been read yet.
///
/// Status and headers are captured up front; the body can be read once.
/// Header values are decoded lossily, so a value carrying non-ASCII bytes
/// is still visible to content-type checks and error reports.
/// Releasing (or dropping) an unread response closes its stream so the
/// underlying connection is returned to the pool or discarded.
#[derive(Debug)]
pub struct ReqwestResponse {
    status: u16,
    headers: Vec<(String, String)>,
    pending: Option<reqwest::Response>,
}

impl ReqwestResponse {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            status: response.status().as_u16(),
            headers: decode_headers(response.headers()),
            pending: Some(response),
        }
    }
}

fn decode_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[async_trait]
impl HttpResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    async fn read(&mut self) -> Result<Vec<u8>, ConnectionError> {
        let response = self.pending.take().ok_or_else(|| ConnectionError::Body {
            message: "response body already consumed".to_string(),
        })?;
        let bytes = response.bytes().await.map_err(|e| ConnectionError::Body {
            message: error_chain(&e),
        })?;
        Ok(bytes.to_vec())
    }

    fn release(&mut self) {
        if self.pending.take().is_some() {
            trace!(status = self.status, "Released unread response");
        }
    }
}
