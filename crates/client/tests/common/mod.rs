//! Stub collaborators shared by the bootstrap integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use odata_client::{
    Config, Connection, ConnectionError, HttpResponse, MetadataDocument, SchemaBuilder,
    ServiceFactory, ServiceUrl, SharedConnection,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

pub const SERVICE_URL: &str = "http://example.com/sap/opu/odata/sap/EXAMPLE_SRV";

pub const METADATA: &str = r#"<edmx:Edmx xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx" Version="1.0">
 <edmx:DataServices m:DataServiceVersion="2.0" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
  <Schema xmlns="http://schemas.microsoft.com/ado/2008/09/edm" Namespace="EXAMPLE_SRV">
   <EntityType Name="MasterEntity">
    <Key><PropertyRef Name="Key"/></Key>
    <Property Name="Key" Type="Edm.String" Nullable="false"/>
   </EntityType>
   <EntityContainer Name="EXAMPLE_SRV" m:IsDefaultEntityContainer="true">
    <EntitySet Name="MasterEntities" EntityType="EXAMPLE_SRV.MasterEntity"/>
   </EntityContainer>
  </Schema>
 </edmx:DataServices>
</edmx:Edmx>"#;

// ---------------------------------------------------------------------------
// Connection stubs
// ---------------------------------------------------------------------------

/// How a stub response behaves when its body is read.
#[derive(Debug, Clone)]
pub enum Body {
    Ready(Vec<u8>),
    Fail(String),
    /// Never completes.
    Pending,
}

pub struct StubResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Body,
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl HttpResponse for StubResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    async fn read(&mut self) -> Result<Vec<u8>, ConnectionError> {
        match &self.body {
            Body::Ready(bytes) => Ok(bytes.clone()),
            Body::Fail(message) => Err(ConnectionError::Body {
                message: message.clone(),
            }),
            Body::Pending => std::future::pending().await,
        }
    }

    fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Connection answering every GET with the same canned response.
pub struct StubConnection {
    status: u16,
    headers: Vec<(String, String)>,
    body: Body,
    stall_on_get: bool,
    requests: Mutex<Vec<String>>,
    released: Arc<AtomicUsize>,
}

impl StubConnection {
    pub fn new(status: u16, content_type: Option<&str>, body: Body) -> Self {
        let headers = content_type
            .map(|ct| vec![("Content-Type".to_string(), ct.to_string())])
            .unwrap_or_default();
        Self {
            status,
            headers,
            body,
            stall_on_get: false,
            requests: Mutex::new(Vec::new()),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// `200 OK`, `application/xml`, body [`METADATA`].
    pub fn serving_metadata() -> Self {
        Self::new(200, Some("application/xml"), Body::Ready(METADATA.as_bytes().to_vec()))
    }

    /// Records the request, then never produces a response.
    pub fn stalled() -> Self {
        Self {
            stall_on_get: true,
            ..Self::serving_metadata()
        }
    }

    pub fn with_content_type(content_type: &str) -> Self {
        Self::new(200, Some(content_type), Body::Ready(METADATA.as_bytes().to_vec()))
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// How many responses handed out by this connection have been released.
    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for StubConnection {
    async fn get(&self, url: &str) -> Result<Box<dyn HttpResponse>, ConnectionError> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.stall_on_get {
            std::future::pending::<()>().await;
        }
        Ok(Box::new(StubResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
            released: Arc::clone(&self.released),
        }))
    }
}

/// Connection whose requests fail before any response arrives.
pub struct RefusingConnection;

#[async_trait]
impl Connection for RefusingConnection {
    async fn get(&self, url: &str) -> Result<Box<dyn HttpResponse>, ConnectionError> {
        Err(ConnectionError::Request {
            url: url.to_string(),
            message: "connection refused".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Builder / factory stubs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSchema {
    pub metadata: MetadataDocument,
    pub config: Config,
}

#[derive(Debug, thiserror::Error)]
#[error("schema rejected: {0}")]
pub struct SchemaRejected(pub String);

#[derive(Debug, thiserror::Error)]
#[error("service rejected: {0}")]
pub struct ServiceRejected(pub String);

/// Schema builder that records its inputs, or fails when `reject` is set.
#[derive(Debug, Default)]
pub struct RecordingSchemaBuilder {
    pub reject: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl SchemaBuilder for RecordingSchemaBuilder {
    type Schema = RecordedSchema;
    type Error = SchemaRejected;

    fn build(&self, metadata: &MetadataDocument, config: &Config) -> Result<RecordedSchema, SchemaRejected> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.reject {
            return Err(SchemaRejected(reason.clone()));
        }
        Ok(RecordedSchema {
            metadata: metadata.clone(),
            config: config.clone(),
        })
    }
}

pub struct StubService {
    pub url: ServiceUrl,
    pub schema: RecordedSchema,
    pub connection: SharedConnection,
    pub config: Config,
}

/// Service factory that records its inputs, or fails when `reject` is set.
#[derive(Debug, Default)]
pub struct RecordingServiceFactory {
    pub reject: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl ServiceFactory<RecordedSchema> for RecordingServiceFactory {
    type Service = StubService;
    type Error = ServiceRejected;

    fn create(
        &self,
        url: ServiceUrl,
        schema: RecordedSchema,
        connection: SharedConnection,
        config: Config,
    ) -> Result<StubService, ServiceRejected> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.reject {
            return Err(ServiceRejected(reason.clone()));
        }
        Ok(StubService {
            url,
            schema,
            connection,
            config,
        })
    }
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

/// Counts warn-level events emitted on the deprecation target.
struct DeprecationCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for DeprecationCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() == Level::WARN && metadata.target() == "odata_client::deprecation" {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Installs a thread-local subscriber counting deprecation notices.
///
/// Keep the guard alive for as long as events should be counted.
pub fn capture_deprecations() -> (Arc<AtomicUsize>, tracing::subscriber::DefaultGuard) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(DeprecationCounter(Arc::clone(&count)));
    let guard = tracing::subscriber::set_default(subscriber);
    (count, guard)
}
