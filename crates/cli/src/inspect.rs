//! Schema builder and service factory used by the `odata` binary.
//!
//! The binary does not model entity sets; it bootstraps the client and
//! reports what the bootstrap resolved: the normalized URL, where the
//! metadata came from, and the effective schema configuration.

use std::collections::BTreeMap;
use std::convert::Infallible;

use odata_client::{
    Config, ErrorPolicy, MetadataDocument, MetadataSource, NamespaceMap, SchemaBuilder,
    SchemaElement, ServiceFactory, ServiceUrl, SharedConnection,
};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("Metadata document is empty")]
    EmptyMetadata,
}

/// Accepts any non-empty metadata document as the schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSchemaBuilder;

impl SchemaBuilder for RawSchemaBuilder {
    type Schema = MetadataDocument;
    type Error = InspectError;

    fn build(&self, metadata: &MetadataDocument, _config: &Config) -> Result<Self::Schema, Self::Error> {
        if metadata.is_empty() {
            return Err(InspectError::EmptyMetadata);
        }
        debug!(bytes = metadata.len(), "Accepted metadata document");
        Ok(metadata.clone())
    }
}

/// What the bootstrap produced, printed as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceReport {
    pub url: ServiceUrl,
    pub metadata_source: MetadataSource,
    pub metadata_bytes: usize,
    pub namespaces: NamespaceMap,
    pub default_error_policy: ErrorPolicy,
    pub custom_error_policies: BTreeMap<SchemaElement, ErrorPolicy>,
    pub retain_null: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFactory;

impl ServiceFactory<MetadataDocument> for ReportFactory {
    type Service = ServiceReport;
    type Error = Infallible;

    fn create(
        &self,
        url: ServiceUrl,
        schema: MetadataDocument,
        _connection: SharedConnection,
        config: Config,
    ) -> Result<Self::Service, Self::Error> {
        Ok(ServiceReport {
            url,
            metadata_source: schema.source().clone(),
            metadata_bytes: schema.len(),
            namespaces: config.namespaces,
            default_error_policy: config.default_error_policy,
            custom_error_policies: config.custom_error_policies,
            retain_null: config.retain_null,
        })
    }
}
