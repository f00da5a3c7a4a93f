//! Configuration file loading.
//!
//! ```toml
//! [connection]
//! timeout_secs = 30
//! headers = { sap-client = "100" }
//!
//! [schema]
//! default_error_policy = "warning"
//! retain_null = true
//!
//! [schema.namespaces]
//! edmx = "http://schemas.microsoft.com/ado/2007/06/edmx"
//! ```

use std::path::Path;

use anyhow::Context;
use odata_client::Config;
use odata_transport::ConnectionSettings;
use serde::{Deserialize, Serialize};

/// Contents of the `--config` file. Both tables are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub connection: ConnectionSettings,

    /// Schema options. When absent the bootstrap uses its defaults.
    pub schema: Option<Config>,
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
