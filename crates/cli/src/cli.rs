//! Command line arguments of the `odata` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "odata",
    version,
    about = "Bootstrap an OData client and print what it resolved"
)]
pub struct Cli {
    /// Service root URL (e.g. https://host/sap/opu/odata/sap/EXAMPLE_SRV)
    pub url: String,

    /// TOML file with `[connection]` and `[schema]` tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Namespace prefix mapping, PREFIX=URI. Deprecated: use `[schema.namespaces]`
    #[arg(short = 'n', long = "namespace", value_parser = parse_namespace)]
    pub namespaces: Vec<(String, String)>,

    /// Read the metadata document from this file instead of the service
    #[arg(long)]
    pub metadata_file: Option<PathBuf>,

    /// OData protocol version
    #[arg(long, default_value_t = 2)]
    pub odata_version: u32,

    /// Log output format (written to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Export spans to this OTLP/gRPC collector (e.g. http://localhost:4317)
    #[arg(long)]
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

fn parse_namespace(value: &str) -> Result<(String, String), String> {
    let (prefix, uri) = value
        .split_once('=')
        .ok_or_else(|| format!("Invalid namespace '{value}'. Expected 'PREFIX=URI'"))?;

    if prefix.trim().is_empty() || uri.trim().is_empty() {
        return Err("Namespace prefix and URI cannot be empty".to_string());
    }

    Ok((prefix.trim().to_string(), uri.trim().to_string()))
}
