//! `odata` command line entry point.
//!
//! This binary is the composition root. It:
//!
//! 1. Parses arguments ([`cli::Cli`]) and loads the optional TOML config file.
//! 2. Installs the tracing subscriber ([`observability::init`]).
//! 3. Builds a [`ReqwestConnection`] from the `[connection]` settings.
//! 4. Runs [`ClientBootstrap::create`] with the inspection builder and factory
//!    from [`inspect`], then prints the resulting [`inspect::ServiceReport`]
//!    as JSON on stdout.
//!
//! Any failure is printed once to stderr and turns into a non-zero exit
//! status.

mod cli;
mod config;
mod inspect;
mod observability;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use odata_client::{ClientBootstrap, ClientOptions, NamespaceMap, SharedConnection};
use odata_transport::ReqwestConnection;

use crate::cli::Cli;
use crate::config::CliConfig;
use crate::inspect::{RawSchemaBuilder, ReportFactory};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let _telemetry = match observability::init(args.log_format, args.otlp_endpoint.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(args).await;
    finish(result, &mut std::io::stderr())
}

/// Writes a failure to `out` exactly once and maps the result to an exit code.
///
/// Nothing is logged here: the fmt layer also writes to stderr.
fn finish(result: anyhow::Result<()>, out: &mut impl Write) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(out, "error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    let connection: SharedConnection = Arc::new(
        ReqwestConnection::new(&config.connection).context("Failed to configure HTTP connection")?,
    );

    let mut options = ClientOptions::new().odata_version(args.odata_version);
    if let Some(schema) = config.schema {
        options = options.config(schema);
    }
    if !args.namespaces.is_empty() {
        options = with_legacy_namespaces(options, args.namespaces.into_iter().collect());
    }
    if let Some(path) = &args.metadata_file {
        let metadata = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read metadata file {}", path.display()))?;
        options = options.metadata(metadata);
    }

    let bootstrap = ClientBootstrap::new(RawSchemaBuilder, ReportFactory);
    let report = bootstrap.create(&args.url, connection, options).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// `--namespace` maps onto the deprecated bare-namespaces option so the
/// library emits its deprecation notice and enforces the conflict with
/// `[schema]`.
#[allow(deprecated)]
fn with_legacy_namespaces(options: ClientOptions, namespaces: NamespaceMap) -> ClientOptions {
    options.namespaces(namespaces)
}
