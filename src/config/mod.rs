mod file_config;

pub use file_config::{FileConfig, SchemaConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub admin_tokens: Vec<String>,
    pub query_tokens: Vec<String>,
    pub schema_url: Option<String>,
    pub fields_file: Option<PathBuf>,
    pub schema_refresh_secs: u64,
    pub schema_timeout_secs: u64,
    pub job_retention_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub admin_tokens: Vec<String>,
    pub query_tokens: Vec<String>,
    pub job_retention_secs: u64,

    // Field catalog settings
    pub schema: SchemaSettings,
}

#[derive(Debug, Clone)]
pub struct SchemaSettings {
    pub source: SchemaSourceSettings,
    pub refresh_secs: u64,
    pub timeout_secs: u64,
}

/// Where the field catalog pulls its field names from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSourceSettings {
    Http { url: String },
    File { path: PathBuf },
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let admin_tokens = file
            .admin_tokens
            .unwrap_or_else(|| cli.admin_tokens.clone());
        if admin_tokens.is_empty() {
            bail!("At least one admin token must be configured via --admin-token or in config file");
        }

        let query_tokens = file
            .query_tokens
            .unwrap_or_else(|| cli.query_tokens.clone());

        let job_retention_secs = file.job_retention_secs.unwrap_or(cli.job_retention_secs);

        // Schema settings - merge [schema] section with CLI
        let schema_file = file.schema.unwrap_or_default();
        let schema_url = schema_file.url.or_else(|| cli.schema_url.clone());
        let fields_file = schema_file
            .fields_file
            .map(PathBuf::from)
            .or_else(|| cli.fields_file.clone());

        let source = match (schema_url, fields_file) {
            (Some(_), Some(_)) => {
                bail!("schema_url and fields_file are mutually exclusive; configure only one")
            }
            (Some(url), None) => SchemaSourceSettings::Http { url },
            (None, Some(path)) => {
                if !path.exists() {
                    bail!("Fields file does not exist: {:?}", path);
                }
                SchemaSourceSettings::File { path }
            }
            (None, None) => {
                bail!("A schema source must be configured via --schema-url or --fields-file")
            }
        };

        let schema = SchemaSettings {
            source,
            refresh_secs: schema_file.refresh_secs.unwrap_or(cli.schema_refresh_secs),
            timeout_secs: schema_file.timeout_secs.unwrap_or(cli.schema_timeout_secs),
        };

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            admin_tokens,
            query_tokens,
            job_retention_secs,
            schema,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
