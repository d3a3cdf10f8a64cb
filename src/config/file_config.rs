use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub admin_tokens: Option<Vec<String>>,
    pub query_tokens: Option<Vec<String>>,
    pub job_retention_secs: Option<u64>,

    // Feature configs
    pub schema: Option<SchemaConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SchemaConfig {
    /// URL of the remote schema source returning `{"fields": [...]}`.
    pub url: Option<String>,
    /// Path to a JSON file with a fixed field list, for offline deployments.
    pub fields_file: Option<String>,
    pub refresh_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
