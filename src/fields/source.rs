use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// The set of known message-field names, sorted and deduplicated.
pub type FieldSet = BTreeSet<String>;

/// Failures talking to the schema source. Surfaced to HTTP callers as a
/// generic server error with no internal detail.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema source unreachable: {0}")]
    Unreachable(String),
    #[error("malformed schema response: {0}")]
    Malformed(String),
}

/// External source that knows which message fields currently exist.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn fetch_fields(&self) -> Result<FieldSet, SchemaError>;
}

#[derive(Debug, Deserialize)]
struct FieldsResponse {
    fields: Vec<String>,
}

/// Schema source backed by a remote HTTP endpoint returning
/// `{"fields": [...]}`.
pub struct HttpSchemaSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSchemaSource {
    pub fn new(url: impl Into<String>, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to build schema source HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SchemaSource for HttpSchemaSource {
    async fn fetch_fields(&self) -> Result<FieldSet, SchemaError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SchemaError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SchemaError::Unreachable(format!(
                "status {}",
                response.status()
            )));
        }

        let body: FieldsResponse = response
            .json()
            .await
            .map_err(|e| SchemaError::Malformed(e.to_string()))?;

        Ok(body.fields.into_iter().collect())
    }
}

/// Fixed field set, loaded once. Used for offline deployments and tests.
pub struct StaticSchemaSource {
    fields: FieldSet,
}

impl StaticSchemaSource {
    pub fn new(fields: FieldSet) -> Self {
        Self { fields }
    }

    /// Load from a JSON file containing an array of field names.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fields file: {:?}", path))?;
        let names: Vec<String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fields file: {:?}", path))?;
        Ok(Self::new(names.into_iter().collect()))
    }
}

#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn fetch_fields(&self) -> Result<FieldSet, SchemaError> {
        Ok(self.fields.clone())
    }
}
