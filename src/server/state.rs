use axum::extract::FromRef;

use crate::fields::FieldCatalog;
use crate::system_jobs::JobRegistry;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedJobRegistry = Arc<JobRegistry>;
pub type GuardedFieldCatalog = Arc<FieldCatalog>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub job_registry: GuardedJobRegistry,
    pub field_catalog: GuardedFieldCatalog,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedJobRegistry {
    fn from_ref(input: &ServerState) -> Self {
        input.job_registry.clone()
    }
}

impl FromRef<ServerState> for GuardedFieldCatalog {
    fn from_ref(input: &ServerState) -> Self {
        input.field_catalog.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
