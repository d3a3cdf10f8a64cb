use super::source::{FieldSet, SchemaSource};
use crate::server::metrics;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Read-mostly catalog of known message-field names.
///
/// The set is replaced wholesale on refresh; readers clone the current `Arc`
/// under a read lock held only for the pointer copy, so a snapshot is always
/// entirely the old set or entirely the new one.
pub struct FieldCatalog {
    current: RwLock<Option<Arc<FieldSet>>>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Replace the catalog with a freshly fetched set.
    pub fn install(&self, fields: FieldSet) {
        let fields = Arc::new(fields);
        let mut current = self.current.write().expect("field set lock poisoned");
        *current = Some(fields);
    }

    /// The current set, or `None` if no refresh has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<FieldSet>> {
        self.current.read().expect("field set lock poisoned").clone()
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodically pull the field set from the schema source into the catalog.
///
/// The first fetch happens immediately so the catalog is populated right
/// after startup. A failed refresh keeps the previous set in place.
pub async fn run_refresher(
    catalog: Arc<FieldCatalog>,
    source: Arc<dyn SchemaSource>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match source.fetch_fields().await {
                    Ok(fields) => {
                        debug!("field catalog refreshed with {} fields", fields.len());
                        catalog.install(fields);
                        metrics::record_field_refresh("success");
                    }
                    Err(e) => {
                        warn!("field catalog refresh failed: {}", e);
                        metrics::record_field_refresh("failure");
                    }
                }
            }
            _ = shutdown.cancelled() => {
                info!("field catalog refresher stopped");
                break;
            }
        }
    }
}
