//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own job registry and field
//! catalog, both exposed for direct manipulation from the test body.

use super::constants::*;
use lognode_server::fields::{FieldCatalog, FieldSet};
use lognode_server::server::server::make_app;
use lognode_server::server::{RequestsLoggingLevel, ServerConfig};
use lognode_server::system_jobs::JobRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance with isolated registry and catalog
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Job registry for registering jobs directly in tests
    pub job_registry: Arc<JobRegistry>,

    /// Field catalog for installing field sets directly in tests
    pub field_catalog: Arc<FieldCatalog>,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn default_fields() -> FieldSet {
    TEST_FIELDS.iter().map(|s| s.to_string()).collect()
}

impl TestServer {
    /// Spawns a new test server on a random port with the default field set
    /// installed and the default terminal-job retention.
    pub async fn spawn() -> Self {
        Self::spawn_inner(Some(default_fields()), None).await
    }

    /// Spawns a server whose field catalog has never been populated, for
    /// exercising the unavailable-catalog failure path.
    pub async fn spawn_without_fields() -> Self {
        Self::spawn_inner(None, None).await
    }

    /// Spawns a server with a custom retention window for terminal jobs.
    pub async fn spawn_with_job_retention(retention: Duration) -> Self {
        Self::spawn_inner(Some(default_fields()), Some(retention)).await
    }

    async fn spawn_inner(fields: Option<FieldSet>, retention: Option<Duration>) -> Self {
        let job_registry = Arc::new(match retention {
            Some(retention) => JobRegistry::with_retention(retention),
            None => JobRegistry::new(),
        });

        let field_catalog = Arc::new(FieldCatalog::new());
        if let Some(fields) = fields {
            field_catalog.install(fields);
        }

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            admin_tokens: vec![ADMIN_TOKEN.to_string()],
            query_tokens: vec![QUERY_TOKEN.to_string()],
        };

        let app = make_app(config, job_registry.clone(), field_catalog.clone());

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            job_registry,
            field_catalog,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    // Server is ready
                    return;
                }
                _ => {
                    // Server not ready yet, wait and retry
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
