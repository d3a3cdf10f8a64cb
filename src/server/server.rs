use anyhow::Result;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::facade;
use super::metrics::metrics_handler;
use super::session::Session;
use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn get_system_fields(
    session: Session,
    State(field_catalog): State<GuardedFieldCatalog>,
) -> Response {
    if !session.is_admin {
        return StatusCode::FORBIDDEN.into_response();
    }

    match field_catalog.snapshot() {
        Some(snapshot) => Json(facade::field_names(&snapshot)).into_response(),
        None => {
            warn!("field catalog requested but no snapshot is available");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "field catalog unavailable",
            )
                .into_response()
        }
    }
}

async fn get_system_jobs(
    session: Session,
    State(registry): State<GuardedJobRegistry>,
) -> Response {
    if !session.is_admin {
        return StatusCode::FORBIDDEN.into_response();
    }

    Json(facade::job_summaries(&registry)).into_response()
}

impl ServerState {
    fn new(
        config: ServerConfig,
        job_registry: GuardedJobRegistry,
        field_catalog: GuardedFieldCatalog,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            job_registry,
            field_catalog,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    job_registry: GuardedJobRegistry,
    field_catalog: GuardedFieldCatalog,
) -> Router {
    let state = ServerState::new(config, job_registry, field_catalog);

    let system_routes: Router = Router::new()
        .route("/fields", get(get_system_fields))
        .route("/jobs", get(get_system_jobs))
        .with_state(state.clone());

    let app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/system", system_routes);

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

#[allow(clippy::too_many_arguments)]
pub async fn run_server(
    job_registry: Arc<crate::system_jobs::JobRegistry>,
    field_catalog: Arc<crate::fields::FieldCatalog>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    metrics_port: u16,
    admin_tokens: Vec<String>,
    query_tokens: Vec<String>,
    shutdown: CancellationToken,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        admin_tokens,
        query_tokens,
    };
    let app = make_app(config, job_registry, field_catalog);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    let metrics_app: Router = Router::new().route("/metrics", get(metrics_handler));
    let metrics_listener =
        tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port)).await?;

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned());
    let metrics_server = axum::serve(metrics_listener, metrics_app)
        .with_graceful_shutdown(shutdown.cancelled_owned());

    tokio::try_join!(server.into_future(), metrics_server.into_future())?;
    info!("HTTP servers stopped");
    Ok(())
}
