use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import modules from the library crate
use lognode_server::config;
use lognode_server::fields::{
    run_refresher, FieldCatalog, HttpSchemaSource, SchemaSource, StaticSchemaSource,
};
use lognode_server::server::{metrics, run_server, RequestsLoggingLevel};
use lognode_server::system_jobs::JobRegistry;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Token granting access to the /system endpoints. Can be repeated.
    #[clap(long = "admin-token")]
    pub admin_tokens: Vec<String>,

    /// Token accepted as authenticated without admin access. Can be repeated.
    #[clap(long = "query-token")]
    pub query_tokens: Vec<String>,

    /// URL of the schema source the field catalog is refreshed from.
    #[clap(long)]
    pub schema_url: Option<String>,

    /// Path to a JSON file with a fixed field list, instead of a schema URL.
    #[clap(long, value_parser = parse_path)]
    pub fields_file: Option<PathBuf>,

    /// Interval in seconds between field catalog refreshes.
    #[clap(long, default_value_t = 300)]
    pub schema_refresh_secs: u64,

    /// Timeout in seconds for schema source requests.
    #[clap(long, default_value_t = 10)]
    pub schema_timeout_secs: u64,

    /// How long finished jobs stay visible in listings, in seconds.
    #[clap(long, default_value_t = 60)]
    pub job_retention_secs: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            admin_tokens: args.admin_tokens.clone(),
            query_tokens: args.query_tokens.clone(),
            schema_url: args.schema_url.clone(),
            fields_file: args.fields_file.clone(),
            schema_refresh_secs: args.schema_refresh_secs,
            schema_timeout_secs: args.schema_timeout_secs,
            job_retention_secs: args.job_retention_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  port: {}", app_config.port);
    info!("  metrics_port: {}", app_config.metrics_port);
    info!("  job_retention_secs: {}", app_config.job_retention_secs);

    // Initialize metrics system
    info!("Initializing metrics...");
    metrics::init_metrics();

    // The registry is handed explicitly to every subsystem that starts jobs.
    let job_registry = Arc::new(JobRegistry::with_retention(Duration::from_secs(
        app_config.job_retention_secs,
    )));

    let field_catalog = Arc::new(FieldCatalog::new());
    let schema_source: Arc<dyn SchemaSource> = match &app_config.schema.source {
        config::SchemaSourceSettings::Http { url } => {
            info!("Field catalog refreshed from {}", url);
            Arc::new(HttpSchemaSource::new(
                url.clone(),
                app_config.schema.timeout_secs,
            )?)
        }
        config::SchemaSourceSettings::File { path } => {
            info!("Field catalog loaded from {:?}", path);
            Arc::new(StaticSchemaSource::from_file(path)?)
        }
    };

    let shutdown_token = CancellationToken::new();

    let refresher = tokio::spawn(run_refresher(
        field_catalog.clone(),
        schema_source,
        Duration::from_secs(app_config.schema.refresh_secs),
        shutdown_token.child_token(),
    ));

    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);

    // Run HTTP server until it stops or we get a shutdown signal
    let result = tokio::select! {
        result = run_server(
            job_registry.clone(),
            field_catalog,
            app_config.logging_level.clone(),
            app_config.port,
            app_config.metrics_port,
            app_config.admin_tokens.clone(),
            app_config.query_tokens.clone(),
            shutdown_token.clone(),
        ) => {
            info!("HTTP server stopped: {:?}", result);
            result
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            Ok(())
        },
    };

    // Refuse new registrations and flag cancellation to running jobs,
    // then let the background tasks drain.
    job_registry.close();
    shutdown_token.cancel();
    let _ = refresher.await;

    result
}
