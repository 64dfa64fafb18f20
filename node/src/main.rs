//! Chocolate sales prediction service
//!
//! Loads the trained artifacts once, makes sure the prediction log table
//! exists and serves the prediction API.

use anyhow::{Context, Result};
use choco_model::{load_artifacts, ArtifactPaths};
use choco_rpc::{start_server, AppContext};
use choco_storage::{PgPredictionLog, PoolSettings, PredictionLog};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::{Overrides, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "choco-node")]
#[command(version)]
#[command(about = "Chocolate sales prediction service")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// PostgreSQL connection URL
    #[arg(long)]
    database_url: Option<String>,

    /// Directory containing the trained artifacts
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ServiceConfig::load(
        cli.config.as_deref(),
        Overrides {
            host: cli.host,
            port: cli.port,
            database_url: cli.database_url,
            artifact_dir: cli.artifact_dir,
            log_level: cli.log_level,
        },
    )?;

    init_logging(&config);
    info!("🍫 Starting chocolate sales prediction service v{}", env!("CARGO_PKG_VERSION"));

    let paths = ArtifactPaths::in_dir(&config.artifact_dir);
    let artifacts = load_artifacts(&paths).with_context(|| {
        format!(
            "failed to load artifacts from {} (run choco-train first)",
            config.artifact_dir.display()
        )
    })?;
    info!(
        model = %paths.model.display(),
        hash = %artifacts.model_hash,
        "model and encoders loaded"
    );

    let log = PgPredictionLog::connect_lazy(
        &config.database_url,
        &PoolSettings {
            max_connections: config.db_max_connections,
            acquire_timeout: Duration::from_secs(config.db_acquire_timeout_secs),
        },
    )
    .context("invalid database URL")?;

    // an unreachable database does not stop the service; requests will fail individually
    if let Err(err) = log.ensure_schema().await {
        error!("Failed to prepare prediction log table: {}", err);
    }

    let context = Arc::new(AppContext::new(artifacts, Arc::new(log)));
    start_server(context, &config.bind_addr()).await
}

fn init_logging(config: &ServiceConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "compact" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
