//! Chocolate sales trainer CLI
//!
//! Offline step that produces the model and encoder artifacts.

use anyhow::{Context, Result};
use choco_model::ArtifactPaths;
use choco_trainer::{train_and_save, DEFAULT_DATASET_FILE};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "choco-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fit the chocolate sales regression model and its label encoders", long_about = None)]
struct Args {
    /// Input CSV dataset path
    #[arg(short, long, default_value = DEFAULT_DATASET_FILE)]
    input: PathBuf,

    /// Directory receiving the model and encoder artifacts
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Chocolate sales trainer v{}", env!("CARGO_PKG_VERSION"));
    info!("Loading dataset from: {}", args.input.display());

    let paths = ArtifactPaths::in_dir(&args.output_dir);
    let trained = train_and_save(&args.input, &paths).context("Training failed")?;

    for (column, encoder) in trained.encoders.iter() {
        info!("  {}: {} classes", column, encoder.len());
    }

    let model = &trained.model;
    info!("Coefficients:");
    for (name, coef) in model.feature_names.iter().zip(&model.coefficients) {
        info!("  {}: {:.4}", name, coef);
    }
    info!("  intercept: {:.4}", model.intercept);
    info!("  model hash: {}", model.model_hash()?);

    info!("✓ Training completed successfully");
    info!("  Model: {}", paths.model.display());
    info!("  Encoders: {}", paths.encoders.display());

    Ok(())
}
