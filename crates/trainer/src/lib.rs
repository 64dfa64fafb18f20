//! Chocolate sales trainer
//!
//! Cleans the raw sales export, fits one label encoder per categorical
//! column and a linear regression on the encoded features, and writes both
//! as the artifact pair the prediction service loads at startup.

pub mod dataset;
pub mod errors;
pub mod trainer;

use choco_model::{save_artifacts, ArtifactPaths};
use std::path::Path;
use tracing::info;

pub use dataset::{parse_amount, SaleRecord, SalesDataset, DEFAULT_DATASET_FILE, REQUIRED_COLUMNS};
pub use errors::TrainerError;
pub use trainer::{SalesTrainer, TrainedArtifacts};

/// Train directly from a CSV file without writing anything.
pub fn train_from_csv(path: &Path) -> Result<TrainedArtifacts, TrainerError> {
    let dataset =
        SalesDataset::from_csv(path).map_err(|err| TrainerError::Dataset(format!("{err:#}")))?;
    info!(
        "Loaded {} records ({} dropped during cleaning)",
        dataset.len(),
        dataset.dropped
    );

    SalesTrainer::new()
        .train(&dataset)
        .map_err(|err| TrainerError::Training(format!("{err:#}")))
}

/// Train from a CSV file and persist the artifact pair.
///
/// Artifacts are only written after training succeeds.
pub fn train_and_save(input: &Path, paths: &ArtifactPaths) -> Result<TrainedArtifacts, TrainerError> {
    let trained = train_from_csv(input)?;
    save_artifacts(paths, &trained.model, &trained.encoders)?;
    Ok(trained)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
