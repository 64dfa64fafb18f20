use thiserror::Error;

/// Errors returned by the sales trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("artifact error: {0}")]
    Artifact(#[from] choco_model::ModelError),
}
