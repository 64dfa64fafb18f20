//! Chocolate sales model core
//!
//! Shared contract between the offline trainer and the prediction service:
//! label encoders for categorical order attributes, the fixed feature layout,
//! the linear model and its on-disk artifacts.

pub mod artifacts;
pub mod encoder;
pub mod errors;
pub mod features;
pub mod model;
pub mod serialization;

pub use artifacts::{
    load_artifacts, save_artifacts, ArtifactPaths, LoadedArtifacts, ENCODERS_FILE, MODEL_FILE,
};
pub use encoder::{Encoded, EncoderSet, LabelEncoder};
pub use errors::{ModelError, Result};
pub use features::{
    CategoricalColumn, EncodedOrder, FeatureVector, OrderFeatures, FEATURE_COUNT, FEATURE_NAMES,
};
pub use model::{round_score, LinearModel, ModelMetadata, MODEL_FORMAT_VERSION};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
