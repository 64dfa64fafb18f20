//! Persistence of the trained model and encoder set.
//!
//! Both artifacts are written as canonical JSON under fixed file names. A save
//! serializes everything up front and stages each file next to its target
//! before renaming. If the second rename fails the first is rolled back, so a
//! failed run never leaves a new model beside old encoders.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::encoder::EncoderSet;
use crate::errors::{ModelError, Result};
use crate::model::LinearModel;
use crate::serialization::canonical_json_bytes;

/// File name of the fitted model
pub const MODEL_FILE: &str = "modelo_final.json";

/// File name of the fitted encoder set
pub const ENCODERS_FILE: &str = "codificadores.json";

/// Locations of the two artifacts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoders: PathBuf,
}

impl ArtifactPaths {
    /// Fixed artifact names inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            encoders: dir.join(ENCODERS_FILE),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

/// Model and encoders loaded from disk, with the model digest
#[derive(Clone, Debug)]
pub struct LoadedArtifacts {
    pub model: LinearModel,
    pub encoders: EncoderSet,
    pub model_hash: String,
}

/// Write both artifacts. Nothing is renamed into place until both are staged,
/// and on failure the previous pair (if any) is left as it was.
pub fn save_artifacts(
    paths: &ArtifactPaths,
    model: &LinearModel,
    encoders: &EncoderSet,
) -> Result<()> {
    model.validate()?;
    encoders.validate()?;

    let model_bytes = canonical_json_bytes(model)?;
    let encoder_bytes = canonical_json_bytes(encoders)?;

    let staged_model = staging_path(&paths.model);
    let staged_encoders = staging_path(&paths.encoders);

    let staged = write_file(&staged_model, &model_bytes)
        .and_then(|_| write_file(&staged_encoders, &encoder_bytes));
    if let Err(err) = staged {
        let _ = fs::remove_file(&staged_model);
        let _ = fs::remove_file(&staged_encoders);
        return Err(err);
    }

    if let Err(err) = commit(paths, &staged_model, &staged_encoders) {
        let _ = fs::remove_file(&staged_model);
        let _ = fs::remove_file(&staged_encoders);
        return Err(err);
    }

    info!(
        model = %paths.model.display(),
        encoders = %paths.encoders.display(),
        "artifacts written"
    );
    Ok(())
}

/// Read and validate both artifacts
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<LoadedArtifacts> {
    let model: LinearModel = serde_json::from_slice(&read_file(&paths.model)?)?;
    model.validate()?;

    let encoders: EncoderSet = serde_json::from_slice(&read_file(&paths.encoders)?)?;
    encoders.validate()?;

    let model_hash = model.model_hash()?;
    debug!(hash = %model_hash, "model artifact verified");

    Ok(LoadedArtifacts {
        model,
        encoders,
        model_hash,
    })
}

/// Move both staged files into place, restoring the previous model if the
/// encoders cannot follow it.
fn commit(paths: &ArtifactPaths, staged_model: &Path, staged_encoders: &Path) -> Result<()> {
    let backup = sibling_path(&paths.model, ".bak");
    let had_model = paths.model.is_file();
    if had_model {
        rename(&paths.model, &backup)?;
    }

    if let Err(err) = rename(staged_model, &paths.model) {
        if had_model {
            let _ = fs::rename(&backup, &paths.model);
        }
        return Err(err);
    }

    if let Err(err) = rename(staged_encoders, &paths.encoders) {
        warn!(
            encoders = %paths.encoders.display(),
            "encoders could not be written, rolling back model"
        );
        if had_model {
            let _ = fs::rename(&backup, &paths.model);
        } else {
            let _ = fs::remove_file(&paths.model);
        }
        return Err(err);
    }

    if had_model {
        let _ = fs::remove_file(&backup);
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    sibling_path(path, ".tmp")
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|source| ModelError::Io {
        path: to.to_path_buf(),
        source,
    })
}
