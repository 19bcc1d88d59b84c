//! Locations of the four trained artifacts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const MODEL_YOUNG_FILE: &str = "model_young.json";
pub const MODEL_REST_FILE: &str = "model_rest.json";
pub const SCALER_YOUNG_FILE: &str = "scaler_young.json";
pub const SCALER_REST_FILE: &str = "scaler_rest.json";

/// Paths to the young/rest models and scalers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub model_young: PathBuf,
    pub model_rest: PathBuf,
    pub scaler_young: PathBuf,
    pub scaler_rest: PathBuf,
}

impl ArtifactPaths {
    /// The default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model_young: dir.join(MODEL_YOUNG_FILE),
            model_rest: dir.join(MODEL_REST_FILE),
            scaler_young: dir.join(SCALER_YOUNG_FILE),
            scaler_rest: dir.join(SCALER_REST_FILE),
        }
    }
}
