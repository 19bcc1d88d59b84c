//! Loading the four trained artifacts from JSON files.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use carequote_common::{ArtifactPaths, CarequoteError, Result};

use crate::regressor::{ModelSet, ModelSpec, Regressor};
use crate::scaler::{ScalerSet, ScalerSpec, ScalingArtifact};

/// Scaling artifact file: the fitted scaler plus the saved column list.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalingArtifactFile {
    pub scaler: ScalerSpec,
    #[serde(default)]
    pub cols_to_scale: Vec<String>,
}

impl ScalingArtifactFile {
    pub fn into_artifact(self) -> Result<ScalingArtifact> {
        let scaler = self.scaler.into_scaler(&self.cols_to_scale)?;
        Ok(ScalingArtifact::new(Box::new(scaler), self.cols_to_scale))
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn tag_error(identifier: &str, path: &Path, err: CarequoteError) -> CarequoteError {
    CarequoteError::ArtifactLoad(format!("{} ({}): {}", identifier, path.display(), err))
}

/// Load one model artifact.
pub fn load_model(identifier: &str, path: &Path) -> Result<Box<dyn Regressor>> {
    let spec: ModelSpec = read_json(path).map_err(|e| tag_error(identifier, path, e))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let model = spec
        .into_regressor(base_dir)
        .map_err(|e| tag_error(identifier, path, e))?;
    info!("Loaded {} from {} ({})", identifier, path.display(), model.name());
    Ok(model)
}

/// Load one scaling artifact.
pub fn load_scaler(identifier: &str, path: &Path) -> Result<ScalingArtifact> {
    let file: ScalingArtifactFile = read_json(path).map_err(|e| tag_error(identifier, path, e))?;
    let artifact = file.into_artifact().map_err(|e| tag_error(identifier, path, e))?;
    info!(
        "Loaded {} from {} ({} columns)",
        identifier,
        path.display(),
        artifact.expected_columns().len()
    );
    Ok(artifact)
}

/// Both models and both scalers, immutable once loaded.
#[derive(Debug)]
pub struct ArtifactSet {
    pub models: ModelSet,
    pub scalers: ScalerSet,
}

impl ArtifactSet {
    pub fn new(models: ModelSet, scalers: ScalerSet) -> Self {
        Self { models, scalers }
    }

    /// Load all four artifacts. The first failure aborts the load.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let model_young = load_model("young model", &paths.model_young)?;
        let model_rest = load_model("rest model", &paths.model_rest)?;
        let scaler_young = load_scaler("young scaler", &paths.scaler_young)?;
        let scaler_rest = load_scaler("rest scaler", &paths.scaler_rest)?;
        Ok(Self {
            models: ModelSet::new(model_young, model_rest),
            scalers: ScalerSet::new(scaler_young, scaler_rest),
        })
    }
}
