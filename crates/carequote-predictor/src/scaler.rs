//! Age-band feature scaling.
//!
//! A [`ScalingArtifact`] pairs a fitted transform with the column list saved
//! next to it at training time. Column names embedded in the transform are
//! authoritative; the saved list is only a fallback.

use serde::Deserialize;
use tracing::{debug, warn};

use carequote_common::{CarequoteError, Result};

use crate::band::{AgeBand, Banded};
use crate::features::FeatureVector;

/// A pre-fit numeric transform.
pub trait Scaler: Send + Sync {
    /// Column names recorded inside the transform at fit time, if any.
    fn feature_names_in(&self) -> Option<&[String]>;

    /// Rescale `values`, where `values[i]` belongs to `columns[i]`.
    fn transform(&self, columns: &[String], values: &[f64]) -> Result<Vec<f64>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalerKind {
    /// `(x - mean) / scale`
    Standard,
    /// `x * scale + min`
    MinMax,
}

/// Per-column affine transform fit upstream.
#[derive(Debug, Clone)]
pub struct FittedScaler {
    kind: ScalerKind,
    feature_names_in: Option<Vec<String>>,
    /// Names the parameters are indexed by.
    param_columns: Vec<String>,
    offset: Vec<f64>,
    factor: Vec<f64>,
}

impl FittedScaler {
    /// Build a scaler. Parameters are indexed by `feature_names_in` when
    /// present, otherwise by `param_columns`.
    pub fn new(
        kind: ScalerKind,
        feature_names_in: Option<Vec<String>>,
        param_columns: Vec<String>,
        offset: Vec<f64>,
        factor: Vec<f64>,
    ) -> Result<Self> {
        let param_columns = feature_names_in.clone().unwrap_or(param_columns);
        if offset.len() != param_columns.len() || factor.len() != param_columns.len() {
            return Err(CarequoteError::Schema(format!(
                "scaler has {} columns but {} offsets and {} factors",
                param_columns.len(),
                offset.len(),
                factor.len()
            )));
        }
        Ok(Self {
            kind,
            feature_names_in,
            param_columns,
            offset,
            factor,
        })
    }

    fn apply(&self, idx: usize, x: f64) -> f64 {
        match self.kind {
            ScalerKind::Standard => {
                // Zero-variance columns were fit with unit scale
                let scale = if self.factor[idx] == 0.0 { 1.0 } else { self.factor[idx] };
                (x - self.offset[idx]) / scale
            }
            ScalerKind::MinMax => x * self.factor[idx] + self.offset[idx],
        }
    }
}

impl Scaler for FittedScaler {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn transform(&self, columns: &[String], values: &[f64]) -> Result<Vec<f64>> {
        if columns.len() != values.len() {
            return Err(CarequoteError::Schema(format!(
                "{} columns but {} values passed to scaler",
                columns.len(),
                values.len()
            )));
        }
        columns
            .iter()
            .zip(values)
            .map(|(column, &x)| {
                let idx = self
                    .param_columns
                    .iter()
                    .position(|c| c == column)
                    .ok_or_else(|| {
                        CarequoteError::Schema(format!("scaler was not fit on column '{column}'"))
                    })?;
                Ok(self.apply(idx, x))
            })
            .collect()
    }
}

/// On-disk scaler description, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerSpec {
    Standard {
        #[serde(default)]
        feature_names_in: Option<Vec<String>>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMax {
        #[serde(default)]
        feature_names_in: Option<Vec<String>>,
        min: Vec<f64>,
        scale: Vec<f64>,
    },
}

impl ScalerSpec {
    /// Resolve into a scaler; `saved_columns` indexes the parameters when
    /// the description carries no embedded names.
    pub fn into_scaler(self, saved_columns: &[String]) -> Result<FittedScaler> {
        match self {
            ScalerSpec::Standard { feature_names_in, mean, scale } => FittedScaler::new(
                ScalerKind::Standard,
                feature_names_in,
                saved_columns.to_vec(),
                mean,
                scale,
            ),
            ScalerSpec::MinMax { feature_names_in, min, scale } => FittedScaler::new(
                ScalerKind::MinMax,
                feature_names_in,
                saved_columns.to_vec(),
                min,
                scale,
            ),
        }
    }
}

/// A scaler plus the column list saved beside it.
pub struct ScalingArtifact {
    scaler: Box<dyn Scaler>,
    saved_columns: Vec<String>,
}

impl ScalingArtifact {
    pub fn new(scaler: Box<dyn Scaler>, saved_columns: Vec<String>) -> Self {
        match scaler.feature_names_in() {
            Some(embedded) if !saved_columns.is_empty() && embedded != saved_columns.as_slice() => {
                warn!(
                    embedded = ?embedded,
                    saved = ?saved_columns,
                    "saved scaling columns disagree with the scaler's own; using the scaler's"
                );
            }
            None => {
                warn!("scaler carries no feature names, falling back to saved column list");
            }
            _ => {}
        }
        Self { scaler, saved_columns }
    }

    /// Columns to scale: embedded names first, saved list otherwise.
    pub fn expected_columns(&self) -> &[String] {
        self.scaler
            .feature_names_in()
            .unwrap_or(self.saved_columns.as_slice())
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }
}

impl std::fmt::Debug for ScalingArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalingArtifact")
            .field("expected_columns", &self.expected_columns())
            .finish()
    }
}

/// Result of applying a scaling artifact.
#[derive(Debug, Clone)]
pub struct ScaleOutcome {
    pub vector: FeatureVector,
    /// Columns actually rescaled, in the artifact's order. Empty means the
    /// vector passed through unscaled.
    pub scaled_columns: Vec<String>,
}

impl ScaleOutcome {
    pub fn is_unscaled(&self) -> bool {
        self.scaled_columns.is_empty()
    }
}

/// Rescale the columns both expected by `artifact` and present in `vector`.
pub fn apply_scaling(artifact: &ScalingArtifact, vector: &FeatureVector) -> Result<ScaleOutcome> {
    let columns: Vec<String> = artifact
        .expected_columns()
        .iter()
        .filter(|c| vector.get(c).is_some())
        .cloned()
        .collect();

    if columns.is_empty() {
        return Ok(ScaleOutcome {
            vector: vector.clone(),
            scaled_columns: columns,
        });
    }

    let inputs: Vec<f64> = columns.iter().filter_map(|c| vector.get(c)).collect();
    let scaled = artifact.scaler().transform(&columns, &inputs)?;
    if scaled.len() != columns.len() {
        return Err(CarequoteError::Schema(format!(
            "scaler returned {} values for {} columns",
            scaled.len(),
            columns.len()
        )));
    }

    let mut out = vector.clone();
    for (column, value) in columns.iter().zip(scaled) {
        out.set(column, value);
    }
    debug!(count = columns.len(), "scaled feature columns");

    Ok(ScaleOutcome {
        vector: out,
        scaled_columns: columns,
    })
}

/// The young and rest scaling artifacts.
#[derive(Debug)]
pub struct ScalerSet {
    artifacts: Banded<ScalingArtifact>,
}

impl ScalerSet {
    pub fn new(young: ScalingArtifact, rest: ScalingArtifact) -> Self {
        Self {
            artifacts: Banded::new(young, rest),
        }
    }

    pub fn select(&self, band: AgeBand) -> &ScalingArtifact {
        self.artifacts.get(band)
    }

    /// Scale `vector` with the artifact for `age`'s band.
    pub fn scale(&self, age: u32, vector: &FeatureVector) -> Result<ScaleOutcome> {
        apply_scaling(self.select(AgeBand::for_age(age)), vector)
    }
}
