//! Premium prediction: features → band scaling → band model.
//!
//! A [`PremiumPredictor`] is built once at startup and shared read-only
//! (behind `Arc` if needed) by every prediction call. If the artifacts
//! failed to load it stays unusable and every call fails fast.

use serde::Serialize;
use tracing::{debug, error, warn};

use carequote_common::{ApplicantRecord, ArtifactPaths, AttributeMap, CarequoteError, Result};

use crate::artifacts::ArtifactSet;
use crate::band::AgeBand;
use crate::features::{build_features, FeatureVector};
use crate::regressor::ModelSet;
use crate::scaler::ScalerSet;

enum ArtifactState {
    Ready(ArtifactSet),
    Unavailable(String),
}

/// Intermediate values of a single prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionTrace {
    pub band: AgeBand,
    pub features: FeatureVector,
    pub scaled: FeatureVector,
    pub scaled_columns: Vec<String>,
    pub model: String,
    pub raw_output: f64,
    pub premium: i64,
}

pub struct PremiumPredictor {
    state: ArtifactState,
    enforce_ranges: bool,
}

impl PremiumPredictor {
    /// Wrap an already-loaded artifact set.
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self {
            state: ArtifactState::Ready(artifacts),
            enforce_ranges: true,
        }
    }

    pub fn from_parts(models: ModelSet, scalers: ScalerSet) -> Self {
        Self::new(ArtifactSet::new(models, scalers))
    }

    /// Load artifacts from disk. A failed load is recorded, not returned:
    /// the predictor then rejects every call with `ArtifactsUnavailable`.
    pub fn load(paths: &ArtifactPaths) -> Self {
        match ArtifactSet::load(paths) {
            Ok(set) => Self::new(set),
            Err(e) => {
                error!("Model or scaler artifacts failed to load: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ArtifactState::Unavailable(reason.into()),
            enforce_ranges: true,
        }
    }

    /// Toggle the numeric range check on incoming records.
    pub fn with_range_validation(mut self, enforce: bool) -> Self {
        self.enforce_ranges = enforce;
        self
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ArtifactState::Ready(_))
    }

    fn artifacts(&self) -> Result<&ArtifactSet> {
        match &self.state {
            ArtifactState::Ready(set) => Ok(set),
            ArtifactState::Unavailable(reason) => {
                Err(CarequoteError::ArtifactsUnavailable(reason.clone()))
            }
        }
    }

    /// Predict the annual premium for a caller record.
    pub fn predict(&self, attrs: &AttributeMap) -> Result<i64> {
        self.artifacts()?;
        let record = ApplicantRecord::from_attributes(attrs)?;
        self.predict_record(&record)
    }

    pub fn predict_record(&self, record: &ApplicantRecord) -> Result<i64> {
        Ok(self.explain(record)?.premium)
    }

    /// Run the pipeline and keep every intermediate value.
    pub fn explain(&self, record: &ApplicantRecord) -> Result<PredictionTrace> {
        let artifacts = self.artifacts()?;
        if self.enforce_ranges {
            record.validate()?;
        }

        let band = AgeBand::for_age(record.age);
        let features = build_features(record);

        let outcome = artifacts.scalers.scale(record.age, &features)?;
        if outcome.is_unscaled() {
            warn!(band = %band, "no valid columns for scaling were found, predicting on unscaled features");
        }

        let model = artifacts.models.select(band);
        let output = model.predict(&outcome.vector)?;
        let raw_output = *output.first().ok_or_else(|| {
            CarequoteError::Inference(format!("{} {} model returned no prediction", band, model.name()))
        })?;
        if !raw_output.is_finite() {
            return Err(CarequoteError::Inference(format!(
                "{} {} model returned {}",
                band,
                model.name(),
                raw_output
            )));
        }
        // Truncates toward zero
        let premium = raw_output as i64;
        debug!(band = %band, model = model.name(), raw_output, premium, "premium predicted");

        Ok(PredictionTrace {
            band,
            features,
            scaled: outcome.vector,
            scaled_columns: outcome.scaled_columns,
            model: model.name().to_string(),
            raw_output,
            premium,
        })
    }
}

impl std::fmt::Debug for PremiumPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            ArtifactState::Ready(_) => "ready".to_string(),
            ArtifactState::Unavailable(reason) => format!("unavailable: {reason}"),
        };
        f.debug_struct("PremiumPredictor")
            .field("state", &state)
            .field("enforce_ranges", &self.enforce_ranges)
            .finish()
    }
}
