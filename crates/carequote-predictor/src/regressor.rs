//! Pre-trained premium regressors.
//!
//! Two on-disk formats are understood: plain linear coefficients, and
//! XGBoost JSON dumps evaluated with the `gbdt` crate. The gbdt crate works
//! in `f32`; conversion happens at the crate boundary.

use std::io::Cursor;
use std::path::Path;

use gbdt::decision_tree::{Data, VALUE_TYPE_UNKNOWN};
use gbdt::gradient_boost::GBDT;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use carequote_common::{CarequoteError, Result};

use crate::band::{AgeBand, Banded};
use crate::features::{FeatureVector, FEATURE_COLUMNS, FEATURE_WIDTH};

/// A trained model mapping one feature row to its prediction(s).
pub trait Regressor: Send + Sync {
    /// Predictions for a single-row input; the premium is the first element.
    fn predict(&self, row: &FeatureVector) -> Result<Vec<f64>>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

// ── Linear ───────────────────────────────────────────────────────────────────

/// `y = Σ wᵢ·xᵢ + b` over the schema columns.
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    /// `feature_names` must match the feature schema exactly, in order.
    pub fn new(feature_names: &[String], coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        if feature_names.len() != FEATURE_COLUMNS.len()
            || feature_names.iter().zip(FEATURE_COLUMNS).any(|(a, b)| a != b)
        {
            return Err(CarequoteError::Schema(format!(
                "linear model was trained on {:?}, expected the {}-column feature schema",
                feature_names,
                FEATURE_COLUMNS.len()
            )));
        }
        if coefficients.len() != feature_names.len() {
            return Err(CarequoteError::Schema(format!(
                "{} coefficients for {} features",
                coefficients.len(),
                feature_names.len()
            )));
        }
        Ok(Self { coefficients, intercept })
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, row: &FeatureVector) -> Result<Vec<f64>> {
        let dot: f64 = row
            .values()
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, w)| x * w)
            .sum();
        Ok(vec![dot + self.intercept])
    }

    fn name(&self) -> &str {
        "linear"
    }
}

// ── Gradient-boosted trees ───────────────────────────────────────────────────

/// Map an XGBoost objective onto the name gbdt evaluates as a plain
/// regression. Anything else would squash or reinterpret the premium.
fn regression_objective(objective: &str) -> Result<&'static str> {
    match objective {
        // XGBoost renamed reg:linear; gbdt only knows the old name
        "reg:linear" | "reg:squarederror" => Ok("reg:linear"),
        other => Err(CarequoteError::ArtifactLoad(format!(
            "unsupported objective '{other}', expected reg:linear or reg:squarederror"
        ))),
    }
}

/// Feature index of a split, given as `12` or `"f12"`.
fn split_index(split: &Value) -> Option<usize> {
    match split {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => {
            let digits = s.trim_start_matches(|c: char| !c.is_ascii_digit());
            digits.parse().ok()
        }
        _ => None,
    }
}

fn check_node(node: &Value) -> Result<()> {
    if let Some(split) = node.get("split") {
        match split_index(split) {
            Some(idx) if idx < FEATURE_WIDTH => {}
            _ => {
                return Err(CarequoteError::ArtifactLoad(format!(
                    "tree split on {split}, outside the {FEATURE_WIDTH}-column feature schema"
                )))
            }
        }
    }
    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children {
            check_node(child)?;
        }
    }
    Ok(())
}

/// Check a converted dump (base score line, then a JSON tree array) before
/// gbdt sees it. Returns the number of trees.
fn check_dump(content: &str) -> Result<usize> {
    let body = content.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    let trees: Value = serde_json::from_str(body)
        .map_err(|e| CarequoteError::ArtifactLoad(format!("malformed tree list: {e}")))?;
    let trees = trees
        .as_array()
        .ok_or_else(|| CarequoteError::ArtifactLoad("tree list is not a JSON array".into()))?;
    if trees.is_empty() {
        return Err(CarequoteError::ArtifactLoad("dump contains no trees".into()));
    }
    for tree in trees {
        check_node(tree)?;
    }
    Ok(trees.len())
}

/// Thin wrapper around `gbdt::gradient_boost::GBDT`.
pub struct GradientBoostedRegressor {
    model: GBDT,
}

impl GradientBoostedRegressor {
    /// Load an XGBoost JSON dump trained with a regression objective.
    pub fn from_xgboost_dump(path: &Path, objective: &str) -> Result<Self> {
        let objective = regression_objective(objective)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            CarequoteError::ArtifactLoad(format!("failed to read XGBoost dump {}: {e}", path.display()))
        })?;
        let tree_count = check_dump(&content)?;

        let model = GBDT::from_xgboost_reader(Cursor::new(content.as_bytes()), objective).map_err(|e| {
            CarequoteError::ArtifactLoad(format!("failed to load XGBoost dump {}: {e}", path.display()))
        })?;
        let regressor = Self { model };

        // A model gbdt cannot evaluate answers with its "unknown" sentinel.
        regressor.predict(&FeatureVector::zeros()).map_err(|e| {
            CarequoteError::ArtifactLoad(format!("XGBoost dump {} does not evaluate: {e}", path.display()))
        })?;
        debug!(trees = tree_count, objective, "loaded gradient-boosted model");
        Ok(regressor)
    }
}

impl Regressor for GradientBoostedRegressor {
    fn predict(&self, row: &FeatureVector) -> Result<Vec<f64>> {
        let data = vec![Data::new_test_data(row.to_f32(), None)];
        self.model
            .predict(&data)
            .into_iter()
            .map(|p| {
                if p == VALUE_TYPE_UNKNOWN {
                    Err(CarequoteError::Inference("gradient-boosted model has no usable trees".into()))
                } else {
                    Ok(p as f64)
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "gradient_boosted"
    }
}

// ── On-disk description ──────────────────────────────────────────────────────

fn default_objective() -> String { "reg:linear".to_string() }

/// Model artifact, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear {
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    XgboostDump {
        /// Relative paths resolve against the artifact's directory.
        dump_file: String,
        #[serde(default = "default_objective")]
        objective: String,
    },
}

impl ModelSpec {
    pub fn into_regressor(self, base_dir: &Path) -> Result<Box<dyn Regressor>> {
        match self {
            ModelSpec::Linear { feature_names, coefficients, intercept } => {
                Ok(Box::new(LinearRegressor::new(&feature_names, coefficients, intercept)?))
            }
            ModelSpec::XgboostDump { dump_file, objective } => {
                let path = base_dir.join(dump_file);
                Ok(Box::new(GradientBoostedRegressor::from_xgboost_dump(&path, &objective)?))
            }
        }
    }
}

/// The young and rest models.
pub struct ModelSet {
    models: Banded<Box<dyn Regressor>>,
}

impl ModelSet {
    pub fn new(young: Box<dyn Regressor>, rest: Box<dyn Regressor>) -> Self {
        Self {
            models: Banded::new(young, rest),
        }
    }

    pub fn select(&self, band: AgeBand) -> &dyn Regressor {
        self.models.get(band).as_ref()
    }
}

impl std::fmt::Debug for ModelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSet")
            .field("young", &self.models.young.name())
            .field("rest", &self.models.rest.name())
            .finish()
    }
}
