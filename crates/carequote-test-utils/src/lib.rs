//! Shared fixtures for Carequote tests: reference applicants, fake
//! regressors and scalers, and a complete on-disk artifact set.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{json, Value};

use carequote_common::{ApplicantRecord, ArtifactPaths, AttributeMap, Result};
use carequote_predictor::{
    FeatureVector, ModelSet, PremiumPredictor, Regressor, Scaler, ScalerSet, ScalingArtifact,
    FEATURE_COLUMNS,
};

// ── Applicants ───────────────────────────────────────────────────────────────

/// The end-to-end reference applicant: 30 years old, Gold plan, all
/// categorical attributes at their reference level except marital status.
pub fn reference_attributes() -> AttributeMap {
    as_map(json!({
        "age": 30,
        "number_of_dependants": 2,
        "income_lakhs": 10.0,
        "genetical_risk": 3,
        "insurance_plan": "Gold",
        "employment_status": "Salaried",
        "gender": "Male",
        "marital_status": "Married",
        "bmi_category": "Normal",
        "smoking_status": "No Smoking",
        "region": "Northeast",
        "medical_history": "No Disease"
    }))
}

/// A young-band applicant with a single diagnosis.
pub fn young_attributes() -> AttributeMap {
    as_map(json!({
        "age": 22,
        "number_of_dependants": 0,
        "income_lakhs": 5.0,
        "genetical_risk": 5,
        "insurance_plan": "Silver",
        "employment_status": "Salaried",
        "gender": "Male",
        "marital_status": "Unmarried",
        "bmi_category": "Normal",
        "smoking_status": "No Smoking",
        "region": "Northeast",
        "medical_history": "Diabetes"
    }))
}

pub fn reference_record() -> ApplicantRecord {
    ApplicantRecord::from_attributes(&reference_attributes())
        .expect("reference attributes are valid")
}

/// Copy of `base` with one attribute replaced.
pub fn with_attr(base: &AttributeMap, key: &str, value: Value) -> AttributeMap {
    let mut attrs = base.clone();
    attrs.insert(key.to_string(), value);
    attrs
}

pub fn as_map(value: Value) -> AttributeMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

// ── Fake capabilities ────────────────────────────────────────────────────────

/// Always predicts the same value and counts its calls.
pub struct FixedRegressor {
    label: String,
    value: f64,
    calls: AtomicUsize,
}

impl FixedRegressor {
    pub fn new(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Regressor for FixedRegressor {
    fn predict(&self, _row: &FeatureVector) -> Result<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![self.value])
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Predicts the value of one feature column, to observe scaling.
pub struct ColumnEchoRegressor {
    column: &'static str,
}

impl ColumnEchoRegressor {
    pub fn new(column: &'static str) -> Self {
        Self { column }
    }
}

impl Regressor for ColumnEchoRegressor {
    fn predict(&self, row: &FeatureVector) -> Result<Vec<f64>> {
        Ok(row.get(self.column).into_iter().collect())
    }

    fn name(&self) -> &str {
        "column_echo"
    }
}

/// Adds a constant to every column it is asked to scale.
pub struct OffsetScaler {
    columns: Option<Vec<String>>,
    offset: f64,
}

impl OffsetScaler {
    pub fn new(columns: &[&str], offset: f64) -> Self {
        Self {
            columns: Some(columns.iter().map(|c| c.to_string()).collect()),
            offset,
        }
    }

    /// A scaler without embedded names, relying on the saved column list.
    pub fn anonymous(offset: f64) -> Self {
        Self { columns: None, offset }
    }
}

impl Scaler for OffsetScaler {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    fn transform(&self, _columns: &[String], values: &[f64]) -> Result<Vec<f64>> {
        Ok(values.iter().map(|v| v + self.offset).collect())
    }
}

pub fn offset_artifact(columns: &[&str], offset: f64) -> ScalingArtifact {
    ScalingArtifact::new(Box::new(OffsetScaler::new(columns, offset)), Vec::new())
}

/// Young adds 1000 to `age`, rest adds 2000; the models echo `age`.
/// The premium therefore reveals which scaler ran.
pub fn echo_predictor() -> PremiumPredictor {
    PremiumPredictor::from_parts(
        ModelSet::new(
            Box::new(ColumnEchoRegressor::new("age")),
            Box::new(ColumnEchoRegressor::new("age")),
        ),
        ScalerSet::new(
            offset_artifact(&["age"], 1000.0),
            offset_artifact(&["age"], 2000.0),
        ),
    )
}

// ── On-disk artifacts ────────────────────────────────────────────────────────

const YOUNG_COEFFICIENTS: [f64; 18] = [
    40.0, -20.0, -10.0, 1000.0, 1200.0, 1400.0, 10.0, -5.0, 8.0, 4.0, -12.0, 300.0, 150.0,
    60.0, 120.0, 380.0, 20.0, 35.0,
];
const YOUNG_INTERCEPT: f64 = 3800.0;

const REST_COEFFICIENTS: [f64; 18] = [
    7000.0, -1300.0, -700.0, 14000.0, 0.0, 6000.0, 30.0, -60.0, 90.0, 40.0, -50.0, 800.0, 400.0,
    100.0, 600.0, 2200.0, 40.0, 70.0,
];
const REST_INTERCEPT: f64 = 5900.0;

/// Premium the on-disk artifacts produce for [`reference_attributes`].
pub const REFERENCE_PREMIUM: i64 = 19925;
/// Premium the on-disk artifacts produce for [`young_attributes`].
pub const YOUNG_PREMIUM: i64 = 5522;

pub fn linear_model_json(coefficients: &[f64], intercept: f64) -> Value {
    json!({
        "kind": "linear",
        "feature_names": FEATURE_COLUMNS,
        "coefficients": coefficients,
        "intercept": intercept
    })
}

/// Young scaler: no embedded names, parameters indexed by `cols_to_scale`.
pub fn young_scaler_json() -> Value {
    json!({
        "scaler": {
            "kind": "min_max",
            "min": [-18.0 / 7.0, 0.0, -1.0 / 99.0, -0.5, 0.0],
            "scale": [1.0 / 7.0, 0.2, 1.0 / 99.0, 0.5, 0.1]
        },
        "cols_to_scale": ["age", "number_of_dependants", "income_lakhs", "insurance_plan", "genetical_risk"]
    })
}

/// Rest scaler: embedded names still include `income_level`, which the
/// feature schema no longer has; the saved list disagrees.
pub fn rest_scaler_json() -> Value {
    json!({
        "scaler": {
            "kind": "min_max",
            "feature_names_in": [
                "age", "number_of_dependants", "income_level",
                "income_lakhs", "insurance_plan", "genetical_risk"
            ],
            "min": [-26.0 / 46.0, 0.0, -1.0 / 3.0, -1.0 / 99.0, -0.5, 0.0],
            "scale": [1.0 / 46.0, 0.2, 1.0 / 3.0, 1.0 / 99.0, 0.5, 0.1]
        },
        "cols_to_scale": ["age", "number_of_dependants", "income_lakhs", "insurance_plan", "genetical_risk"]
    })
}

fn write_json(path: &Path, value: &Value) -> std::io::Result<()> {
    std::fs::write(path, serde_json::to_vec_pretty(value)?)
}

/// Write a complete four-artifact set into `dir`.
pub fn write_artifacts(dir: &Path) -> std::io::Result<ArtifactPaths> {
    let paths = ArtifactPaths::in_dir(dir);
    write_json(&paths.model_young, &linear_model_json(&YOUNG_COEFFICIENTS, YOUNG_INTERCEPT))?;
    write_json(&paths.model_rest, &linear_model_json(&REST_COEFFICIENTS, REST_INTERCEPT))?;
    write_json(&paths.scaler_young, &young_scaler_json())?;
    write_json(&paths.scaler_rest, &rest_scaler_json())?;
    Ok(paths)
}

/// Converted XGBoost dump: base score 0.5, one tree splitting on `age`
/// (feature 0) at 26 with leaves 1000 and 2000.
pub const AGE_SPLIT_DUMP: &str = "0.5\n[{\"nodeid\":0,\"depth\":0,\"split\":\"f0\",\"split_condition\":26,\"yes\":1,\"no\":2,\"missing\":1,\"children\":[{\"nodeid\":1,\"leaf\":1000},{\"nodeid\":2,\"leaf\":2000}]}]\n";
pub const AGE_SPLIT_DUMP_FILE: &str = "age_split.dump";

pub fn xgboost_model_json(objective: &str) -> Value {
    json!({
        "kind": "xgboost_dump",
        "dump_file": AGE_SPLIT_DUMP_FILE,
        "objective": objective
    })
}

/// Like [`write_artifacts`], but both models are the [`AGE_SPLIT_DUMP`]
/// tree ensemble, referenced relative to `dir`.
pub fn write_xgboost_artifacts(dir: &Path, objective: &str) -> std::io::Result<ArtifactPaths> {
    let paths = write_artifacts(dir)?;
    std::fs::write(dir.join(AGE_SPLIT_DUMP_FILE), AGE_SPLIT_DUMP)?;
    write_json(&paths.model_young, &xgboost_model_json(objective))?;
    write_json(&paths.model_rest, &xgboost_model_json(objective))?;
    Ok(paths)
}

/// Artifacts written into a fresh temporary directory. Keep the returned
/// `TempDir` alive for as long as the paths are used.
pub fn temp_artifacts() -> (tempfile::TempDir, ArtifactPaths) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let paths = write_artifacts(dir.path()).expect("write artifacts");
    (dir, paths)
}
