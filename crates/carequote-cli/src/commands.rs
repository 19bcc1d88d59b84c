//! Command handlers. Each returns the lines to print so the handlers can be
//! tested without capturing stdout.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::{json, Value};
use tracing::{debug, info};

use carequote_common::catalog::catalog;
use carequote_common::{AttributeMap, CarequoteError};
use carequote_config::Config;
use carequote_predictor::PremiumPredictor;

use crate::format::format_premium;

/// Read a file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn parse_record(text: &str) -> anyhow::Result<AttributeMap> {
    match serde_json::from_str::<Value>(text).context("input is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected a JSON object, got {}", json_kind(&other)),
    }
}

pub fn parse_records(text: &str) -> anyhow::Result<Vec<AttributeMap>> {
    let values = match serde_json::from_str::<Value>(text).context("input is not valid JSON")? {
        Value::Array(values) => values,
        other => anyhow::bail!("expected a JSON array, got {}", json_kind(&other)),
    };
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Object(map) => Ok(map),
            other => anyhow::bail!("record {} is {}, expected a JSON object", i, json_kind(&other)),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Load the configured artifacts once. Load failures are logged by the
/// predictor and surface on the first call.
pub fn load_predictor(config: &Config) -> PremiumPredictor {
    PremiumPredictor::load(&config.artifact_paths())
        .with_range_validation(config.validation.enforce_ranges)
}

// ── predict ──────────────────────────────────────────────────────────────────

pub fn predict(predictor: &PremiumPredictor, attrs: &AttributeMap, as_json: bool) -> anyhow::Result<String> {
    let premium = predictor.predict(attrs)?;
    if as_json {
        Ok(json!({ "premium": premium }).to_string())
    } else {
        Ok(format!("Predicted Annual Premium: {}", format_premium(premium)))
    }
}

// ── batch ────────────────────────────────────────────────────────────────────

/// Score every record on the blocking pool; results keep input order.
pub async fn score_batch(
    predictor: Arc<PremiumPredictor>,
    records: Vec<AttributeMap>,
) -> Vec<carequote_common::Result<i64>> {
    let count = records.len();
    let handles: Vec<_> = records
        .into_iter()
        .map(|attrs| {
            let predictor = Arc::clone(&predictor);
            tokio::task::spawn_blocking(move || predictor.predict(&attrs))
        })
        .collect();

    let mut results = Vec::with_capacity(count);
    for handle in handles {
        let result = handle
            .await
            .unwrap_or_else(|e| Err(CarequoteError::Other(anyhow::anyhow!("scoring task failed: {e}"))));
        results.push(result);
    }
    debug!(count, "batch scored");
    results
}

/// One line per record. A fatal error (artifacts unavailable) aborts the
/// whole batch instead of being repeated for every record.
pub fn render_batch(results: &[carequote_common::Result<i64>], as_json: bool) -> anyhow::Result<Vec<String>> {
    if let Some(Err(e)) = results.iter().find(|r| matches!(r, Err(e) if e.is_fatal())) {
        anyhow::bail!("{e}");
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(total = results.len(), failed, "batch complete");

    Ok(results
        .iter()
        .enumerate()
        .map(|(i, result)| match (result, as_json) {
            (Ok(premium), false) => format!("record {}: {}", i, format_premium(*premium)),
            (Err(e), false) => format!("record {}: error: {}", i, e),
            (Ok(premium), true) => json!({ "record": i, "premium": premium }).to_string(),
            (Err(e), true) => json!({ "record": i, "error": e.to_string() }).to_string(),
        })
        .collect())
}

// ── options ──────────────────────────────────────────────────────────────────

pub fn options() -> Vec<String> {
    let catalog = catalog();
    let mut lines = Vec::new();
    for field in &catalog.categorical {
        lines.push(format!("{}: {}", field.name, field.levels.join(", ")));
    }
    lines.push(format!("insurance_plan: {}", catalog.insurance_plan.join(", ")));
    lines.push(format!("medical_history: {}", catalog.medical_history.join(", ")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use carequote_test_utils::{echo_predictor, reference_attributes, temp_artifacts, with_attr};

    #[test]
    fn test_parse_record_requires_object() {
        assert!(parse_record(r#"{"age": 30}"#).is_ok());
        let err = parse_record("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"));
        assert!(parse_record("not json").is_err());
    }

    #[test]
    fn test_parse_records_rejects_non_objects() {
        assert_eq!(parse_records(r#"[{"a": 1}, {}]"#).unwrap().len(), 2);
        let err = parse_records(r#"[{}, 3]"#).unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_predict_output_formats() {
        let (_dir, paths) = temp_artifacts();
        let predictor = PremiumPredictor::load(&paths);
        let attrs = reference_attributes();
        assert_eq!(
            predict(&predictor, &attrs, false).unwrap(),
            "Predicted Annual Premium: ₹ 19,925"
        );
        assert_eq!(predict(&predictor, &attrs, true).unwrap(), r#"{"premium":19925}"#);
    }

    #[test]
    fn test_predict_from_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applicant.json");
        std::fs::write(&path, serde_json::to_string(&reference_attributes()).unwrap()).unwrap();
        let attrs = parse_record(&read_input(&path).unwrap()).unwrap();
        assert_eq!(predict(&echo_predictor(), &attrs, true).unwrap(), r#"{"premium":2030}"#);
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_reports_per_record() {
        let records = vec![
            with_attr(&reference_attributes(), "age", serde_json::json!(22)),
            with_attr(&reference_attributes(), "insurance_plan", serde_json::json!("Platinum")),
            reference_attributes(),
        ];
        let results = score_batch(Arc::new(echo_predictor()), records).await;
        let lines = render_batch(&results, false).unwrap();
        assert_eq!(lines[0], "record 0: ₹ 1,022");
        assert!(lines[1].starts_with("record 1: error:"));
        assert_eq!(lines[2], "record 2: ₹ 2,030");
    }

    #[tokio::test]
    async fn test_batch_aborts_when_artifacts_unavailable() {
        let predictor = Arc::new(PremiumPredictor::unavailable("rest model missing"));
        let results = score_batch(predictor, vec![reference_attributes()]).await;
        let err = render_batch(&results, true).unwrap_err();
        assert!(err.to_string().contains("rest model missing"));
    }

    #[test]
    fn test_load_predictor_from_config() {
        let (dir, _paths) = temp_artifacts();
        let mut config = Config::default();
        config.artifacts.dir = dir.path().to_path_buf();
        let predictor = load_predictor(&config);
        assert!(predictor.is_ready());
        assert_eq!(predictor.predict(&reference_attributes()).unwrap(), 19925);
    }

    #[test]
    fn test_missing_artifact_reported_once_by_the_predictor() {
        let (dir, paths) = temp_artifacts();
        std::fs::remove_file(&paths.model_rest).unwrap();
        let mut config = Config::default();
        config.artifacts.dir = dir.path().to_path_buf();

        let err = predict(&load_predictor(&config), &reference_attributes(), false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("rest model"));
        assert_eq!(message.matches("rest model").count(), 1);
    }

    #[test]
    fn test_options_list_every_field() {
        let lines = options();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "gender: Male, Female");
        assert!(lines.iter().any(|l| l == "insurance_plan: Silver, Bronze, Gold"));
    }
}
