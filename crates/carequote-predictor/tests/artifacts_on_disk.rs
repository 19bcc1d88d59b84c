//! Loading artifact files and predicting through them.

use pretty_assertions::assert_eq;
use serde_json::json;

use carequote_common::{ApplicantRecord, CarequoteError};
use carequote_predictor::{AgeBand, ArtifactSet, FeatureVector, PremiumPredictor};
use carequote_test_utils::{
    reference_attributes, temp_artifacts, with_attr, write_xgboost_artifacts, young_attributes,
    AGE_SPLIT_DUMP_FILE, REFERENCE_PREMIUM, YOUNG_PREMIUM,
};

#[test]
fn reference_applicant_premium() {
    let (_dir, paths) = temp_artifacts();
    let predictor = PremiumPredictor::load(&paths);
    assert!(predictor.is_ready());
    assert_eq!(predictor.predict(&reference_attributes()).unwrap(), REFERENCE_PREMIUM);
}

#[test]
fn young_applicant_premium() {
    let (_dir, paths) = temp_artifacts();
    let predictor = PremiumPredictor::load(&paths);
    let record = ApplicantRecord::from_attributes(&young_attributes()).unwrap();
    let trace = predictor.explain(&record).unwrap();

    assert_eq!(trace.band, AgeBand::Young);
    assert_eq!(trace.premium, YOUNG_PREMIUM);
    assert_eq!(
        trace.scaled_columns,
        vec!["age", "number_of_dependants", "income_lakhs", "insurance_plan", "genetical_risk"]
    );
    // Diabetes is 6 of 14 risk points
    assert!((trace.features.get("normalized_risk_score").unwrap() - 6.0 / 14.0).abs() < 1e-12);
}

#[test]
fn stale_scaler_column_is_skipped() {
    let (_dir, paths) = temp_artifacts();
    let set = ArtifactSet::load(&paths).unwrap();
    let rest = set.scalers.select(AgeBand::Rest);
    assert!(rest.expected_columns().iter().any(|c| c == "income_level"));

    let predictor = PremiumPredictor::new(set);
    let record = ApplicantRecord::from_attributes(&reference_attributes()).unwrap();
    let trace = predictor.explain(&record).unwrap();
    assert!(!trace.scaled_columns.iter().any(|c| c == "income_level"));
    assert_eq!(trace.scaled_columns.len(), 5);
    // age 30 with min -26/46 and scale 1/46
    assert!((trace.scaled.get("age").unwrap() - 4.0 / 46.0).abs() < 1e-12);
}

#[test]
fn boundary_ages_use_different_artifacts() {
    let (_dir, paths) = temp_artifacts();
    let predictor = PremiumPredictor::load(&paths);
    for (age, band) in [(25, AgeBand::Young), (26, AgeBand::Rest)] {
        let attrs = with_attr(&reference_attributes(), "age", json!(age));
        let record = ApplicantRecord::from_attributes(&attrs).unwrap();
        assert_eq!(predictor.explain(&record).unwrap().band, band);
    }
}

#[test]
fn missing_artifact_makes_predictor_unavailable() {
    let (_dir, paths) = temp_artifacts();
    std::fs::remove_file(&paths.scaler_rest).unwrap();

    let predictor = PremiumPredictor::load(&paths);
    assert!(!predictor.is_ready());
    let err = predictor.predict(&reference_attributes()).unwrap_err();
    match &err {
        CarequoteError::ArtifactsUnavailable(reason) => assert!(reason.contains("rest scaler")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_fatal());
}

#[test]
fn corrupt_model_file_is_reported() {
    let (_dir, paths) = temp_artifacts();
    std::fs::write(&paths.model_young, "{ not json").unwrap();
    let err = ArtifactSet::load(&paths).unwrap_err();
    match err {
        CarequoteError::ArtifactLoad(msg) => assert!(msg.starts_with("young model")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repeated_predictions_agree() {
    let (_dir, paths) = temp_artifacts();
    let predictor = PremiumPredictor::load(&paths);
    let premiums: Vec<i64> = (0..5)
        .map(|_| predictor.predict(&young_attributes()).unwrap())
        .collect();
    assert!(premiums.iter().all(|p| *p == YOUNG_PREMIUM));
}

fn row_with_age(age: f64) -> FeatureVector {
    let mut row = FeatureVector::zeros();
    row.set("age", age);
    row
}

#[test]
fn xgboost_models_load_from_artifact_dir() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_xgboost_artifacts(dir.path(), "reg:squarederror").unwrap();
    let set = ArtifactSet::load(&paths).unwrap();

    for band in [AgeBand::Young, AgeBand::Rest] {
        let model = set.models.select(band);
        assert_eq!(model.name(), "gradient_boosted");
        assert_eq!(model.predict(&row_with_age(20.0)).unwrap(), vec![1000.5]);
        assert_eq!(model.predict(&row_with_age(30.0)).unwrap(), vec![2000.5]);
    }
}

#[test]
fn xgboost_predictor_scores_scaled_rows() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_xgboost_artifacts(dir.path(), "reg:linear").unwrap();
    let predictor = PremiumPredictor::load(&paths);
    assert!(predictor.is_ready());
    // Scaled ages fall well below the split
    assert_eq!(predictor.predict(&reference_attributes()).unwrap(), 1000);
}

#[test]
fn classification_objective_leaves_predictor_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_xgboost_artifacts(dir.path(), "binary:logistic").unwrap();
    let predictor = PremiumPredictor::load(&paths);
    assert!(!predictor.is_ready());
    let err = predictor.predict(&reference_attributes()).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("unsupported objective"));
}

#[test]
fn empty_tree_dump_leaves_predictor_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_xgboost_artifacts(dir.path(), "reg:linear").unwrap();
    std::fs::write(dir.path().join(AGE_SPLIT_DUMP_FILE), "0.5\n[]\n").unwrap();
    let err = ArtifactSet::load(&paths).unwrap_err();
    match err {
        CarequoteError::ArtifactLoad(msg) => {
            assert!(msg.starts_with("young model"));
            assert!(msg.contains("no trees"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
