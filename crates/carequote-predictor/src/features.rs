//! Feature preparation: applicant record → model-ready feature vector.
//!
//! The build runs in three steps:
//! 1. base numeric fields, ordinal plan tier and normalised risk score
//! 2. drop-first indicator columns for each categorical field
//! 3. alignment to [`FEATURE_COLUMNS`]: absent columns become 0, unknown
//!    columns are discarded, order is fixed
//!
//! A categorical level with no schema column after step 3 (the reference
//! level, an unseen label, or a level the trained schema lacks) leaves the
//! whole indicator block at 0.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

use carequote_common::ApplicantRecord;

use crate::risk::normalized_risk_score;

/// Column layout the trained models expect, in order.
pub const FEATURE_COLUMNS: [&str; 18] = [
    "age",
    "number_of_dependants",
    "income_lakhs",
    "insurance_plan",
    "genetical_risk",
    "normalized_risk_score",
    "gender_Male",
    "region_Northwest",
    "region_Southeast",
    "region_Southwest",
    "marital_status_Unmarried",
    "bmi_category_Obesity",
    "bmi_category_Overweight",
    "bmi_category_Underweight",
    "smoking_status_Occasional",
    "smoking_status_Regular",
    "employment_status_Salaried",
    "employment_status_Self-Employed",
];

pub const FEATURE_WIDTH: usize = FEATURE_COLUMNS.len();

pub fn column_index(name: &str) -> Option<usize> {
    FEATURE_COLUMNS.iter().position(|c| *c == name)
}

/// A single row laid out as [`FEATURE_COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_WIDTH],
}

impl FeatureVector {
    pub fn zeros() -> Self {
        Self { values: [0.0; FEATURE_WIDTH] }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        FEATURE_WIDTH
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        column_index(column).map(|i| self.values[i])
    }

    /// Set a schema column. Returns false if `column` is not in the schema.
    pub fn set(&mut self, column: &str, value: f64) -> bool {
        match column_index(column) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_COLUMNS.iter().copied().zip(self.values.iter().copied())
    }

    /// Values as `f32`, for inference backends that use single precision.
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_WIDTH))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}

/// Named columns produced before alignment.
pub type EncodedRecord = HashMap<String, f64>;

/// Numeric fields, plan tier and the derived risk score.
fn base_columns(record: &ApplicantRecord) -> EncodedRecord {
    let mut encoded = EncodedRecord::with_capacity(FEATURE_WIDTH);
    encoded.insert("age".into(), record.age as f64);
    encoded.insert("number_of_dependants".into(), record.number_of_dependants as f64);
    encoded.insert("income_lakhs".into(), record.income_lakhs);
    encoded.insert("insurance_plan".into(), record.insurance_plan.encoded() as f64);
    encoded.insert("genetical_risk".into(), record.genetical_risk as f64);
    encoded.insert(
        "normalized_risk_score".into(),
        normalized_risk_score(&record.medical_history),
    );
    encoded
}

/// Drop-first one-hot encoding: non-reference levels get a
/// `{field}_{level}` column set to 1.
fn encode_categoricals(record: &ApplicantRecord, encoded: &mut EncodedRecord) {
    for (field, level) in record.categorical_values() {
        if level == field.reference_level() {
            continue;
        }
        if field.is_known_level(level) {
            encoded.insert(field.indicator_column(level), 1.0);
        } else {
            // Unseen labels encode like the reference level.
            warn!(field = field.name, label = level, "unrecognised categorical level, encoding as reference");
        }
    }
}

/// Encode a record into named columns without aligning them.
pub fn encode(record: &ApplicantRecord) -> EncodedRecord {
    let mut encoded = base_columns(record);
    encode_categoricals(record, &mut encoded);
    encoded
}

/// Project named columns onto the fixed schema.
pub fn align(encoded: &EncodedRecord) -> FeatureVector {
    let mut vector = FeatureVector::zeros();
    for (column, value) in encoded {
        if !vector.set(column, *value) {
            debug!(column = column.as_str(), "dropping column outside the trained schema");
        }
    }
    vector
}

/// Full feature build for one applicant.
pub fn build_features(record: &ApplicantRecord) -> FeatureVector {
    align(&encode(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carequote_common::InsurancePlan;

    fn reference_record() -> ApplicantRecord {
        ApplicantRecord {
            age: 30,
            number_of_dependants: 2,
            income_lakhs: 10.0,
            genetical_risk: 3,
            insurance_plan: InsurancePlan::Gold,
            employment_status: "Salaried".into(),
            gender: "Male".into(),
            marital_status: "Married".into(),
            bmi_category: "Normal".into(),
            smoking_status: "No Smoking".into(),
            region: "Northeast".into(),
            medical_history: "No Disease".into(),
        }
    }

    fn indicator_sum(v: &FeatureVector) -> f64 {
        v.iter().skip(6).map(|(_, x)| x).sum()
    }

    #[test]
    fn test_schema_width() {
        assert_eq!(FEATURE_WIDTH, 18);
        assert_eq!(build_features(&reference_record()).len(), 18);
    }

    #[test]
    fn test_base_columns() {
        let v = build_features(&reference_record());
        assert_eq!(v.get("age"), Some(30.0));
        assert_eq!(v.get("number_of_dependants"), Some(2.0));
        assert_eq!(v.get("income_lakhs"), Some(10.0));
        assert_eq!(v.get("insurance_plan"), Some(3.0));
        assert_eq!(v.get("genetical_risk"), Some(3.0));
        assert_eq!(v.get("normalized_risk_score"), Some(0.0));
    }

    #[test]
    fn test_reference_levels_give_zero_indicators() {
        let mut r = reference_record();
        r.marital_status = "Unmarried".into();
        let v = build_features(&r);
        assert_eq!(indicator_sum(&v), 0.0);
    }

    #[test]
    fn test_non_reference_levels_set_schema_indicators() {
        let mut r = reference_record();
        r.region = "Southwest".into();
        r.bmi_category = "Obesity".into();
        r.smoking_status = "Regular".into();
        r.employment_status = "Self-Employed".into();
        let v = build_features(&r);
        assert_eq!(v.get("region_Southwest"), Some(1.0));
        assert_eq!(v.get("region_Northwest"), Some(0.0));
        assert_eq!(v.get("bmi_category_Obesity"), Some(1.0));
        assert_eq!(v.get("smoking_status_Regular"), Some(1.0));
        assert_eq!(v.get("employment_status_Self-Employed"), Some(1.0));
        assert_eq!(indicator_sum(&v), 4.0);
    }

    #[test]
    fn test_levels_without_schema_column_are_discarded() {
        let mut r = reference_record();
        r.gender = "Female".into();
        r.employment_status = "Freelancer".into();
        let encoded = encode(&r);
        assert_eq!(encoded.get("gender_Female"), Some(&1.0));
        let v = align(&encoded);
        assert_eq!(v.get("gender_Male"), Some(0.0));
        assert_eq!(indicator_sum(&v), 0.0);
    }

    #[test]
    fn test_unseen_level_encodes_as_reference() {
        let mut r = reference_record();
        r.region = "north east".into();
        let v = build_features(&r);
        assert_eq!(v, build_features(&reference_record()));
    }

    #[test]
    fn test_serializes_in_schema_order() {
        let json = serde_json::to_string(&build_features(&reference_record())).unwrap();
        let age = json.find("\"age\"").unwrap();
        let emp = json.find("employment_status_Self-Employed").unwrap();
        assert!(age < emp);
    }
}
