//! The applicant record a caller submits for a premium quote.
//!
//! Callers hand over a flat [`AttributeMap`]; [`ApplicantRecord::from_attributes`]
//! turns it into typed fields. Categorical attributes stay raw labels so that
//! unseen levels fall back to the reference encoding instead of failing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{CategoricalField, CATEGORICAL_FIELDS};
use crate::error::{CarequoteError, Result};

/// Flat attribute record as supplied by the caller.
pub type AttributeMap = serde_json::Map<String, Value>;

/// Insurance plan tier, ordinal-encoded for the models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsurancePlan {
    Bronze,
    Silver,
    Gold,
}

impl InsurancePlan {
    /// Ordinal encoding: Bronze=1, Silver=2, Gold=3.
    pub fn encoded(self) -> u8 {
        match self {
            InsurancePlan::Bronze => 1,
            InsurancePlan::Silver => 2,
            InsurancePlan::Gold => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InsurancePlan::Bronze => "Bronze",
            InsurancePlan::Silver => "Silver",
            InsurancePlan::Gold => "Gold",
        }
    }
}

impl fmt::Display for InsurancePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsurancePlan {
    type Err = CarequoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Bronze" => Ok(InsurancePlan::Bronze),
            "Silver" => Ok(InsurancePlan::Silver),
            "Gold" => Ok(InsurancePlan::Gold),
            other => Err(CarequoteError::invalid("insurance_plan", other)),
        }
    }
}

/// Typed applicant attributes, keyed exactly like the caller's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: u32,
    pub number_of_dependants: u32,
    pub income_lakhs: f64,
    pub genetical_risk: u32,
    pub insurance_plan: InsurancePlan,
    pub employment_status: String,
    pub gender: String,
    pub marital_status: String,
    pub bmi_category: String,
    pub smoking_status: String,
    pub region: String,
    pub medical_history: String,
}

impl ApplicantRecord {
    /// Parse the twelve required attributes out of a caller record.
    /// Extra keys are ignored.
    pub fn from_attributes(attrs: &AttributeMap) -> Result<Self> {
        Ok(Self {
            age: require_count(attrs, "age")?,
            number_of_dependants: require_count(attrs, "number_of_dependants")?,
            income_lakhs: require_number(attrs, "income_lakhs")?,
            genetical_risk: require_count(attrs, "genetical_risk")?,
            insurance_plan: require_str(attrs, "insurance_plan")?.parse()?,
            employment_status: require_str(attrs, "employment_status")?.to_string(),
            gender: require_str(attrs, "gender")?.to_string(),
            marital_status: require_str(attrs, "marital_status")?.to_string(),
            bmi_category: require_str(attrs, "bmi_category")?.to_string(),
            smoking_status: require_str(attrs, "smoking_status")?.to_string(),
            region: require_str(attrs, "region")?.to_string(),
            medical_history: require_str(attrs, "medical_history")?.to_string(),
        })
    }

    /// Check the numeric ranges the intake form enforces.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.age) {
            return Err(CarequoteError::invalid("age", self.age));
        }
        if self.number_of_dependants > 20 {
            return Err(CarequoteError::invalid(
                "number_of_dependants",
                self.number_of_dependants,
            ));
        }
        if !self.income_lakhs.is_finite() || self.income_lakhs < 1.0 {
            return Err(CarequoteError::invalid("income_lakhs", self.income_lakhs));
        }
        if self.genetical_risk > 10 {
            return Err(CarequoteError::invalid("genetical_risk", self.genetical_risk));
        }
        Ok(())
    }

    /// Each categorical field paired with this record's raw label, in
    /// [`CATEGORICAL_FIELDS`] order.
    pub fn categorical_values(&self) -> [(&'static CategoricalField, &str); 6] {
        let fields: &'static [CategoricalField; 6] = &CATEGORICAL_FIELDS;
        let [gender, region, marital, bmi, smoking, employment] = fields;
        [
            (gender, self.gender.as_str()),
            (region, self.region.as_str()),
            (marital, self.marital_status.as_str()),
            (bmi, self.bmi_category.as_str()),
            (smoking, self.smoking_status.as_str()),
            (employment, self.employment_status.as_str()),
        ]
    }
}

fn require<'a>(attrs: &'a AttributeMap, field: &str) -> Result<&'a Value> {
    match attrs.get(field) {
        Some(Value::Null) | None => Err(CarequoteError::MissingAttribute(field.to_string())),
        Some(v) => Ok(v),
    }
}

fn require_str<'a>(attrs: &'a AttributeMap, field: &str) -> Result<&'a str> {
    let value = require(attrs, field)?;
    value
        .as_str()
        .ok_or_else(|| CarequoteError::invalid(field, value))
}

fn require_number(attrs: &AttributeMap, field: &str) -> Result<f64> {
    let value = require(attrs, field)?;
    value
        .as_f64()
        .ok_or_else(|| CarequoteError::invalid(field, value))
}

/// Non-negative whole number; integral floats such as `30.0` are accepted.
fn require_count(attrs: &AttributeMap, field: &str) -> Result<u32> {
    let value = require(attrs, field)?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map_err(|_| CarequoteError::invalid(field, value));
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(CarequoteError::invalid(field, value)),
    }
}
