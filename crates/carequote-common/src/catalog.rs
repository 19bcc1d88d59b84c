//! Allowed attribute levels, in the order the intake form defines them.
//!
//! The first level of every categorical field is its reference level: the
//! feature encoding gives it no indicator column.

use serde::Serialize;

/// A categorical applicant attribute and its levels in definition order.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoricalField {
    pub name: &'static str,
    pub levels: &'static [&'static str],
}

impl CategoricalField {
    /// The level that gets no indicator column.
    pub fn reference_level(&self) -> &'static str {
        self.levels[0]
    }

    pub fn is_known_level(&self, level: &str) -> bool {
        self.levels.contains(&level)
    }

    /// Indicator column name for a level, e.g. `region_Northwest`.
    pub fn indicator_column(&self, level: &str) -> String {
        format!("{}_{}", self.name, level)
    }
}

/// One-hot encoded fields, in encoding order.
pub const CATEGORICAL_FIELDS: [CategoricalField; 6] = [
    CategoricalField { name: "gender", levels: &["Male", "Female"] },
    CategoricalField {
        name: "region",
        levels: &["Northeast", "Northwest", "Southeast", "Southwest"],
    },
    CategoricalField { name: "marital_status", levels: &["Unmarried", "Married"] },
    CategoricalField {
        name: "bmi_category",
        levels: &["Normal", "Overweight", "Underweight", "Obesity"],
    },
    CategoricalField {
        name: "smoking_status",
        levels: &["No Smoking", "Occasional", "Regular"],
    },
    CategoricalField {
        name: "employment_status",
        levels: &["Salaried", "Self-Employed", "Freelancer"],
    },
];

/// The nine medical-history labels offered to applicants.
pub const MEDICAL_HISTORY_LABELS: [&str; 9] = [
    "No Disease",
    "High blood pressure",
    "Diabetes",
    "Heart disease",
    "Thyroid",
    "Diabetes & High blood pressure",
    "Diabetes & Heart disease",
    "Diabetes & Thyroid",
    "High blood pressure & Heart disease",
];

/// Plan tiers in the order the form lists them.
pub const INSURANCE_PLANS: [&str; 3] = ["Silver", "Bronze", "Gold"];

/// Serializable view of every allowed value, for callers that build forms.
#[derive(Debug, Clone, Serialize)]
pub struct OptionCatalog {
    pub categorical: Vec<CategoricalField>,
    pub medical_history: Vec<&'static str>,
    pub insurance_plan: Vec<&'static str>,
}

pub fn catalog() -> OptionCatalog {
    OptionCatalog {
        categorical: CATEGORICAL_FIELDS.to_vec(),
        medical_history: MEDICAL_HISTORY_LABELS.to_vec(),
        insurance_plan: INSURANCE_PLANS.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_levels_are_first_defined() {
        let refs: Vec<&str> = CATEGORICAL_FIELDS.iter().map(|f| f.reference_level()).collect();
        assert_eq!(
            refs,
            vec!["Male", "Northeast", "Unmarried", "Normal", "No Smoking", "Salaried"]
        );
    }

    #[test]
    fn test_indicator_column_name() {
        let f = &CATEGORICAL_FIELDS[5];
        assert_eq!(f.indicator_column("Self-Employed"), "employment_status_Self-Employed");
        assert!(f.is_known_level("Freelancer"));
        assert!(!f.is_known_level("freelancer"));
    }

    #[test]
    fn test_catalog_serializes() {
        let json = serde_json::to_value(catalog()).unwrap();
        assert_eq!(json["medical_history"].as_array().unwrap().len(), 9);
        assert_eq!(json["categorical"][1]["name"], "region");
    }
}
