//! Medical-history risk scoring.
//!
//! A history label is one condition or several joined by `" & "`. Each
//! condition carries fixed severity points; the sum is normalised by a
//! constant ceiling into [0, 1].

/// Separator between conditions in a compound history label.
pub const CONDITION_SEPARATOR: &str = " & ";

/// Heart disease (8) plus diabetes or high blood pressure (6).
pub const MAX_RISK_POINTS: f64 = 14.0;

/// Severity points per lowercased condition name.
const CONDITION_POINTS: [(&str, f64); 6] = [
    ("diabetes", 6.0),
    ("heart disease", 8.0),
    ("high blood pressure", 6.0),
    ("thyroid", 5.0),
    ("no disease", 0.0),
    ("none", 0.0),
];

/// Points for a single condition. Unrecognised conditions score 0.
pub fn condition_points(condition: &str) -> f64 {
    let condition = condition.to_lowercase();
    CONDITION_POINTS
        .iter()
        .find(|(name, _)| *name == condition)
        .map(|(_, points)| *points)
        .unwrap_or(0.0)
}

/// Normalised risk score for a medical-history label.
pub fn normalized_risk_score(medical_history: &str) -> f64 {
    let total: f64 = medical_history
        .split(CONDITION_SEPARATOR)
        .map(condition_points)
        .sum();

    normalise_points(total, MAX_RISK_POINTS)
}

fn normalise_points(total: f64, ceiling: f64) -> f64 {
    if ceiling == 0.0 {
        return 0.0;
    }
    total / ceiling
}
