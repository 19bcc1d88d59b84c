//! carequote-common - Applicant types, the attribute catalog and the error
//! type shared by all Carequote crates.

pub mod error;
pub mod applicant;
pub mod catalog;
pub mod paths;

// Re-export commonly used types
pub use applicant::{ApplicantRecord, AttributeMap, InsurancePlan};
pub use catalog::{CategoricalField, CATEGORICAL_FIELDS, MEDICAL_HISTORY_LABELS};
pub use error::{CarequoteError, Result};
pub use paths::ArtifactPaths;
