//! carequote-predictor - Annual health-insurance premium prediction.
//!
//! Pipeline per call:
//! applicant record → risk score and encoding → aligned feature vector →
//! age-band scaling → age-band regressor → integer premium.
//!
//! # Example
//! ```no_run
//! use carequote_common::ArtifactPaths;
//! use carequote_predictor::PremiumPredictor;
//!
//! let predictor = PremiumPredictor::load(&ArtifactPaths::in_dir("artifacts"));
//! let record = serde_json::json!({
//!     "age": 30, "number_of_dependants": 2, "income_lakhs": 10.0,
//!     "genetical_risk": 3, "insurance_plan": "Gold",
//!     "employment_status": "Salaried", "gender": "Male",
//!     "marital_status": "Married", "bmi_category": "Normal",
//!     "smoking_status": "No Smoking", "region": "Northeast",
//!     "medical_history": "No Disease"
//! });
//! let premium = predictor.predict(record.as_object().unwrap())?;
//! println!("{premium}");
//! # Ok::<(), carequote_common::CarequoteError>(())
//! ```

pub mod risk;
pub mod band;
pub mod features;
pub mod scaler;
pub mod regressor;
pub mod artifacts;
pub mod predictor;

pub use artifacts::ArtifactSet;
pub use band::{AgeBand, YOUNG_MAX_AGE};
pub use features::{build_features, FeatureVector, FEATURE_COLUMNS};
pub use predictor::{PredictionTrace, PremiumPredictor};
pub use regressor::{GradientBoostedRegressor, LinearRegressor, ModelSet, Regressor};
pub use risk::normalized_risk_score;
pub use scaler::{FittedScaler, ScalerKind, ScalerSet, Scaler, ScalingArtifact};
