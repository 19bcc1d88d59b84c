use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarequoteError {
    #[error("Artifact load error: {0}")]
    ArtifactLoad(String),

    #[error("Model or scaler artifacts are not loaded, cannot predict: {0}")]
    ArtifactsUnavailable(String),

    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    #[error("Invalid value for attribute '{field}': {value}")]
    InvalidAttribute { field: String, value: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CarequoteError {
    pub fn invalid(field: &str, value: impl ToString) -> Self {
        CarequoteError::InvalidAttribute {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// True for the process-wide fatal case where no prediction can proceed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CarequoteError::ArtifactsUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, CarequoteError>;
