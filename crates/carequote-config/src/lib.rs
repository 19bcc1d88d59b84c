//! Configuration loading for Carequote.
//! Reads carequote.toml from the current directory or path in CAREQUOTE_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use carequote_common::paths::{MODEL_REST_FILE, MODEL_YOUNG_FILE, SCALER_REST_FILE, SCALER_YOUNG_FILE};
use carequote_common::ArtifactPaths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_model_young")]
    pub model_young: String,
    #[serde(default = "default_model_rest")]
    pub model_rest: String,
    #[serde(default = "default_scaler_young")]
    pub scaler_young: String,
    #[serde(default = "default_scaler_rest")]
    pub scaler_rest: String,
}

fn default_artifacts_dir() -> PathBuf { PathBuf::from("artifacts") }
fn default_model_young()   -> String  { MODEL_YOUNG_FILE.to_string() }
fn default_model_rest()    -> String  { MODEL_REST_FILE.to_string() }
fn default_scaler_young()  -> String  { SCALER_YOUNG_FILE.to_string() }
fn default_scaler_rest()   -> String  { SCALER_REST_FILE.to_string() }

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
            model_young: default_model_young(),
            model_rest: default_model_rest(),
            scaler_young: default_scaler_young(),
            scaler_rest: default_scaler_rest(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject records outside the form's numeric ranges.
    #[serde(default = "default_enforce_ranges")]
    pub enforce_ranges: bool,
}

fn default_enforce_ranges() -> bool { true }

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { enforce_ranges: default_enforce_ranges() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "carequote=info,warn".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

pub const CONFIG_ENV: &str = "CAREQUOTE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "carequote.toml";

impl Config {
    /// Load configuration from carequote.toml.
    /// Checks CAREQUOTE_CONFIG env var first (after reading any .env file),
    /// then the current directory. A missing default file yields defaults;
    /// a missing file named explicitly through the env var is an error.
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load_from(path),
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    tracing::debug!("{} not found, using default configuration", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                Self::load_from(path)
            }
        }
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy carequote.example.toml to carequote.toml and edit it.",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the four artifact identifiers to paths under `artifacts.dir`.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        let a = &self.artifacts;
        ArtifactPaths {
            model_young: a.dir.join(&a.model_young),
            model_rest: a.dir.join(&a.model_rest),
            scaler_young: a.dir.join(&a.scaler_young),
            scaler_rest: a.dir.join(&a.scaler_rest),
        }
    }
}
