// The `config` module reads the run configuration from the environment.

use crate::utils::google_auth::GConf;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Install directory holding `credentials.json` and `token.json`.
pub const HOME_VAR: &str = "INBOX_TRIAGE_HOME";
/// Groq model id used by all three agents.
pub const MODEL_VAR: &str = "INBOX_TRIAGE_MODEL";
/// Optional sampling temperature for all three agents.
pub const TEMPERATURE_VAR: &str = "INBOX_TRIAGE_TEMPERATURE";

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine the working directory: {0}")]
    WorkingDir(#[from] std::io::Error),
    #[error("Invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriageConfig {
    pub home: PathBuf,
    pub model: String,
    pub temperature: Option<f64>,
}

impl TriageConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let home = match lookup(HOME_VAR).filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir()?,
        };

        let model = lookup(MODEL_VAR)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = match lookup(TEMPERATURE_VAR) {
            Some(raw) if !raw.trim().is_empty() => Some(parse_temperature(&raw)?),
            _ => None,
        };

        Ok(Self {
            home,
            model,
            temperature,
        })
    }

    /// Credential and token locations inside the install directory.
    pub fn gconf(&self) -> GConf {
        GConf::in_dir(&self.home)
    }
}

fn parse_temperature(raw: &str) -> Result<f64, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .ok_or_else(|| ConfigError::InvalidValue {
            var: TEMPERATURE_VAR,
            value: raw.to_string(),
        })
}
