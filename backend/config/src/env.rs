//! Loading [`EcoScanConfig`] from environment variables.
//!
//! Missing API keys are not an error here: each client reports a
//! configuration error on first use instead.

use std::collections::HashMap;

use thiserror::Error;

use crate::schema::EcoScanConfig;

pub const VISION_API_KEY_VAR: &str = "GOOGLE_VISION_API_KEY";
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const PLACES_API_KEY_VAR: &str = "PLACES_API_KEY";

pub const BIND_VAR: &str = "ECOSCAN_BIND";
pub const PORT_VAR: &str = "ECOSCAN_PORT";
pub const DB_VAR: &str = "ECOSCAN_DB";
pub const LOG_LEVEL_VAR: &str = "RUST_LOG";
pub const LOG_DIR_VAR: &str = "ECOSCAN_LOG_DIR";
pub const LABEL_SELECTION_VAR: &str = "ECOSCAN_LABEL_SELECTION";
pub const VISION_URL_VAR: &str = "ECOSCAN_VISION_URL";
pub const GEMINI_URL_VAR: &str = "ECOSCAN_GEMINI_URL";
pub const PLACES_URL_VAR: &str = "ECOSCAN_PLACES_URL";

/// A variable is set but its value cannot be used.
#[derive(Debug, Error)]
#[error("Invalid value for env var \"{var_name}\": {message}")]
pub struct InvalidEnvVarError {
    pub var_name: String,
    pub message: String,
}

impl EcoScanConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, InvalidEnvVarError> {
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Load configuration from a provided map (useful for testing).
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self, InvalidEnvVarError> {
        let get = |name: &str| {
            env.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let defaults = Self::default();

        let port = match get(PORT_VAR) {
            Some(raw) => raw.parse().map_err(|_| InvalidEnvVarError {
                var_name: PORT_VAR.to_string(),
                message: format!("'{raw}' is not a valid port"),
            })?,
            None => defaults.port,
        };

        let label_selection = match get(LABEL_SELECTION_VAR) {
            Some(raw) => raw.parse().map_err(|e: ecoscan_core::EcoScanError| {
                InvalidEnvVarError {
                    var_name: LABEL_SELECTION_VAR.to_string(),
                    message: e.to_string(),
                }
            })?,
            None => defaults.label_selection,
        };

        Ok(Self {
            bind_address: get(BIND_VAR).unwrap_or(defaults.bind_address),
            port,
            db_path: get(DB_VAR).unwrap_or(defaults.db_path),
            log_level: get(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: get(LOG_DIR_VAR),
            vision_api_key: get(VISION_API_KEY_VAR),
            gemini_api_key: get(GEMINI_API_KEY_VAR),
            places_api_key: get(PLACES_API_KEY_VAR),
            vision_base_url: get(VISION_URL_VAR).unwrap_or(defaults.vision_base_url),
            gemini_base_url: get(GEMINI_URL_VAR).unwrap_or(defaults.gemini_base_url),
            places_base_url: get(PLACES_URL_VAR).unwrap_or(defaults.places_base_url),
            label_selection,
        })
    }
}
