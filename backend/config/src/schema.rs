//! EcoScan runtime configuration.

use serde::{Deserialize, Serialize};

use ecoscan_core::LabelSelection;

use crate::defaults::*;

/// Root configuration, loaded once at process start and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcoScanConfig {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// SQLite database path for stored analyses
    pub db_path: String,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Directory for rolling JSON log files; console only when unset
    pub log_dir: Option<String>,

    pub vision_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub places_api_key: Option<String>,

    pub vision_base_url: String,
    pub gemini_base_url: String,
    pub places_base_url: String,

    pub label_selection: LabelSelection,
}

impl Default for EcoScanConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            db_path: DEFAULT_DB_PATH.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            vision_api_key: None,
            gemini_api_key: None,
            places_api_key: None,
            vision_base_url: DEFAULT_VISION_BASE_URL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            places_base_url: DEFAULT_PLACES_BASE_URL.to_string(),
            label_selection: LabelSelection::default(),
        }
    }
}

impl EcoScanConfig {
    /// `host:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
