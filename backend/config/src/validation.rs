//! Startup checks that report which endpoints will fail with the current config.

use ecoscan_core::LabelSelection;

use crate::env::{GEMINI_API_KEY_VAR, PLACES_API_KEY_VAR, VISION_API_KEY_VAR};
use crate::schema::EcoScanConfig;

/// A single finding with the config field it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub warnings: Vec<ConfigWarning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigWarning {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config. Nothing here is fatal: a missing key only disables
/// the endpoints that need it.
pub fn validate(config: &EcoScanConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.vision_api_key.is_none() {
        report.warn(
            "vision_api_key",
            format!("{VISION_API_KEY_VAR} is not set; /api/analyze and /api/devices will fail"),
        );
    }
    if config.gemini_api_key.is_none() {
        report.warn(
            "gemini_api_key",
            format!("{GEMINI_API_KEY_VAR} is not set; /api/analyze and /api/devices will fail"),
        );
    }
    if config.places_api_key.is_none() {
        report.warn(
            "places_api_key",
            format!("{PLACES_API_KEY_VAR} is not set; /nearby_recyclers will fail"),
        );
    }
    if config.label_selection == LabelSelection::SecondHalf {
        report.warn(
            "label_selection",
            "second_half discards the most confident labels; use 'all' unless reproducing old results",
        );
    }
    report
}
