//! Image labeling and generative analysis clients.

pub mod gemini;
pub mod prompt;
pub mod vision;

use serde::Deserialize;

use ecoscan_core::EcoScanError;

pub use gemini::GeminiAnalyzer;
pub use prompt::{ANALYSIS_SCHEMA, analysis_prompt};
pub use vision::{MAX_LABELS, VisionLabelClassifier};

/// `{"error": {"message": ...}}` as returned by Google APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Map a reqwest failure to an upstream error. The URL is dropped because it
/// carries the API key.
pub(crate) fn transport_error(service: &str, err: reqwest::Error) -> EcoScanError {
    EcoScanError::upstream(service, err.without_url().to_string())
}
