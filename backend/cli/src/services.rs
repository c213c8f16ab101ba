//! Wires the configured Google clients and the device store together.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use ecoscan_config::EcoScanConfig;
use ecoscan_core::{AnalysisOrchestrator, ImageReference, RecyclerLocator};
use ecoscan_gateway::GatewayState;
use ecoscan_places::PlacesRecyclerLocator;
use ecoscan_store::SqliteDeviceStore;
use ecoscan_understanding::{GeminiAnalyzer, VisionLabelClassifier};

pub fn orchestrator(config: &EcoScanConfig) -> AnalysisOrchestrator {
    let classifier = VisionLabelClassifier::new(config.vision_api_key.clone())
        .with_base_url(config.vision_base_url.clone())
        .with_selection(config.label_selection);
    let analyzer = GeminiAnalyzer::new(config.gemini_api_key.clone())
        .with_base_url(config.gemini_base_url.clone());
    AnalysisOrchestrator::new(Arc::new(classifier), Arc::new(analyzer))
}

pub fn locator(config: &EcoScanConfig) -> Arc<dyn RecyclerLocator> {
    Arc::new(
        PlacesRecyclerLocator::new(config.places_api_key.clone())
            .with_base_url(config.places_base_url.clone()),
    )
}

/// Full server state backed by the SQLite database at `config.db_path`.
pub fn gateway_state(config: &EcoScanConfig) -> Result<GatewayState> {
    let store = SqliteDeviceStore::open(&config.db_path)
        .with_context(|| format!("Failed to open device database {}", config.db_path))?;
    info!(db = %config.db_path, "Device store ready");
    Ok(GatewayState::new(
        orchestrator(config),
        locator(config),
        Arc::new(store),
    ))
}

/// Interpret a command-line image argument.
///
/// URLs and data URLs are parsed as the HTTP API would; anything else must be
/// a readable local file, sent inline.
pub fn image_from_arg(arg: &str) -> Result<ImageReference> {
    if let Ok(image) = ImageReference::parse(arg) {
        return Ok(image);
    }
    let path = Path::new(arg);
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image file {}", path.display()))?;
    Ok(ImageReference::Bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_passed_through() {
        let image = image_from_arg("https://example.com/laptop.jpg").unwrap();
        assert!(image.is_remote());
    }

    #[test]
    fn local_file_is_read_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phone.jpg");
        std::fs::write(&path, b"\xff\xd8jpeg").unwrap();

        let image = image_from_arg(path.to_str().unwrap()).unwrap();
        assert_eq!(image, ImageReference::Bytes(b"\xff\xd8jpeg".to_vec()));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = image_from_arg("/nonexistent/phone.jpg").unwrap_err();
        assert!(err.to_string().contains("Failed to read image file"));
    }

    #[test]
    fn state_opens_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = EcoScanConfig {
            db_path: dir.path().join("ecoscan.db").to_string_lossy().into_owned(),
            ..EcoScanConfig::default()
        };
        assert!(gateway_state(&config).is_ok());
    }
}
