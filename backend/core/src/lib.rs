//! `ecoscan-core` — data model, error taxonomy, service traits and the
//! device-analysis pipeline shared by every EcoScan crate.

pub mod analysis;
pub mod error;
pub mod geo;
pub mod orchestrator;
pub mod traits;
pub mod types;

pub use analysis::{
    Component, DeviceAnalysis, DeviceInfo, DisposalGuidelines, EcoScore, Highlight,
    Recommendations, RiskLevel, ToxicComponent,
};
pub use error::{EcoScanError, Result};
pub use geo::{format_distance_km, haversine_km, EARTH_RADIUS_KM};
pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome, ANALYSIS_ATTEMPTS};
pub use traits::{ContentAnalyzer, DeviceStore, LabelClassifier, RecyclerLocator};
pub use types::{
    Coordinate, ImageReference, LabelSelection, LabelSet, Rating, RecyclerEntry, StoredDevice,
};
