use async_trait::async_trait;
use uuid::Uuid;

use crate::analysis::DeviceAnalysis;
use crate::error::Result;
use crate::types::{Coordinate, ImageReference, LabelSet, RecyclerEntry, StoredDevice};

/// Image-labeling service.
#[async_trait]
pub trait LabelClassifier: Send + Sync {
    /// Service name, used in logs and upstream errors (e.g., "vision").
    fn name(&self) -> &str;

    /// Return the detected labels, most confident first.
    async fn classify(&self, image: &ImageReference) -> Result<LabelSet>;
}

/// Generative model that turns a device description into an e-waste assessment.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    /// Return the model's raw text. The text is expected, but not guaranteed,
    /// to be JSON in the [`DeviceAnalysis`] shape.
    async fn analyze(&self, description: &str) -> Result<String>;
}

/// Places search for e-waste recyclers around a coordinate.
#[async_trait]
pub trait RecyclerLocator: Send + Sync {
    fn name(&self) -> &str;

    /// At most five recyclers, in the order the places service ranks them.
    async fn nearby(&self, origin: Coordinate) -> Result<Vec<RecyclerEntry>>;
}

/// Persistence for completed analyses.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Insert a new document and return its id.
    async fn insert(&self, analysis: &DeviceAnalysis) -> Result<Uuid>;

    async fn get(&self, id: Uuid) -> Result<Option<StoredDevice>>;

    async fn count(&self) -> Result<usize>;
}
