use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use ecoscan_core::{DeviceAnalysis, DeviceStore, EcoScanError, Result, StoredDevice};

/// Process-local device store for tests and ephemeral runs.
#[derive(Default, Clone)]
pub struct InMemoryDeviceStore {
    entries: Arc<RwLock<HashMap<Uuid, StoredDevice>>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> EcoScanError {
    EcoScanError::persistence("device store lock poisoned")
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn insert(&self, analysis: &DeviceAnalysis) -> Result<Uuid> {
        let device = StoredDevice {
            id: Uuid::new_v4(),
            analysis: analysis.clone(),
            created_at: Utc::now(),
        };
        let id = device.id;
        self.entries.write().map_err(|_| poisoned())?.insert(id, device);
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredDevice>> {
        Ok(self.entries.read().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(|_| poisoned())?.len())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_analysis() -> DeviceAnalysis {
        serde_json::from_value(serde_json::json!({
            "device_info": {"name": "Laptop", "estimated_age": "5 years", "type": "Computer", "image_url": "https://x/l.jpg"},
            "eco_score": {"score": 55, "repairability": 60, "recyclability": 70, "toxicity": 45, "resale_value": 30, "environmental_impact": 50},
            "components": [{"name": "Chassis", "material": "Aluminium", "percentage": 35}],
            "toxic_components": [{"name": "Mercury", "risk_level": "High", "found_in": "Backlight"}],
            "recommendations": {"repair": true, "reuse": false, "recycle": true,
                "repair_notes": "Swap SSD.", "reuse_notes": "Too old.", "recycle_notes": "Certified e-waste center."},
            "disposal_guidelines": {"battery": "Separate.", "plastic": "Sort.", "general": "Recycler."},
            "ai_summary": "An aging laptop."
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryDeviceStore::new();
        let analysis = sample_analysis();

        let id = store.insert(&analysis).await.unwrap();
        let stored = store.get(id).await.unwrap().expect("stored device");
        assert_eq!(stored.id, id);
        assert_eq!(stored.analysis, analysis);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_each_insert_is_a_new_document() {
        let store = InMemoryDeviceStore::new();
        let analysis = sample_analysis();
        let a = store.insert(&analysis).await.unwrap();
        let b = store.insert(&analysis).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
