//! Liveness endpoints.

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};

use crate::server::GatewayState;

/// Handler for `GET /`.
pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to EcoScan API" }))
}

#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    /// `None` when the store cannot be read.
    pub stored_devices: Option<usize>,
}

/// Handler for `GET /api/health`.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        service: "ecoscan",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        stored_devices: state.store.count().await.ok(),
    })
}
