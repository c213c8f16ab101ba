//! Device analysis endpoints.
//!
//! `POST /api/analyze` returns the labels with the model's raw text.
//! `POST /api/devices` returns, and stores, the validated structured analysis.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use ecoscan_core::{AnalysisOutcome, ImageReference, StoredDevice};
use ecoscan_logging::{ApiEvent, EventLogger};

use crate::error::{ApiError, ApiResult};
use crate::server::GatewayState;

const ANALYZE_ROUTE: &str = "/api/analyze";
const DEVICES_ROUTE: &str = "/api/devices";

const DEVICE_ADDED: &str = "Device added successfully";
const ANALYSIS_FAILED: &str = "Failed to analyze device";
const STORAGE_FAILED: &str = "Failed to store device analysis";

#[derive(Debug, Default, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Extract a non-blank `image_url`, mapping body problems to 400.
fn image_url_from(body: Result<Json<ImageRequest>, JsonRejection>) -> ApiResult<String> {
    let Json(request) = body.map_err(ApiError::from_json_rejection)?;
    request
        .image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing image_url"))
}

/// Handler for `POST /api/analyze`.
pub async fn analyze(
    State(state): State<GatewayState>,
    body: Result<Json<ImageRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisOutcome>> {
    let image_url = image_url_from(body)?;
    let image =
        ImageReference::parse(&image_url).map_err(|e| ApiError::from_domain(ANALYZE_ROUTE, e))?;

    let outcome = state
        .orchestrator
        .analyze(&image)
        .await
        .map_err(|e| ApiError::from_domain(ANALYZE_ROUTE, e))?;

    EventLogger::log_event(
        ANALYZE_ROUTE,
        ApiEvent::Analysis {
            labels: outcome.labels.as_slice().to_vec(),
        },
    );
    Ok(Json(outcome))
}

/// Handler for `POST /api/devices`.
///
/// A storage failure after a successful analysis is still a 500; the analysis
/// is not returned.
pub async fn add_device(
    State(state): State<GatewayState>,
    body: Result<Json<ImageRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let image_url = image_url_from(body).map_err(|e| e.with_message(ANALYSIS_FAILED))?;
    let image = ImageReference::parse(&image_url)
        .map_err(|e| ApiError::from_domain(DEVICES_ROUTE, e).with_message(ANALYSIS_FAILED))?;

    let analysis = state
        .orchestrator
        .analyze_device(&image, &image_url)
        .await
        .map_err(|e| ApiError::from_domain(DEVICES_ROUTE, e).with_message(ANALYSIS_FAILED))?;

    let id = state
        .store
        .insert(&analysis)
        .await
        .map_err(|e| ApiError::from_domain(DEVICES_ROUTE, e).with_message(STORAGE_FAILED))?;

    info!(device_id = %id, device = %analysis.device_info.name, "Device analysis stored");
    EventLogger::log_event(
        DEVICES_ROUTE,
        ApiEvent::DeviceStored {
            device_id: id.to_string(),
            device_name: analysis.device_info.name.clone(),
        },
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": DEVICE_ADDED,
            "id": id,
            "highlights": analysis.highlights(),
            "analysis": analysis,
        })),
    ))
}

/// Handler for `GET /api/devices/:id`.
pub async fn get_device(
    State(state): State<GatewayState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<StoredDevice>> {
    let Path(id) = id.map_err(|e| ApiError::bad_request(e.body_text()))?;
    state
        .store
        .get(id)
        .await
        .map_err(|e| ApiError::from_domain(DEVICES_ROUTE, e))?
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("Device {id} not found")))
}
