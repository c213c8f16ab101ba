//! Nearby recycler endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};

use ecoscan_core::{Coordinate, EcoScanError};
use ecoscan_logging::{ApiEvent, EventLogger};

use crate::error::{ApiError, ApiResult};
use crate::server::GatewayState;

const ROUTE: &str = "/nearby_recyclers";

/// Read one coordinate field. Finite numbers and numeric strings are
/// accepted; absent or `null` yields `None`.
fn coordinate_field(body: &Value, field: &str) -> Result<Option<f64>, EcoScanError> {
    let not_a_number = || EcoScanError::validation(format!("{field} must be a number"));
    let value = match body.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    // "NaN" and "inf" parse as f64 but are not locations
    value.filter(|v| v.is_finite()).map(Some).ok_or_else(not_a_number)
}

pub fn coordinate_from_body(body: &Value) -> Result<Coordinate, EcoScanError> {
    let latitude = coordinate_field(body, "latitude")?;
    let longitude = coordinate_field(body, "longitude")?;
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Coordinate::new(latitude, longitude)),
        _ => Err(EcoScanError::validation("Missing latitude or longitude")),
    }
}

/// Handler for `POST /nearby_recyclers` (also mounted at `/api/nearby_recyclers`).
pub async fn nearby_recyclers(
    State(state): State<GatewayState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body.map_err(ApiError::from_json_rejection)?;
    let origin = coordinate_from_body(&body).map_err(|e| ApiError::from_domain(ROUTE, e))?;

    let recyclers = state
        .locator
        .nearby(origin)
        .await
        .map_err(|e| ApiError::from_domain(ROUTE, e))?;

    EventLogger::log_event(
        ROUTE,
        ApiEvent::Recyclers {
            count: recyclers.len(),
        },
    );
    Ok(Json(json!({ "recyclers": recyclers })))
}
