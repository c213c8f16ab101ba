//! Main HTTP server and routing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use ecoscan_core::{AnalysisOrchestrator, DeviceStore, RecyclerLocator};

use crate::{analyze_api, health_api, recycler_api};

/// Request body cap. Base64 data-URL images inflate by a third, so this
/// admits images of roughly 7.5 MB.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across routes. Every field is immutable or
/// internally synchronized; handlers hold no cross-request state.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: AnalysisOrchestrator,
    pub locator: Arc<dyn RecyclerLocator>,
    pub store: Arc<dyn DeviceStore>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(
        orchestrator: AnalysisOrchestrator,
        locator: Arc<dyn RecyclerLocator>,
        store: Arc<dyn DeviceStore>,
    ) -> Self {
        Self {
            orchestrator,
            locator,
            store,
            started_at: Instant::now(),
        }
    }
}

/// Build the Axum router with all API routes.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_api::welcome))
        .route("/api/health", get(health_api::get_health))
        .route("/api/analyze", post(analyze_api::analyze))
        .route("/api/devices", post(analyze_api::add_device))
        .route("/api/devices/:id", get(analyze_api::get_device))
        .route("/nearby_recyclers", post(recycler_api::nearby_recyclers))
        // the web client posts here
        .route("/api/nearby_recyclers", post(recycler_api::nearby_recyclers))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Starts the HTTP server and serves until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("EcoScan HTTP API listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("EcoScan HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
