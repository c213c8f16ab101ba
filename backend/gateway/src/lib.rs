//! EcoScan Gateway HTTP API Server
//!
//! Routes client requests to the analysis pipeline, the recycler locator and
//! the device store.

pub mod analyze_api;
pub mod error;
pub mod health_api;
pub mod recycler_api;
pub mod server;


pub use error::{ApiError, ApiResult};
pub use server::{GatewayState, MAX_BODY_BYTES, build_router, start_server};
