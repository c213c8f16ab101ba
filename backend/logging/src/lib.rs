//! Telemetry and structured logging for EcoScan.
//!
//! Handles log redaction, console and rolling NDJSON output, and per-request
//! API event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ApiEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
