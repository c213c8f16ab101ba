//! `ecoscan-config` — EcoScan runtime configuration.
//!
//! Provides:
//! - Typed config struct with defaults
//! - Environment variable loading (testable through a plain map)
//! - Credential redaction for startup logs
//! - Non-fatal validation report

pub mod defaults;
pub mod env;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::InvalidEnvVarError;
pub use redact::redact;
pub use schema::EcoScanConfig;
pub use validation::{validate, ConfigWarning, ValidationReport};
