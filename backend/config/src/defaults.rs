//! Config defaults applied when an environment variable is absent.

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Port the original web client talks to.
pub const DEFAULT_PORT: u16 = 5000;

pub const DEFAULT_DB_PATH: &str = "ecoscan.db";

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_VISION_BASE_URL: &str = "https://vision.googleapis.com";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com";
