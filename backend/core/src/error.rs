use thiserror::Error;

/// Top-level error type for the EcoScan backend.
#[derive(Debug, Error)]
pub enum EcoScanError {
    /// A required credential or setting is absent.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required request field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// An external service answered with a failure or an unusable payload.
    #[error("{service} error: {message}")]
    Upstream { service: String, message: String },

    #[error("storage error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EcoScanError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Short machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Validation(_) => "validation",
            Self::Upstream { .. } => "upstream",
            Self::Persistence(_) => "persistence",
            Self::Other(_) => "internal",
        }
    }
}

pub type Result<T, E = EcoScanError> = std::result::Result<T, E>;
