//! Error types for Krisis operations

/// Result type for Krisis operations
pub type Result<T> = std::result::Result<T, KrisisError>;

/// Error types for the Krisis assessment engine
#[derive(Debug, thiserror::Error)]
pub enum KrisisError {
    /// Judge registry misuse
    #[error("Registry error: {0}")]
    Registry(#[from] crate::registry::RegistryError),

    /// Trace record is malformed or incomplete
    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    /// Evaluator model call failed
    #[error("Evaluator error: {0}")]
    Evaluator(String),

    /// Report store or review queue failed
    #[error("Sink error: {0}")]
    Sink(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for KrisisError {
    fn from(s: String) -> Self {
        KrisisError::Other(s)
    }
}

impl From<&str> for KrisisError {
    fn from(s: &str) -> Self {
        KrisisError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for KrisisError {
    fn from(err: anyhow::Error) -> Self {
        KrisisError::Other(err.to_string())
    }
}
