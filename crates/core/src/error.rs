// Central Error Type for the Bridge

use thiserror::Error;

/// Application-level error type
///
/// Never surfaces from `BridgeConnector::user_says`; used by configuration
/// loading and by the composition root.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invocation error: {0}")]
    Invocation(#[from] crate::port::InvocationError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
