//! Error types for the device console

use crate::command::CommandError;

/// Errors that can occur in the device console
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data source error: {0}")]
    Source(String),

    #[error("Command delivery failed: {0}")]
    Command(String),

    #[error("Invalid command: {0}")]
    Validation(#[from] CommandError),

    #[error("Dashboard error: {0}")]
    Dashboard(String),
}

/// Result type alias for device console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;
