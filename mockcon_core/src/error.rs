//! Error types for the mockcon_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mockcon_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The console does not expose a method with this name
    #[error("Unknown console method: {0}")]
    UnknownMethod(String),

    /// The pretty-printer failed to render an argument
    #[error("Render error: {0}")]
    Render(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
