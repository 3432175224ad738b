//! Error types for the GLM launcher.

use thiserror::Error;

/// Result type alias for launcher operations.
pub type LauncherResult<T> = Result<T, LauncherError>;

/// Errors surfaced by the registry, cache, config loader, and cluster generator.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("artifact fetch failed: {0}")]
    Fetch(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
