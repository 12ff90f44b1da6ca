//! Error types for dddk.

use thiserror::Error;

/// Errors that can occur while talking to Datadog or loading declared apps.
#[derive(Debug, Error)]
pub enum Error {
    /// Datadog answered with a non-2xx status.
    #[error("error calling datadog api: {body} (HTTP {status})")]
    Api { status: u16, body: String },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Monitor identifiers are numeric on the Datadog side.
    #[error("invalid monitor id: {0}")]
    InvalidMonitorId(String),

    /// Declared content that cannot be turned into a resource.
    #[error("invalid manifest: {0}")]
    Manifest(String),
}

/// Result type for dddk operations.
pub type Result<T> = std::result::Result<T, Error>;
