//! Error Types

use thiserror::Error;

/// Failures talking to the hosted tables
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("the map page was closed before the request was sent")]
    Disposed,
}

/// Missing or malformed backend credentials
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing configuration value {0}")]
    Missing(&'static str),
    #[error("backend url must start with http:// or https://, got {0:?}")]
    InvalidUrl(String),
}

/// Realtime socket and frame failures
#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("websocket error: {0}")]
    Socket(String),
    #[error("malformed frame: {0}")]
    Frame(#[from] serde_json::Error),
}

/// Map surface initialization failures
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Leaflet is not loaded")]
    LeafletMissing,
    #[error("map initialization failed: {0}")]
    Init(String),
}
