use thiserror::Error;

/// Error type for ArcGIS Hub operations.
///
/// - `RequestFailed` — network/transport errors (wraps `reqwest::Error`)
/// - `Api` — non-2xx status codes and platform error envelopes
/// - `MissingField` — an expected nested field or result is absent
/// - `NotFound` — a named lookup resolved to nothing
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Missing field in response: {path}")]
    MissingField { path: String },

    #[error("Not found: {message}")]
    NotFound { message: String },
}

pub type Result<T> = std::result::Result<T, HubError>;
