//! Control API error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Non-success status; carries the response body text.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
