//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Control API error: {0}")]
    Api(#[from] algodash_api::ApiError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] algodash_telemetry::TelemetryError),

    #[error("Preferences error: {0}")]
    Prefs(String),

    #[error("Invalid command: {0}")]
    Command(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
