//! Socket error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WsError {
    #[error("Connection closed: code={code}, reason={reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("Tungstenite error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),
}

impl WsError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ConnectionClosed { .. } => "server_close",
            Self::Tungstenite(_) => "transport_error",
        }
    }
}

pub type WsResult<T> = Result<T, WsError>;
