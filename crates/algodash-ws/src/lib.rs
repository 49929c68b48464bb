//! Push socket client for the algodash control panel.
//!
//! Provides:
//! - Persistent connection with fixed-delay, unbounded reconnection
//! - Two-stage push decoding (countdown text and structured state snapshots)
//! - Candle countdown timer reseeded by server pushes

pub mod connection;
pub mod countdown;
pub mod error;
pub mod message;

pub use connection::{ConnectionState, PushRouter, SocketClient, SocketConfig};
pub use countdown::{format_mm_ss, CountdownTimer};
pub use error::{WsError, WsResult};
pub use message::{decode_push, CandleCountdown, DecodedPush};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any `wss://` or `https://` connection is made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
