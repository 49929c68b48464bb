//! Push socket connection manager.
//!
//! Keeps one connection to the bot's push endpoint open for the life of the
//! client. Every close, whatever its cause, schedules a reconnect after a
//! fixed delay; there is no attempt limit. Only `shutdown` stops the loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use algodash_core::StateSnapshot;
use algodash_telemetry::Metrics;

use crate::countdown::CountdownTimer;
use crate::error::{WsError, WsResult};
use crate::message::decode_push;

/// Socket configuration.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Push endpoint URL (`ws://` or `wss://`).
    pub url: String,
    /// Fixed delay between a close and the next connect attempt.
    pub reconnect_delay_ms: u64,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000/ws".to_string(),
            reconnect_delay_ms: 2000,
        }
    }
}

impl SocketConfig {
    /// Derive the push endpoint from the HTTP base URL of the control API.
    ///
    /// `http` becomes `ws`, `https` becomes `wss`, and the path is `/ws`.
    pub fn from_base_url(base_url: &str, reconnect_delay_ms: u64) -> Self {
        let trimmed = base_url.trim_end_matches('/');
        let url = if let Some(rest) = trimmed.strip_prefix("https://") {
            format!("wss://{rest}/ws")
        } else if let Some(rest) = trimmed.strip_prefix("http://") {
            format!("ws://{rest}/ws")
        } else {
            format!("ws://{trimmed}/ws")
        };
        Self {
            url,
            reconnect_delay_ms,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes decoded pushes to the countdown clock and the snapshot consumer.
#[derive(Debug, Clone)]
pub struct PushRouter {
    countdown: CountdownTimer,
    snapshot_tx: mpsc::Sender<StateSnapshot>,
}

impl PushRouter {
    pub fn new(countdown: CountdownTimer, snapshot_tx: mpsc::Sender<StateSnapshot>) -> Self {
        Self {
            countdown,
            snapshot_tx,
        }
    }

    /// Run both decoders over `text` and dispatch whatever matched.
    pub async fn route(&self, text: &str) {
        let decoded = decode_push(text);

        if let Some(c) = decoded.countdown {
            Metrics::push_message("countdown");
            debug!(
                interval_minutes = c.interval_minutes,
                seconds = c.seconds,
                "Candle countdown push"
            );
            self.countdown
                .reseed(i64::try_from(c.seconds).unwrap_or(i64::MAX));
        }

        if let Some(snapshot) = decoded.snapshot {
            Metrics::push_message("snapshot");
            debug!(rows = snapshot.rows.len(), "State snapshot push");
            if self.snapshot_tx.send(snapshot).await.is_err() {
                warn!("Snapshot receiver dropped");
            }
        } else if decoded.countdown.is_none() {
            Metrics::push_message("other");
            debug!(text, "Unclassified push");
        }
    }
}

struct Shared {
    config: SocketConfig,
    state: RwLock<ConnectionState>,
    router: PushRouter,
    connect_attempts: AtomicU64,
    reconnects_scheduled: AtomicU64,
    close_requested: AtomicBool,
    close_signal: Notify,
    shutdown_token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Self-healing push socket.
///
/// Clones are handles to the same connection loop.
#[derive(Clone)]
pub struct SocketClient {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketClient")
            .field("url", &self.shared.config.url)
            .field("state", &self.state())
            .finish()
    }
}

impl SocketClient {
    /// Open the socket and keep it open until `shutdown`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: SocketConfig, router: PushRouter) -> Self {
        let shared = Arc::new(Shared {
            config,
            state: RwLock::new(ConnectionState::Closed),
            router,
            connect_attempts: AtomicU64::new(0),
            reconnects_scheduled: AtomicU64::new(0),
            close_requested: AtomicBool::new(false),
            close_signal: Notify::new(),
            shutdown_token: CancellationToken::new(),
            task: Mutex::new(None),
        });

        let handle = tokio::spawn(shared.clone().run());
        *shared.task.lock() = Some(handle);
        Self { shared }
    }

    pub fn url(&self) -> &str {
        &self.shared.config.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.read()
    }

    /// Number of connection attempts made so far.
    pub fn connect_attempts(&self) -> u64 {
        self.shared.connect_attempts.load(Ordering::SeqCst)
    }

    /// Number of reconnects scheduled after a close.
    pub fn reconnects_scheduled(&self) -> u64 {
        self.shared.reconnects_scheduled.load(Ordering::SeqCst)
    }

    /// Close the current connection.
    ///
    /// Treated like any other close: a reconnect is still scheduled. No-op
    /// while already closed.
    pub fn close(&self) {
        if self.state() == ConnectionState::Closed {
            debug!("Close requested while already closed");
            return;
        }
        info!("Socket close requested");
        self.shared.close_requested.store(true, Ordering::SeqCst);
        self.shared.close_signal.notify_one();
    }

    /// Stop the connection loop for good.
    pub fn shutdown(&self) {
        info!("SocketClient shutdown requested");
        self.shared.shutdown_token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown_token.is_cancelled()
    }

    /// Wait for the connection loop to exit after `shutdown`.
    pub async fn stopped(&self) {
        let handle = self.shared.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(?e, "Socket task ended abnormally");
            }
        }
    }
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
        Metrics::ws_state_set(state.as_str());
        debug!(%state, "Socket state changed");
    }

    async fn run(self: Arc<Self>) {
        let delay = Duration::from_millis(self.config.reconnect_delay_ms);

        loop {
            if self.shutdown_token.is_cancelled() {
                info!("Shutdown requested, exiting connect loop");
                self.set_state(ConnectionState::Closed);
                return;
            }

            self.close_requested.store(false, Ordering::SeqCst);
            self.connect_attempts.fetch_add(1, Ordering::SeqCst);
            self.set_state(ConnectionState::Connecting);

            let reason = match self.try_connect().await {
                Ok(()) => {
                    info!("Socket connection closed");
                    "closed"
                }
                Err(e) => {
                    warn!(error = %e, "Socket connection error");
                    e.reason()
                }
            };
            self.set_state(ConnectionState::Closed);

            if self.shutdown_token.is_cancelled() {
                info!("Shutdown requested after disconnect, not reconnecting");
                return;
            }

            self.reconnects_scheduled.fetch_add(1, Ordering::SeqCst);
            Metrics::ws_reconnect(reason);
            warn!(delay_ms = self.config.reconnect_delay_ms, "Reconnecting");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during reconnect delay, exiting");
                    return;
                }
            }
        }
    }

    /// Resolves once `close` has been requested for the current connection.
    async fn wait_close(&self) {
        loop {
            self.close_signal.notified().await;
            // A permit left over from an earlier connection is ignored.
            if self.close_requested.swap(false, Ordering::SeqCst) {
                return;
            }
        }
    }

    async fn try_connect(&self) -> WsResult<()> {
        info!(url = %self.config.url, "Connecting to push socket");

        let (ws_stream, _response) = tokio::select! {
            res = connect_async_tls_with_config(&self.config.url, None, true, None) => res?,
            () = self.wait_close() => {
                info!("Close requested during handshake");
                return Ok(());
            }
            () = self.shutdown_token.cancelled() => return Ok(()),
        };
        let (mut write, mut read) = ws_stream.split();

        self.set_state(ConnectionState::Open);
        info!("Push socket connected");

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in message loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(?e, "Failed to send Close frame during shutdown");
                    }
                    return Ok(());
                }

                () = self.wait_close() => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(?e, "Failed to send Close frame");
                    }
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.router.route(&text).await;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "Push socket closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            return Err(e.into());
                        }
                        None => {
                            warn!("Push socket stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_config_default() {
        let config = SocketConfig::default();
        assert_eq!(config.reconnect_delay_ms, 2000);
        assert!(config.url.ends_with("/ws"));
    }

    #[test]
    fn test_ws_url_from_base() {
        assert_eq!(
            SocketConfig::from_base_url("http://localhost:8000", 2000).url,
            "ws://localhost:8000/ws"
        );
        assert_eq!(
            SocketConfig::from_base_url("https://bot.example.com/", 2000).url,
            "wss://bot.example.com/ws"
        );
        assert_eq!(
            SocketConfig::from_base_url("127.0.0.1:9000", 2000).url,
            "ws://127.0.0.1:9000/ws"
        );
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Open.to_string(), "open");
        assert_eq!(ConnectionState::Connecting.as_str(), "connecting");
    }

    #[tokio::test]
    async fn test_router_dispatches_both_kinds() {
        let timer = CountdownTimer::new();
        let (tx, mut rx) = mpsc::channel(4);
        let router = PushRouter::new(timer.clone(), tx);

        router.route("Time to next 5-min candle: 42s").await;
        assert_eq!(timer.remaining(), 42);
        assert!(rx.try_recv().is_err());

        router
            .route(r#"{"type":"state","ts":1,"rows":[{"ticker":"AAPL","state":"FLAT"}]}"#)
            .await;
        let snap = rx.recv().await.unwrap();
        assert_eq!(snap.rows[0].ticker, "AAPL");
        assert_eq!(timer.remaining(), 42);
    }

    #[tokio::test]
    async fn test_router_ignores_unclassified() {
        let timer = CountdownTimer::new();
        let (tx, mut rx) = mpsc::channel(4);
        let router = PushRouter::new(timer.clone(), tx);

        router.route("Starting bot...").await;
        router.route(r#"{"type":"heartbeat"}"#).await;
        assert_eq!(timer.remaining(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_router_survives_dropped_receiver() {
        let timer = CountdownTimer::new();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let router = PushRouter::new(timer, tx);
        router.route(r#"{"type":"state","rows":[]}"#).await;
    }
}
