//! Prometheus metrics for algodash.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means duplicate metric
//! names, which is a programming error caught on first access.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_int_counter, CounterVec,
    Encoder, Gauge, GaugeVec, IntCounter, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Socket connection state (1 = open).
pub static WS_CONNECTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("algodash_ws_connected", "Socket connection state (1=open)").unwrap()
});

/// Socket state machine current state.
/// Labels: state (connecting/open/closed)
pub static WS_STATE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "algodash_ws_state",
        "Socket state machine current state (1=active, 0=inactive)",
        &["state"]
    )
    .unwrap()
});

/// Reconnects scheduled after a close.
pub static WS_RECONNECT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "algodash_ws_reconnect_total",
        "Total socket reconnects scheduled",
        &["reason"]
    )
    .unwrap()
});

/// Classified push messages.
/// Labels: kind (countdown/snapshot/other)
pub static PUSH_MESSAGES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "algodash_push_messages_total",
        "Push messages by decoded kind",
        &["kind"]
    )
    .unwrap()
});

/// Countdown reseeds.
pub static COUNTDOWN_RESEED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "algodash_countdown_reseed_total",
        "Total countdown reseeds from server pushes"
    )
    .unwrap()
});

/// Control API calls.
/// Labels: endpoint, result (ok/error)
pub static API_CALLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "algodash_api_calls_total",
        "Control API calls by endpoint and result",
        &["endpoint", "result"]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Set socket state machine state.
    /// Only the active state is set to 1.
    pub fn ws_state_set(state: &str) {
        for s in &["connecting", "open", "closed"] {
            WS_STATE.with_label_values(&[s]).set(0.0);
        }
        WS_STATE.with_label_values(&[state]).set(1.0);
        WS_CONNECTED.set(if state == "open" { 1.0 } else { 0.0 });
    }

    pub fn ws_reconnect(reason: &str) {
        WS_RECONNECT_TOTAL.with_label_values(&[reason]).inc();
    }

    pub fn push_message(kind: &str) {
        PUSH_MESSAGES_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn countdown_reseed() {
        COUNTDOWN_RESEED_TOTAL.inc();
    }

    pub fn api_call(endpoint: &str, ok: bool) {
        let result = if ok { "ok" } else { "error" };
        API_CALLS_TOTAL.with_label_values(&[endpoint, result]).inc();
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let families = prometheus::gather();
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_state_single_active() {
        Metrics::ws_state_set("connecting");
        Metrics::ws_state_set("open");
        assert_eq!(WS_STATE.with_label_values(&["open"]).get(), 1.0);
        assert_eq!(WS_STATE.with_label_values(&["connecting"]).get(), 0.0);
        assert_eq!(WS_CONNECTED.get(), 1.0);
    }

    #[test]
    fn test_render_contains_counters() {
        Metrics::api_call("bot_start", false);
        Metrics::push_message("snapshot");
        let text = Metrics::render().unwrap();
        assert!(text.contains("algodash_api_calls_total"));
        assert!(text.contains("algodash_push_messages_total"));
    }
}
