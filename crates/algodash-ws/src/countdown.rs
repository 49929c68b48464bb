//! Candle countdown timer.
//!
//! A local one-second clock reseeded by server pushes. At most one tick loop
//! runs at a time; a reseed replaces whatever was counting before it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use algodash_telemetry::Metrics;

const TICK: Duration = Duration::from_secs(1);

/// Format seconds as `MM:SS`.
pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

struct Inner {
    remaining: watch::Sender<u64>,
    /// Bumped on every reseed; a tick loop only decrements while its
    /// generation is current.
    generation: AtomicU64,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

/// Countdown clock handle. Clones share the same clock.
#[derive(Clone)]
pub struct CountdownTimer {
    inner: Arc<Inner>,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("remaining", &self.remaining())
            .field("ticking", &self.is_ticking())
            .finish()
    }
}

impl CountdownTimer {
    pub fn new() -> Self {
        let (remaining, _rx) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                remaining,
                generation: AtomicU64::new(0),
                ticker: Mutex::new(None),
            }),
        }
    }

    /// Restart the clock at `seconds` (negative values clamp to zero).
    ///
    /// Must be called from within a tokio runtime.
    pub fn reseed(&self, seconds: i64) {
        let secs = u64::try_from(seconds).unwrap_or(0);

        let mut ticker = self.inner.ticker.lock();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(old) = ticker.take() {
            old.abort();
        }
        self.inner.remaining.send_replace(secs);
        Metrics::countdown_reseed();
        debug!(secs, "Countdown reseeded");

        if secs == 0 {
            return;
        }

        let inner = self.inner.clone();
        let start = Instant::now() + TICK;
        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, TICK);
            loop {
                interval.tick().await;
                let mut done = false;
                inner.remaining.send_if_modified(|v| {
                    if inner.generation.load(Ordering::SeqCst) != generation || *v == 0 {
                        done = true;
                        return false;
                    }
                    *v -= 1;
                    done = *v == 0;
                    true
                });
                if done {
                    trace!("Countdown expired");
                    break;
                }
            }
        }));
    }

    /// Seconds left on the clock.
    pub fn remaining(&self) -> u64 {
        *self.inner.remaining.borrow()
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format_mm_ss(self.remaining())
    }

    /// Whether a tick loop is currently running.
    pub fn is_ticking(&self) -> bool {
        self.inner
            .ticker
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Subscribe to every change of the remaining seconds.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.remaining.subscribe()
    }
}
