//! In-memory control API for tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use algodash_core::{BotStatus, Settings, SettingsPayload};

use crate::client::{BoxFuture, ControlApi, Endpoint};
use crate::error::{ApiError, ApiResult};

/// A call recorded by [`MockControlApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    FetchTickers,
    SaveSelection(Vec<String>),
    FetchSettings,
    PostSettings(SettingsPayload),
    BotStatus,
    StartBot,
    StopBot,
}

/// Mock control API.
///
/// Answers from canned data; endpoints marked failing return a 500 error.
#[derive(Debug, Default)]
pub struct MockControlApi {
    calls: Mutex<Vec<MockCall>>,
    failing: Mutex<HashSet<Endpoint>>,
    tickers: Mutex<Vec<String>>,
    settings: Mutex<Settings>,
    status: Mutex<BotStatus>,
    /// When set, `save_selection` waits for a notification before answering.
    save_gate: Mutex<Option<Arc<Notify>>>,
    /// Held status answers, consumed in call order.
    status_queue: Mutex<VecDeque<(BotStatus, Arc<Notify>)>>,
}

impl MockControlApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tickers<I, S>(&self, tickers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.tickers.lock() = tickers.into_iter().map(Into::into).collect();
    }

    pub fn set_settings(&self, settings: Settings) {
        *self.settings.lock() = settings;
    }

    pub fn set_status(&self, status: BotStatus) {
        *self.status.lock() = status;
    }

    /// Make `endpoint` fail (or succeed again).
    pub fn set_failing(&self, endpoint: Endpoint, failing: bool) {
        let mut set = self.failing.lock();
        if failing {
            set.insert(endpoint);
        } else {
            set.remove(&endpoint);
        }
    }

    /// Hold `save_selection` until the returned handle is notified.
    pub fn gate_saves(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.save_gate.lock() = Some(gate.clone());
        gate
    }

    /// Queue a status answer that is held until the returned handle is notified.
    ///
    /// Queued answers are handed out in call order; once drained, `bot_status`
    /// falls back to the canned status.
    pub fn queue_status(&self, status: BotStatus) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.status_queue.lock().push_back((status, gate.clone()));
        gate
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: MockCall, endpoint: Endpoint) -> ApiResult<()> {
        self.calls.lock().push(call);
        if self.failing.lock().contains(&endpoint) {
            return Err(ApiError::Status {
                status: 500,
                body: format!("{} unavailable", endpoint.as_str()),
            });
        }
        Ok(())
    }
}

impl ControlApi for MockControlApi {
    fn fetch_tickers(&self) -> BoxFuture<'_, ApiResult<Vec<String>>> {
        Box::pin(async move {
            self.record(MockCall::FetchTickers, Endpoint::Tickers)?;
            Ok(self.tickers.lock().clone())
        })
    }

    fn save_selection(&self, symbols: Vec<String>) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            let gate = self.save_gate.lock().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.record(MockCall::SaveSelection(symbols), Endpoint::Selection)
        })
    }

    fn fetch_settings(&self) -> BoxFuture<'_, ApiResult<Settings>> {
        Box::pin(async move {
            self.record(MockCall::FetchSettings, Endpoint::SettingsRead)?;
            Ok(self.settings.lock().clone())
        })
    }

    fn post_settings(&self, payload: SettingsPayload) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            self.record(MockCall::PostSettings(payload), Endpoint::SettingsWrite)
        })
    }

    fn bot_status(&self) -> BoxFuture<'_, ApiResult<BotStatus>> {
        Box::pin(async move {
            let queued = self.status_queue.lock().pop_front();
            self.record(MockCall::BotStatus, Endpoint::BotStatus)?;
            match queued {
                Some((status, gate)) => {
                    gate.notified().await;
                    Ok(status)
                }
                None => Ok(*self.status.lock()),
            }
        })
    }

    fn start_bot(&self) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move { self.record(MockCall::StartBot, Endpoint::BotStart) })
    }

    fn stop_bot(&self) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move { self.record(MockCall::StopBot, Endpoint::BotStop) })
    }
}
