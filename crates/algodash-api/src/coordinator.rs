//! Bot lifecycle coordinator.
//!
//! Drives the remote start/stop/status endpoints and persists the selection.
//! Failures never propagate: every operation returns an outcome, and any
//! failed lifecycle call leaves the run state at `Unknown`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use algodash_core::{BotRunState, RunState};
use algodash_store::StateStore;

use crate::client::DynControlApi;
use crate::error::ApiResult;

/// Result of one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Succeeded,
    /// Failed; carries the error text.
    Failed(String),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl<T> From<&ApiResult<T>> for CallOutcome {
    fn from(result: &ApiResult<T>) -> Self {
        match result {
            Ok(_) => Self::Succeeded,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Outcome of `stop` and `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlOutcome {
    pub call: CallOutcome,
    pub state: BotRunState,
}

/// Outcome of `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    /// Selection persist before the start call; `None` when nothing was selected.
    pub pre_persist: Option<CallOutcome>,
    pub call: CallOutcome,
    pub state: BotRunState,
}

/// Outcome of `save_selection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed(String),
    /// A save was already in flight; no request was issued.
    Busy,
}

/// Clears the saving flag on every exit path.
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Coordinates bot lifecycle calls and tracks the resulting run state.
pub struct BotControlCoordinator {
    api: DynControlApi,
    store: Arc<StateStore>,
    state: RwLock<BotRunState>,
    saving: AtomicBool,
}

impl BotControlCoordinator {
    pub fn new(api: DynControlApi, store: Arc<StateStore>) -> Self {
        Self {
            api,
            store,
            state: RwLock::new(BotRunState::default()),
            saving: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> BotRunState {
        *self.state.read()
    }

    pub fn run_state(&self) -> RunState {
        self.state.read().run_state
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    fn set_run_state(&self, run_state: RunState) -> BotRunState {
        let mut state = self.state.write();
        state.run_state = run_state;
        *state
    }

    /// Persist a non-empty selection (best effort), then start the bot.
    pub async fn start(&self) -> StartOutcome {
        let chosen = self.store.selected_sorted();
        let pre_persist = if chosen.is_empty() {
            None
        } else {
            let result = self.api.save_selection(chosen).await;
            if let Err(e) = &result {
                debug!(error = %e, "Selection persist before start failed");
            }
            Some(CallOutcome::from(&result))
        };

        let result = self.api.start_bot().await;
        let run_state = match &result {
            Ok(()) => {
                info!("Bot started");
                RunState::Running
            }
            Err(e) => {
                warn!(error = %e, "Bot start failed");
                RunState::Unknown
            }
        };

        StartOutcome {
            pre_persist,
            call: CallOutcome::from(&result),
            state: self.set_run_state(run_state),
        }
    }

    pub async fn stop(&self) -> ControlOutcome {
        let result = self.api.stop_bot().await;
        let run_state = match &result {
            Ok(()) => {
                info!("Bot stopped");
                RunState::Stopped
            }
            Err(e) => {
                warn!(error = %e, "Bot stop failed");
                RunState::Unknown
            }
        };

        ControlOutcome {
            call: CallOutcome::from(&result),
            state: self.set_run_state(run_state),
        }
    }

    /// Refresh run state and test mode from the status endpoint.
    pub async fn status(&self) -> ControlOutcome {
        let result = self.api.bot_status().await;
        let state = match &result {
            Ok(status) => {
                debug!(running = status.running, test_mode = status.test_mode, "Bot status");
                let mut state = self.state.write();
                state.run_state = RunState::from(status.running);
                state.test_mode = status.test_mode;
                *state
            }
            Err(e) => {
                warn!(error = %e, "Bot status failed");
                self.set_run_state(RunState::Unknown)
            }
        };

        ControlOutcome {
            call: CallOutcome::from(&result),
            state,
        }
    }

    /// Persist the current selection.
    pub async fn save_selection(&self) -> SaveOutcome {
        if self
            .saving
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Save already in flight");
            return SaveOutcome::Busy;
        }
        let _guard = SavingGuard(&self.saving);

        let chosen = self.store.selected_sorted();
        let count = chosen.len();
        match self.api.save_selection(chosen).await {
            Ok(()) => {
                info!(count, "Selection saved");
                SaveOutcome::Saved
            }
            Err(e) => {
                warn!(error = %e, "Save failed");
                SaveOutcome::Failed(e.to_string())
            }
        }
    }
}
