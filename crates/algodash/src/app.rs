//! Application wiring and command loop.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use algodash_api::{
    BotControlCoordinator, CallOutcome, ControlClient, DynControlApi, SaveOutcome, SettingsForm,
    SettingsPatch,
};
use algodash_core::StateSnapshot;
use algodash_store::{SearchFilterEngine, SelectionManager, StateStore, SuggestionFeed};
use algodash_telemetry::Metrics;
use algodash_ws::{CountdownTimer, PushRouter, SocketClient};

use crate::commands::{Command, HELP};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::theme::ThemePreference;
use crate::view;

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    store: Arc<StateStore>,
    selection: SelectionManager,
    suggestions: SuggestionFeed,
    api: DynControlApi,
    coordinator: BotControlCoordinator,
    settings: SettingsForm,
    theme: ThemePreference,
    countdown: CountdownTimer,
}

impl Application {
    /// Create the application with an HTTP control client.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let client =
            ControlClient::with_timeout(config.base_url.clone(), config.request_timeout())?;
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Create the application over any control API implementation.
    pub fn with_api(config: AppConfig, api: DynControlApi) -> Self {
        let store = StateStore::shared();
        let selection = SelectionManager::new(store.clone());
        let suggestions = SuggestionFeed::attach(&store);
        let coordinator = BotControlCoordinator::new(api.clone(), store.clone());
        let theme = ThemePreference::load(config.prefs_path.clone());
        info!(theme = %theme.current(), "Theme preference loaded");

        Self {
            config,
            store,
            selection,
            suggestions,
            api,
            coordinator,
            settings: SettingsForm::default(),
            theme,
            countdown: CountdownTimer::new(),
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn settings(&self) -> &SettingsForm {
        &self.settings
    }

    pub fn coordinator(&self) -> &BotControlCoordinator {
        &self.coordinator
    }

    pub fn countdown(&self) -> &CountdownTimer {
        &self.countdown
    }

    pub fn theme(&self) -> &ThemePreference {
        &self.theme
    }

    /// Load tickers, settings and bot status. Never fails.
    pub async fn startup(&mut self) {
        match self.api.fetch_tickers().await {
            Ok(symbols) => {
                info!(count = symbols.len(), "Tickers loaded");
                self.store.set_symbols(symbols);
            }
            Err(e) => {
                warn!(error = %e, "Failed to load tickers");
                self.store.set_symbols(std::iter::empty::<String>());
            }
        }

        self.settings = SettingsForm::load(self.api.as_ref()).await;
        self.refresh_status().await;
    }

    async fn refresh_status(&mut self) -> String {
        let outcome = self.coordinator.status().await;
        if outcome.call.is_success() {
            self.settings.test_mode = outcome.state.test_mode;
        }
        with_failure(view::render_bot(&outcome.state), &outcome.call)
    }

    fn render_suggestions(&self) -> String {
        let all = self.suggestions.current();
        let limit = self.config.suggestion_limit;
        let shown = SearchFilterEngine::cap_for_display(&all, limit);
        view::render_suggestions(shown, all.len(), limit)
    }

    fn render_selection(&self) -> String {
        view::render_list(&self.selection.list(), "No symbols selected")
    }

    async fn save_settings(&self, patch: &SettingsPatch) -> String {
        match self.settings.save(self.api.as_ref(), patch).await {
            CallOutcome::Succeeded => "Settings saved".to_string(),
            CallOutcome::Failed(e) => format!("Settings not saved: {e}"),
        }
    }

    /// Execute one command.
    pub async fn execute(&mut self, cmd: Command) -> AppResult<Reply> {
        let out = match cmd {
            Command::Empty => String::new(),
            Command::Search(query) => {
                self.store.set_query(&query);
                self.render_suggestions()
            }
            Command::Suggest => self.render_suggestions(),
            Command::Add(sym) => {
                self.selection.add(&sym.to_uppercase());
                self.render_selection()
            }
            Command::Pick(input) => match self.selection.add_from_input(&input) {
                Some(sym) => format!("Added {sym}"),
                None => format!("No match for '{input}'"),
            },
            Command::Remove(sym) => {
                self.selection.remove(&sym.to_uppercase());
                self.render_selection()
            }
            Command::List => self.render_selection(),
            Command::Save => match self.coordinator.save_selection().await {
                SaveOutcome::Saved => format!("Selection saved ({})", self.selection.len()),
                SaveOutcome::Failed(e) => format!("Save failed: {e}"),
                SaveOutcome::Busy => "Save already in progress".to_string(),
            },
            Command::Start => {
                let outcome = self.coordinator.start().await;
                let mut out = view::render_bot(&outcome.state);
                if let Some(CallOutcome::Failed(e)) = &outcome.pre_persist {
                    out.push_str(&format!("\n(selection not saved: {e})"));
                }
                with_failure(out, &outcome.call)
            }
            Command::Stop => {
                let outcome = self.coordinator.stop().await;
                with_failure(view::render_bot(&outcome.state), &outcome.call)
            }
            Command::Status => self.refresh_status().await,
            Command::ShowSettings => view::render_settings(&self.settings),
            Command::SaveSettings => self.save_settings(&SettingsPatch::default()).await,
            Command::SetCapital(value) => {
                self.settings.capital_input = value;
                view::render_settings(&self.settings)
            }
            Command::SetInterval(value) => {
                self.settings.interval_input = value;
                view::render_settings(&self.settings)
            }
            Command::SetPaper(on) => {
                self.settings.paper_trading = on;
                view::render_settings(&self.settings)
            }
            Command::SetTest(on) => {
                // The test-mode toggle writes through immediately.
                self.settings.test_mode = on;
                self.save_settings(&SettingsPatch::default()).await
            }
            Command::Theme => format!("Theme: {}", self.theme.toggle()?),
            Command::Countdown => format!("Next candle in {}", self.countdown.display()),
            Command::Metrics => Metrics::render()?,
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Output(out))
    }

    /// Run the command loop until `quit`, end of input or Ctrl-C.
    pub async fn run(mut self) -> AppResult<()> {
        let (snapshot_tx, mut snapshot_rx) = mpsc::channel::<StateSnapshot>(64);
        let socket = SocketClient::spawn(
            self.config.socket_config(),
            PushRouter::new(self.countdown.clone(), snapshot_tx),
        );
        info!(url = %socket.url(), "Push socket started");

        println!("{}", view::render_bot(&self.coordinator.state()));
        println!("Type 'help' for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                Some(snapshot) = snapshot_rx.recv() => {
                    println!("{}", view::render_snapshot(&snapshot));
                }

                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Input closed");
                        break;
                    };
                    let reply = match Command::parse(&line) {
                        Ok(cmd) => self.execute(cmd).await,
                        Err(e) => Err(e),
                    };
                    match reply {
                        Ok(Reply::Output(text)) if !text.is_empty() => println!("{text}"),
                        Ok(Reply::Output(_)) => {}
                        Ok(Reply::Quit) => break,
                        Err(e) => println!("{e}"),
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Shutting down");
        socket.shutdown();
        socket.stopped().await;
        self.suggestions.detach();

        Ok(())
    }
}

fn with_failure(mut out: String, call: &CallOutcome) -> String {
    if let CallOutcome::Failed(e) = call {
        out.push_str(&format!("\n({e})"));
    }
    out
}
