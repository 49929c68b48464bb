//! Control API access for algodash.
//!
//! - `client`: HTTP client for the bot's REST endpoints, behind the `ControlApi` trait
//! - `coordinator`: start/stop/status/save flows with explicit outcomes
//! - `settings`: settings form and write payload construction
//! - `mock`: in-memory `ControlApi` for tests

pub mod client;
pub mod coordinator;
pub mod error;
pub mod mock;
pub mod settings;

pub use client::{BoxFuture, ControlApi, ControlClient, DynControlApi, Endpoint};
pub use coordinator::{
    BotControlCoordinator, CallOutcome, ControlOutcome, SaveOutcome, StartOutcome,
};
pub use error::{ApiError, ApiResult};
pub use mock::{MockCall, MockControlApi};
pub use settings::{SettingsForm, SettingsPatch};
