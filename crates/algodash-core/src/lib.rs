//! Core types for the algodash control panel client.
//!
//! Shared by the store, socket and control API crates:
//! - `StateSnapshot` / `SnapshotRow`: server-pushed position and P&L rows
//! - `BotStatus` / `RunState`: remote bot lifecycle projection
//! - `Settings` / `SettingsPayload`: remote bot settings

pub mod bot;
pub mod settings;
pub mod snapshot;

pub use bot::{BotRunState, BotStatus, RunState};
pub use settings::{Settings, SettingsPayload};
pub use snapshot::{SnapshotRow, SnapshotTimestamp, StateSnapshot};
