//! algodash control panel.
//!
//! Wires the components into a line-oriented terminal client:
//! - Symbol universe, search and selection (store)
//! - Bot start/stop/status and selection persistence (control API)
//! - Live state snapshots and candle countdown (push socket)
//! - Settings form and theme preference

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod theme;
pub mod view;

pub use app::{Application, Reply};
pub use commands::Command;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use theme::{Theme, ThemePreference};
