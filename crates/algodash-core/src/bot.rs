//! Bot lifecycle types.

use serde::{Deserialize, Serialize};

/// Response of the bot status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BotStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default, alias = "testMode")]
    pub test_mode: bool,
}

/// The client's belief about whether the remote bot is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Stopped,
    /// Last call failed; the remote state is not known.
    #[default]
    Unknown,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Label shown on the start control.
    pub fn start_label(&self) -> &'static str {
        if self.is_running() {
            "Running"
        } else {
            "Start"
        }
    }

    /// Label shown on the stop control.
    pub fn stop_label(&self) -> &'static str {
        if self.is_running() {
            "Stop"
        } else {
            "Stopped"
        }
    }
}

impl From<bool> for RunState {
    fn from(running: bool) -> Self {
        if running {
            Self::Running
        } else {
            Self::Stopped
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Read-mostly run state projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BotRunState {
    pub run_state: RunState,
    pub test_mode: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserializes_both_spellings() {
        let a: BotStatus = serde_json::from_str(r#"{"running":true,"test_mode":true}"#).unwrap();
        let b: BotStatus = serde_json::from_str(r#"{"running":true,"testMode":true}"#).unwrap();
        assert_eq!(a, b);
        assert!(a.test_mode);
    }

    #[test]
    fn test_status_missing_fields_default_false() {
        let s: BotStatus = serde_json::from_str("{}").unwrap();
        assert!(!s.running);
        assert!(!s.test_mode);
    }

    #[test]
    fn test_run_state_labels() {
        assert_eq!(RunState::Running.start_label(), "Running");
        assert_eq!(RunState::Running.stop_label(), "Stop");
        assert_eq!(RunState::Unknown.start_label(), "Start");
        assert_eq!(RunState::Unknown.stop_label(), "Stopped");
        assert_eq!(RunState::from(false), RunState::Stopped);
        assert_eq!(RunState::Unknown.to_string(), "unknown");
    }
}
