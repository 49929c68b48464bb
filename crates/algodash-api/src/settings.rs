//! Settings form.
//!
//! Holds settings the way the operator edits them: toggles as booleans and
//! numeric fields as raw input text. Numbers are parsed only when a write
//! payload is built.

use tracing::{debug, warn};

use algodash_core::{Settings, SettingsPayload};

use crate::client::ControlApi;
use crate::coordinator::CallOutcome;

/// Parse a numeric input field.
///
/// Empty, zero, non-finite and unparsable inputs all yield `None`.
pub fn parse_amount(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v != 0.0)
}

/// Partial override applied on top of the form when building a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsPatch {
    pub test_mode: Option<bool>,
    pub capital_per_trade: Option<f64>,
    pub interval_minutes: Option<f64>,
    pub paper_trading: Option<bool>,
}

impl SettingsPatch {
    pub fn test_mode(on: bool) -> Self {
        Self {
            test_mode: Some(on),
            ..Self::default()
        }
    }

    pub fn paper_trading(on: bool) -> Self {
        Self {
            paper_trading: Some(on),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsForm {
    pub test_mode: bool,
    pub capital_input: String,
    pub interval_input: String,
    pub paper_trading: bool,
}

impl SettingsForm {
    /// Fill the form from settings read off the server. Absent values leave
    /// toggles off and inputs blank.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            test_mode: settings.test_mode.unwrap_or(false),
            capital_input: settings
                .capital_per_trade
                .map(|v| v.to_string())
                .unwrap_or_default(),
            interval_input: settings
                .interval_minutes
                .map(|v| v.to_string())
                .unwrap_or_default(),
            paper_trading: settings.paper_trading.unwrap_or(false),
        }
    }

    /// Build the write payload from the form merged with `patch`.
    pub fn payload(&self, patch: &SettingsPatch) -> SettingsPayload {
        SettingsPayload {
            test_mode: patch.test_mode.unwrap_or(self.test_mode),
            capital_per_trade: patch
                .capital_per_trade
                .or_else(|| parse_amount(&self.capital_input))
                .filter(|v| v.is_finite() && *v != 0.0),
            interval_minutes: patch
                .interval_minutes
                .or_else(|| parse_amount(&self.interval_input))
                .filter(|v| v.is_finite() && *v != 0.0),
            paper_trading: patch.paper_trading.unwrap_or(self.paper_trading),
        }
    }

    /// Read settings; any failure yields the default form.
    pub async fn load(api: &dyn ControlApi) -> Self {
        match api.fetch_settings().await {
            Ok(settings) => {
                debug!(?settings, "Settings loaded");
                Self::from_settings(&settings)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    /// Write the form merged with `patch`. Failure is reported, not raised.
    pub async fn save(&self, api: &dyn ControlApi, patch: &SettingsPatch) -> CallOutcome {
        let payload = self.payload(patch);
        let result = api.post_settings(payload).await;
        if let Err(e) = &result {
            warn!(error = %e, "Failed to save settings");
        }
        CallOutcome::from(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Endpoint;
    use crate::mock::{MockCall, MockControlApi};

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1500"), Some(1500.0));
        assert_eq!(parse_amount(" 2.5 "), Some(2.5));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn test_from_settings() {
        let form = SettingsForm::from_settings(&Settings {
            test_mode: Some(true),
            capital_per_trade: Some(1000.0),
            interval_minutes: None,
            paper_trading: None,
        });
        assert!(form.test_mode);
        assert_eq!(form.capital_input, "1000");
        assert_eq!(form.interval_input, "");
        assert!(!form.paper_trading);
    }

    #[test]
    fn test_payload_omits_zero_and_garbage() {
        let form = SettingsForm {
            test_mode: false,
            capital_input: "0".into(),
            interval_input: "five".into(),
            paper_trading: true,
        };
        let payload = form.payload(&SettingsPatch::default());
        assert_eq!(payload.capital_per_trade, None);
        assert_eq!(payload.interval_minutes, None);
        assert!(payload.paper_trading);
    }

    #[test]
    fn test_payload_patch_wins() {
        let form = SettingsForm {
            test_mode: false,
            capital_input: "100".into(),
            interval_input: "5".into(),
            paper_trading: false,
        };
        let patch = SettingsPatch {
            test_mode: Some(true),
            interval_minutes: Some(15.0),
            ..SettingsPatch::default()
        };
        let payload = form.payload(&patch);
        assert!(payload.test_mode);
        assert_eq!(payload.capital_per_trade, Some(100.0));
        assert_eq!(payload.interval_minutes, Some(15.0));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_default() {
        let api = MockControlApi::new();
        api.set_failing(Endpoint::SettingsRead, true);
        assert_eq!(SettingsForm::load(&api).await, SettingsForm::default());
    }

    #[tokio::test]
    async fn test_save_posts_payload_and_reports_failure() {
        let api = MockControlApi::new();
        let form = SettingsForm {
            capital_input: "250".into(),
            ..SettingsForm::default()
        };

        let outcome = form.save(&api, &SettingsPatch::paper_trading(true)).await;
        assert!(outcome.is_success());
        assert_eq!(
            api.calls(),
            vec![MockCall::PostSettings(SettingsPayload {
                test_mode: false,
                capital_per_trade: Some(250.0),
                interval_minutes: None,
                paper_trading: true,
            })]
        );

        api.set_failing(Endpoint::SettingsWrite, true);
        let outcome = form.save(&api, &SettingsPatch::default()).await;
        assert!(matches!(outcome, CallOutcome::Failed(_)));
    }
}
