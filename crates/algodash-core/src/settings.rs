//! Remote bot settings.

use serde::{Deserialize, Serialize};

/// Settings as returned by the read endpoint. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, alias = "testMode")]
    pub test_mode: Option<bool>,
    #[serde(default, alias = "capitalPerTrade")]
    pub capital_per_trade: Option<f64>,
    #[serde(default, alias = "intervalMinutes")]
    pub interval_minutes: Option<f64>,
    #[serde(default, alias = "paperTrading")]
    pub paper_trading: Option<bool>,
}

/// Settings write payload.
///
/// Absent numeric fields are left out of the JSON body entirely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SettingsPayload {
    pub test_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_per_trade: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_minutes: Option<f64>,
    pub paper_trading: bool,
}
