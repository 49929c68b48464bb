//! State snapshot pushed by the bot over the socket.
//!
//! Snapshots are replaced wholesale; rows are never merged across pushes.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Discriminator value carried by structured state pushes.
pub const STATE_MESSAGE_TYPE: &str = "state";

/// Snapshot timestamp.
///
/// The server may send epoch milliseconds (possibly fractional) or an
/// ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotTimestamp {
    /// Unix epoch milliseconds.
    Millis(f64),
    /// ISO-8601 / RFC 3339 text.
    Text(String),
}

impl SnapshotTimestamp {
    /// Resolve to a timestamp, if the value is well-formed.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Millis(ms) if ms.is_finite() => Utc
                .timestamp_millis_opt(ms.trunc() as i64)
                .single()
                .map(|dt| dt.fixed_offset()),
            Self::Millis(_) => None,
            Self::Text(s) => DateTime::parse_from_rfc3339(s).ok(),
        }
    }
}

impl Default for SnapshotTimestamp {
    fn default() -> Self {
        Self::Millis(0.0)
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One position row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ticker: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qty: f64,
    #[serde(default)]
    pub entry: Option<f64>,
    #[serde(default)]
    pub last: Option<f64>,
    #[serde(default, alias = "pnlPct")]
    pub pnl_pct: Option<f64>,
}

/// Point-in-time push of position/P&L rows for the current run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ts: SnapshotTimestamp,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<SnapshotRow>,
}

impl StateSnapshot {
    /// Decode a snapshot from an already-parsed JSON object.
    ///
    /// Returns `None` unless the object carries `"type": "state"`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let is_state = value
            .get("type")
            .and_then(|v| v.as_str())
            .is_some_and(|t| t == STATE_MESSAGE_TYPE);
        if !is_state {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
