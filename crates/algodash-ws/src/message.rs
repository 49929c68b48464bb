//! Push message decoding.
//!
//! The server multiplexes two formats on one channel: plain-text progress
//! lines (one of which announces the next candle) and JSON state snapshots.
//! Both decoders run on every payload; neither failing is an error.

use once_cell::sync::Lazy;
use regex::Regex;

use algodash_core::StateSnapshot;

static RE_CANDLE_COUNTDOWN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Time to next\s+(\d+)-min candle:\s+(\d+)s").unwrap());

/// Parsed `Time to next <N>-min candle: <S>s` announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandleCountdown {
    pub interval_minutes: u32,
    pub seconds: u64,
}

/// Result of running both decoders over one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPush {
    pub countdown: Option<CandleCountdown>,
    pub snapshot: Option<StateSnapshot>,
}

impl DecodedPush {
    /// Neither decoder matched.
    pub fn is_unclassified(&self) -> bool {
        self.countdown.is_none() && self.snapshot.is_none()
    }
}

/// Decode one text payload.
pub fn decode_push(text: &str) -> DecodedPush {
    DecodedPush {
        countdown: parse_countdown(text),
        snapshot: parse_snapshot(text),
    }
}

/// Match the candle countdown announcement anywhere in the text.
pub fn parse_countdown(text: &str) -> Option<CandleCountdown> {
    let caps = RE_CANDLE_COUNTDOWN.captures(text)?;
    let seconds = caps.get(2)?.as_str().parse().ok()?;
    let interval_minutes = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some(CandleCountdown {
        interval_minutes,
        seconds,
    })
}

/// Parse the payload as a `"type": "state"` snapshot.
pub fn parse_snapshot(text: &str) -> Option<StateSnapshot> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    StateSnapshot::from_value(&value)
}
