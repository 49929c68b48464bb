//! Plain-text rendering of panel state.

use std::fmt::Write;

use chrono::Local;

use algodash_api::SettingsForm;
use algodash_core::{BotRunState, SnapshotRow, StateSnapshot};

fn price(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn pnl(v: Option<f64>) -> String {
    match v {
        None => "-".to_string(),
        Some(v) if v >= 0.0 => format!("+{v:.2}"),
        Some(v) => format!("{v:.2}"),
    }
}

/// One table line: ticker, state, qty, entry, last, pnl %.
pub fn render_row(row: &SnapshotRow) -> String {
    format!(
        "{:<12} {:<10} {:>8} {:>10} {:>10} {:>8}",
        row.ticker,
        row.state,
        row.qty,
        price(row.entry),
        price(row.last),
        pnl(row.pnl_pct)
    )
}

pub fn render_snapshot(snapshot: &StateSnapshot) -> String {
    let ts = snapshot
        .ts
        .to_datetime()
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut out = format!("Last update: {ts}\n");
    let _ = writeln!(
        out,
        "{:<12} {:<10} {:>8} {:>10} {:>10} {:>8}",
        "TICKER", "STATE", "QTY", "ENTRY", "LAST", "PNL%"
    );
    for row in &snapshot.rows {
        let _ = writeln!(out, "{}", render_row(row));
    }
    out
}

/// Bulleted list, or a placeholder when empty.
pub fn render_list(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items
        .iter()
        .map(|s| format!("  • {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Suggestion list capped at `limit` entries.
pub fn render_suggestions(items: &[String], total: usize, limit: usize) -> String {
    let mut out = render_list(items, "No matches");
    if total > limit {
        let _ = write!(out, "\n  … {} more", total - limit);
    }
    out
}

pub fn render_bot(state: &BotRunState) -> String {
    format!(
        "[{}] [{}]  state={}  test_mode={}",
        state.run_state.start_label(),
        state.run_state.stop_label(),
        state.run_state,
        if state.test_mode { "on" } else { "off" }
    )
}

pub fn render_settings(form: &SettingsForm) -> String {
    let or_blank = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    format!(
        "test_mode={}  capital_per_trade={}  interval_minutes={}  paper_trading={}",
        form.test_mode,
        or_blank(&form.capital_input),
        or_blank(&form.interval_input),
        form.paper_trading
    )
}
