//! Suggestion list derivation.
//!
//! Recomputed from scratch on every keystroke and selection change. There is
//! no incremental diffing and no ranking: results keep universe order.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;

use crate::store::{StateStore, Subscription};

/// Stateless filter over the symbol universe.
pub struct SearchFilterEngine;

impl SearchFilterEngine {
    /// Normalize a raw query: trimmed and lower-cased.
    pub fn normalize(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Universe entries containing the query (case-insensitive), in order.
    ///
    /// An empty query matches everything.
    pub fn matching(universe: &[String], query: &str) -> Vec<String> {
        let q = Self::normalize(query);
        if q.is_empty() {
            return universe.to_vec();
        }
        universe
            .iter()
            .filter(|s| s.to_lowercase().contains(&q))
            .cloned()
            .collect()
    }

    /// Suggestions: matching entries minus the current selection.
    pub fn filter(universe: &[String], query: &str, selection: &BTreeSet<String>) -> Vec<String> {
        let q = Self::normalize(query);
        universe
            .iter()
            .filter(|s| !selection.contains(s.as_str()))
            .filter(|s| q.is_empty() || s.to_lowercase().contains(&q))
            .cloned()
            .collect()
    }

    /// Display policy helper: first `limit` entries.
    pub fn cap_for_display(list: &[String], limit: usize) -> &[String] {
        &list[..list.len().min(limit)]
    }
}

/// Live suggestion list bound to a store.
///
/// Re-derives on every store event and publishes through a watch channel.
pub struct SuggestionFeed {
    rx: watch::Receiver<Vec<String>>,
    subscription: Subscription,
}

impl SuggestionFeed {
    /// Attach to `store`, seeded with its current suggestions.
    pub fn attach(store: &Arc<StateStore>) -> Self {
        let (tx, rx) = watch::channel(store.suggestions());
        // Weak handle: the store owns the callback, so a strong one would leak.
        let weak = Arc::downgrade(store);
        let subscription = store.subscribe(move |_event| {
            if let Some(store) = weak.upgrade() {
                tx.send_replace(store.suggestions());
            }
        });
        Self { rx, subscription }
    }

    /// Latest suggestion list.
    pub fn current(&self) -> Vec<String> {
        self.rx.borrow().clone()
    }

    /// Receiver for awaiting changes.
    pub fn receiver(&self) -> watch::Receiver<Vec<String>> {
        self.rx.clone()
    }

    /// Stop tracking the store.
    pub fn detach(self) {
        self.subscription.dispose();
    }
}
