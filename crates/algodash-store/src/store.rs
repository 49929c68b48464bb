//! Watch-list state store.
//!
//! Single mutation point for the symbol universe, the filter query and the
//! selection set. Every mutator applies its change, releases the data lock,
//! then invokes subscribers synchronously in registration order before
//! returning.
//!
//! Mutating the store from inside a subscriber callback is not supported.
//! It will not deadlock, but the order in which subscribers observe the
//! nested events is unspecified.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::filter::SearchFilterEngine;

/// Change notification emitted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Universe replaced (query and filtered view were reset).
    SymbolsUpdated,
    /// Filter query changed.
    QueryChanged,
    /// Selection mutated.
    SelectionChanged,
    /// Store reset to empty.
    Reset,
}

type Callback = Arc<dyn Fn(StoreEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

#[derive(Debug, Default)]
struct StoreData {
    /// Universe in canonical (load) order.
    symbols: Vec<String>,
    /// Raw query as typed.
    query: String,
    /// Universe entries matching the query (selection not excluded).
    filtered: Vec<String>,
    selected: BTreeSet<String>,
}

/// Handle for a registered subscriber.
///
/// Dropping the handle does not unsubscribe; call [`Subscription::dispose`].
#[must_use = "keep the subscription to be able to dispose it"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove the subscriber.
    ///
    /// Returns `true` if it was still registered. Safe to call repeatedly.
    pub fn dispose(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = registry.lock();
        let before = registry.entries.len();
        registry.entries.retain(|(id, _)| *id != self.id);
        before != registry.entries.len()
    }

    /// Check whether the subscriber is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.lock().entries.iter().any(|(id, _)| *id == self.id))
    }
}

/// Watch-list state store.
#[derive(Default)]
pub struct StateStore {
    data: RwLock<StoreData>,
    subscribers: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("data", &*self.data.read())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store behind an `Arc` for sharing with consumers.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Replace the universe wholesale.
    ///
    /// Resets the query and the filtered view to the full universe.
    pub fn set_symbols<I, S>(&self, list: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let count = {
            let mut data = self.data.write();
            data.symbols = list.into_iter().map(Into::into).collect();
            data.query.clear();
            data.filtered = data.symbols.clone();
            data.symbols.len()
        };
        debug!(count, "Symbol universe replaced");
        self.notify(StoreEvent::SymbolsUpdated);
    }

    /// Set the filter query and recompute the filtered view.
    pub fn set_query(&self, query: &str) {
        {
            let mut data = self.data.write();
            data.query = query.to_string();
            data.filtered = SearchFilterEngine::matching(&data.symbols, query);
        }
        trace!(query, "Filter query changed");
        self.notify(StoreEvent::QueryChanged);
    }

    /// Add a ticker to the selection.
    ///
    /// Empty symbols are ignored without notification. Returns `true` if
    /// the ticker was not already selected.
    pub fn add_selected(&self, sym: &str) -> bool {
        if sym.is_empty() {
            return false;
        }
        let inserted = self.data.write().selected.insert(sym.to_string());
        debug!(sym, inserted, "Selection add");
        self.notify(StoreEvent::SelectionChanged);
        inserted
    }

    /// Remove a ticker (exact match). Returns `true` if it was selected.
    pub fn remove_selected(&self, sym: &str) -> bool {
        let removed = self.data.write().selected.remove(sym);
        debug!(sym, removed, "Selection remove");
        self.notify(StoreEvent::SelectionChanged);
        removed
    }

    /// Drop all state. Subscribers stay registered.
    pub fn reset(&self) {
        *self.data.write() = StoreData::default();
        debug!("State store reset");
        self.notify(StoreEvent::Reset);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn symbols(&self) -> Vec<String> {
        self.data.read().symbols.clone()
    }

    pub fn query(&self) -> String {
        self.data.read().query.clone()
    }

    pub fn filtered(&self) -> Vec<String> {
        self.data.read().filtered.clone()
    }

    /// Selection in lexicographic order.
    pub fn selected_sorted(&self) -> Vec<String> {
        let mut out: Vec<String> = self.data.read().selected.iter().cloned().collect();
        out.sort();
        out
    }

    pub fn is_selected(&self, sym: &str) -> bool {
        self.data.read().selected.contains(sym)
    }

    pub fn selection_len(&self) -> usize {
        self.data.read().selected.len()
    }

    /// Current suggestion list: universe ∩ query, minus selection.
    pub fn suggestions(&self) -> Vec<String> {
        let data = self.data.read();
        SearchFilterEngine::filter(&data.symbols, &data.query, &data.selected)
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Register a change callback.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(StoreEvent) + Send + Sync + 'static,
    {
        let mut registry = self.subscribers.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(callback)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().entries.len()
    }

    fn notify(&self, event: StoreEvent) {
        // Snapshot the list so callbacks run without the registry lock held.
        let callbacks: Vec<Callback> = self
            .subscribers
            .lock()
            .entries
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb(event);
        }
    }
}
