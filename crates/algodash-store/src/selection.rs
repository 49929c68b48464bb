//! Selection façade over the state store.
//!
//! The rendered list is always sorted and duplicate-free. Tickers are stored
//! exactly as given; callers normalize case before adding.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::filter::SearchFilterEngine;
use crate::store::StateStore;

/// Add/remove/list operations on the selection set.
#[derive(Debug, Clone)]
pub struct SelectionManager {
    store: Arc<StateStore>,
}

impl SelectionManager {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self { store }
    }

    pub fn add(&self, sym: &str) -> bool {
        self.store.add_selected(sym)
    }

    pub fn remove(&self, sym: &str) -> bool {
        self.store.remove_selected(sym)
    }

    /// Selection sorted lexicographically.
    pub fn list(&self) -> Vec<String> {
        self.store.selected_sorted()
    }

    pub fn contains(&self, sym: &str) -> bool {
        self.store.is_selected(sym)
    }

    pub fn len(&self) -> usize {
        self.store.selection_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve free-form input to a universe entry and select it.
    ///
    /// The input is trimmed and upper-cased, then matched against the
    /// universe: exact match first, then the first entry with that prefix,
    /// then the first unselected entry containing the input. Input matching
    /// nothing selects nothing. On success the query is cleared and the
    /// chosen symbol returned.
    pub fn add_from_input(&self, input: &str) -> Option<String> {
        let wanted = input.trim().to_uppercase();
        if wanted.is_empty() {
            return None;
        }

        let symbols = self.store.symbols();
        let chosen = symbols
            .iter()
            .find(|s| **s == wanted)
            .or_else(|| symbols.iter().find(|s| s.starts_with(&wanted)))
            .cloned()
            .or_else(|| {
                let selected: BTreeSet<String> =
                    self.store.selected_sorted().into_iter().collect();
                SearchFilterEngine::filter(&symbols, &wanted, &selected)
                    .into_iter()
                    .next()
            })?;

        debug!(input, %chosen, "Resolved selection input");
        self.store.add_selected(&chosen);
        self.store.set_query("");
        Some(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(symbols: &[&str]) -> SelectionManager {
        let store = StateStore::shared();
        store.set_symbols(symbols.iter().copied());
        SelectionManager::new(store)
    }

    #[test]
    fn test_list_sorted_and_deduplicated() {
        let sel = manager_with(&[]);
        sel.add("MSFT");
        sel.add("AAPL");
        sel.add("MSFT");
        assert_eq!(sel.list(), vec!["AAPL", "MSFT"]);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_remove_reflected_immediately() {
        let sel = manager_with(&[]);
        sel.add("AAPL");
        sel.add("MSFT");
        assert!(sel.remove("AAPL"));
        assert_eq!(sel.list(), vec!["MSFT"]);
        assert!(!sel.contains("AAPL"));
    }

    #[test]
    fn test_add_does_not_normalize_case() {
        let sel = manager_with(&[]);
        sel.add("aapl");
        sel.add("AAPL");
        assert_eq!(sel.list(), vec!["AAPL", "aapl"]);
    }

    #[test]
    fn test_add_from_input_exact_match() {
        let sel = manager_with(&["AAPLX", "AAPL"]);
        assert_eq!(sel.add_from_input(" aapl "), Some("AAPL".to_string()));
        assert!(sel.contains("AAPL"));
    }

    #[test]
    fn test_add_from_input_prefix_match() {
        let sel = manager_with(&["MSFT", "GOOGL", "GOOG"]);
        assert_eq!(sel.add_from_input("goo"), Some("GOOGL".to_string()));
    }

    #[test]
    fn test_add_from_input_falls_back_to_substring() {
        let store = StateStore::shared();
        store.set_symbols(["INFY", "HDFCBANK", "ICICIBANK"]);
        store.set_query("infy");
        let sel = SelectionManager::new(store.clone());

        assert_eq!(sel.add_from_input("bank"), Some("HDFCBANK".to_string()));
        assert_eq!(store.query(), "");
        assert_eq!(sel.add_from_input("bank"), Some("ICICIBANK".to_string()));
    }

    #[test]
    fn test_add_from_input_no_match_selects_nothing() {
        let store = StateStore::shared();
        store.set_symbols(["AAPL", "MSFT"]);
        store.set_query("ms");
        let sel = SelectionManager::new(store.clone());

        assert_eq!(sel.add_from_input("zzz"), None);
        assert!(sel.is_empty());
        assert_eq!(store.query(), "ms");
    }

    #[test]
    fn test_add_from_input_empty_or_no_universe() {
        let sel = manager_with(&[]);
        assert_eq!(sel.add_from_input("   "), None);
        assert_eq!(sel.add_from_input("AAPL"), None);
        assert!(sel.is_empty());
    }
}
