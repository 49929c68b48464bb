//! Client-side watch-list state for algodash.
//!
//! - `StateStore`: symbol universe, filter query and selection, with a typed
//!   synchronous subscription bus
//! - `SearchFilterEngine`: suggestion list derivation
//! - `SelectionManager`: sorted, deduplicated selection façade

pub mod filter;
pub mod selection;
pub mod store;

pub use filter::{SearchFilterEngine, SuggestionFeed};
pub use selection::SelectionManager;
pub use store::{StateStore, StoreEvent, Subscription};
