//! Debounced movie search core for cinefind.
//!
//! Holds the state machine that keeps the typed query, the debounced
//! query, the fetch state and the trending list consistent while catalog
//! requests race against typing. I/O goes through the `cinefind-api`
//! traits so every piece can run against mocks.

/// Catalog fetch orchestration.
pub mod catalog;
/// Session driver wiring debounce, fetches and telemetry together.
pub mod controller;
/// Quiescence-window debouncer.
pub mod debounce;
/// Best-effort search-count upsert.
pub mod search_count;
/// UI-facing session state machine.
pub mod session;
/// Most-searched terms.
pub mod trending;

#[cfg(test)]
mod testing;

pub use catalog::{
    CatalogQuery, FETCH_FAILED, FetchState, LoadOutcome, NO_MOVIES_FOUND, SearchService,
};
pub use controller::{ControllerConfig, DEFAULT_DEBOUNCE, SearchController, StepEvent};
pub use debounce::Debouncer;
pub use search_count::{RecordOutcome, SearchCounter, SearchKey};
pub use session::{SearchSession, StaleResponsePolicy, Ticket};
pub use trending::{DEFAULT_TRENDING_LIMIT, TrendingSearch, get_trending};
