//! UI-facing session state machine.
//!
//! `SearchSession` is plain data plus transitions; it performs no I/O.
//! The controller drives it from timer and fetch events, and a UI only
//! ever reads it.

use cinefind_api::tmdb::TmdbMovie;

use crate::catalog::FetchState;
use crate::trending::TrendingSearch;

/// Identifies one issued catalog request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Sequence number; later requests have larger values.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// How completions of superseded requests are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleResponsePolicy {
    /// Only the most recently issued request may update the fetch state.
    #[default]
    DiscardSuperseded,
    /// Every completion is applied; the last one to arrive wins.
    LastCompletion,
}

/// Query, debounced query, fetch state and trending list for one session.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct SearchSession {
    /// Text as typed, updated on every keystroke.
    query: String,
    /// Last value that survived the debounce window.
    debounced: Option<String>,
    /// Latest applied fetch state.
    fetch: FetchState,
    /// Trending list loaded at mount.
    trending: Vec<TrendingSearch>,
    /// Last ticket issued.
    issued: u64,
    /// Stale completion handling.
    policy: StaleResponsePolicy,
}

impl SearchSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new(policy: StaleResponsePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Text as typed.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replaces the typed text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Appends one typed character.
    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    /// Removes the last typed character.
    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    /// Clears the typed text.
    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Last debounced value, `None` before mount.
    #[must_use]
    pub fn debounced(&self) -> Option<&str> {
        self.debounced.as_deref()
    }

    /// Starts the initial load with the empty term.
    pub fn mount(&mut self) -> Ticket {
        self.debounced = Some(String::new());
        self.begin_load()
    }

    /// Records a debounced value.
    ///
    /// Returns a ticket for the load to issue, or `None` when the value is
    /// unchanged and no load is needed.
    pub fn settle(&mut self, term: &str) -> Option<Ticket> {
        if self.debounced.as_deref() == Some(term) {
            return None;
        }
        self.debounced = Some(String::from(term));
        Some(self.begin_load())
    }

    /// Applies a finished load.
    ///
    /// Returns `false` when the completion was discarded as superseded.
    pub fn apply(&mut self, ticket: Ticket, state: FetchState) -> bool {
        if self.policy == StaleResponsePolicy::DiscardSuperseded && ticket.0 != self.issued {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.issued,
                "discarding superseded response"
            );
            return false;
        }
        self.fetch = state;
        true
    }

    /// Replaces the trending list.
    pub fn set_trending(&mut self, trending: Vec<TrendingSearch>) {
        self.trending = trending;
    }

    /// Trending list.
    #[must_use]
    pub fn trending(&self) -> &[TrendingSearch] {
        &self.trending
    }

    /// Latest applied fetch state.
    #[must_use]
    pub const fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    /// Returns `true` while a load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    /// Movies to display.
    #[must_use]
    pub fn movies(&self) -> &[TmdbMovie] {
        self.fetch.movies()
    }

    /// User-facing error message, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.fetch.error_message()
    }

    fn begin_load(&mut self) -> Ticket {
        self.issued = self.issued.wrapping_add(1);
        self.fetch = FetchState::Loading;
        Ticket(self.issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NO_MOVIES_FOUND;
    use crate::testing::movie;

    #[test]
    fn test_new_session_is_idle() {
        let session = SearchSession::new(StaleResponsePolicy::default());
        assert_eq!(session.fetch_state(), &FetchState::Idle);
        assert_eq!(session.debounced(), None);
        assert!(session.movies().is_empty());
    }

    #[test]
    fn test_mount_starts_loading_with_empty_term() {
        // Arrange
        let mut session = SearchSession::default();

        // Act
        let ticket = session.mount();

        // Assert
        assert_eq!(ticket.value(), 1);
        assert_eq!(session.debounced(), Some(""));
        assert!(session.is_loading());
    }

    #[test]
    fn test_settle_same_value_is_ignored() {
        // Arrange
        let mut session = SearchSession::default();
        session.mount();

        // Act
        let same = session.settle("");
        let changed = session.settle("dune");
        let repeat = session.settle("dune");

        // Assert
        assert!(same.is_none());
        assert!(changed.is_some());
        assert!(repeat.is_none());
    }

    #[test]
    fn test_typing_does_not_touch_debounced_value() {
        // Arrange
        let mut session = SearchSession::default();
        session.mount();

        // Act
        for c in "heat".chars() {
            session.push_char(c);
        }
        session.pop_char();

        // Assert
        assert_eq!(session.query(), "hea");
        assert_eq!(session.debounced(), Some(""));
    }

    #[test]
    fn test_apply_latest_completion() {
        // Arrange
        let mut session = SearchSession::default();
        let ticket = session.mount();

        // Act
        let applied = session.apply(ticket, FetchState::Success(vec![movie(1, "Heat")]));

        // Assert
        assert!(applied);
        assert!(!session.is_loading());
        assert_eq!(session.movies().len(), 1);
    }

    #[test]
    fn test_discard_superseded_keeps_latest_result() {
        // Arrange
        let mut session = SearchSession::new(StaleResponsePolicy::DiscardSuperseded);
        let first = session.mount();
        let second = session.settle("batman").unwrap_or(first);

        // Act
        let second_applied =
            session.apply(second, FetchState::Success(vec![movie(268, "Batman")]));
        let first_applied = session.apply(first, FetchState::Success(vec![movie(1, "Popular")]));

        // Assert
        assert!(second_applied);
        assert!(!first_applied);
        assert_eq!(session.movies()[0].id, 268);
    }

    #[test]
    fn test_discard_superseded_stays_loading_until_latest() {
        // Arrange
        let mut session = SearchSession::new(StaleResponsePolicy::DiscardSuperseded);
        let first = session.mount();
        session.settle("batman");

        // Act
        session.apply(first, FetchState::Success(vec![movie(1, "Popular")]));

        // Assert
        assert!(session.is_loading());
    }

    #[test]
    fn test_last_completion_wins() {
        // Arrange
        let mut session = SearchSession::new(StaleResponsePolicy::LastCompletion);
        let first = session.mount();
        let second = session.settle("zzzz").unwrap_or(first);

        // Act
        session.apply(second, FetchState::Failure(String::from(NO_MOVIES_FOUND)));
        let applied = session.apply(first, FetchState::Success(vec![movie(1, "Popular")]));

        // Assert
        assert!(applied);
        assert_eq!(session.movies()[0].id, 1);
        assert!(session.error_message().is_none());
    }

    #[test]
    fn test_failure_clears_movies() {
        // Arrange
        let mut session = SearchSession::default();
        let first = session.mount();
        session.apply(first, FetchState::Success(vec![movie(1, "Popular")]));
        let second = session.settle("zzzz").unwrap_or(first);

        // Act
        session.apply(second, FetchState::Failure(String::from(NO_MOVIES_FOUND)));

        // Assert
        assert!(session.movies().is_empty());
        assert_eq!(session.error_message(), Some(NO_MOVIES_FOUND));
    }
}
