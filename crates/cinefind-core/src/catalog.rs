//! Catalog fetch orchestration.

use std::sync::Arc;

use anyhow::Result;
use cinefind_api::appwrite::DocumentStore;
use cinefind_api::tmdb::{
    DiscoverMovieParams, SearchMovieParams, TmdbApi, TmdbMovie, TmdbMoviePage,
};
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::search_count::{RecordOutcome, SearchCounter};

/// Message shown when the catalog has nothing for the query.
pub const NO_MOVIES_FOUND: &str = "No movies found.";

/// Message shown when the catalog request fails.
pub const FETCH_FAILED: &str = "Something went wrong. Please try again later.";

/// Which catalog endpoint a term maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQuery {
    /// Popularity-sorted discovery.
    Discover,
    /// Title search for a non-blank term.
    Search(String),
}

impl CatalogQuery {
    /// Maps a raw term: blank terms discover, everything else searches
    /// the trimmed term.
    #[must_use]
    pub fn from_term(term: &str) -> Self {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            Self::Discover
        } else {
            Self::Search(String::from(trimmed))
        }
    }

    /// Returns `true` for a title search.
    #[must_use]
    pub const fn is_search(&self) -> bool {
        matches!(self, Self::Search(_))
    }
}

/// Result of the latest catalog fetch as shown to the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// At least one movie came back.
    Success(Vec<TmdbMovie>),
    /// No results or a failed request, with a user-facing message.
    Failure(String),
}

impl FetchState {
    /// Movies to display; empty unless the fetch succeeded.
    #[must_use]
    pub fn movies(&self) -> &[TmdbMovie] {
        match self {
            Self::Success(movies) => movies,
            _ => &[],
        }
    }

    /// User-facing error message, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }

    /// Returns `true` while a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Maps a catalog response to the state shown to the user.
///
/// A missing or empty result list is "no movies"; any error is logged
/// and reported with the generic failure message.
#[must_use]
pub fn map_page(result: Result<TmdbMoviePage>) -> FetchState {
    match result {
        Ok(page) => match page.results {
            Some(movies) if !movies.is_empty() => FetchState::Success(movies),
            _ => FetchState::Failure(String::from(NO_MOVIES_FOUND)),
        },
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "catalog request failed");
            FetchState::Failure(String::from(FETCH_FAILED))
        }
    }
}

/// Outcome of one `load_movies` call.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Endpoint the term mapped to.
    pub query: CatalogQuery,
    /// Terminal fetch state (`Success` or `Failure`).
    pub state: FetchState,
    /// Detached search-count task, when one was started.
    pub telemetry: Option<JoinHandle<RecordOutcome>>,
}

/// Fetches movies for a term and fires search-count telemetry.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SearchService<C, S> {
    /// Movie catalog.
    catalog: Arc<C>,
    /// Search counter; `None` disables telemetry.
    counter: Option<Arc<SearchCounter<S>>>,
    /// Language passed to the catalog.
    language: String,
}

impl<C, S> SearchService<C, S>
where
    C: TmdbApi + Sync + 'static,
    S: DocumentStore + Sync + 'static,
{
    /// Creates a service over a catalog and an optional document store.
    #[must_use]
    pub fn new(catalog: Arc<C>, store: Option<Arc<S>>) -> Self {
        Self {
            catalog,
            counter: store.map(|s| Arc::new(SearchCounter::new(s))),
            language: String::from("en-US"),
        }
    }

    /// Sets the catalog language (default `en-US`).
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Returns the document store, when telemetry is enabled.
    #[must_use]
    pub fn store(&self) -> Option<&Arc<S>> {
        self.counter.as_ref().map(|c| c.store())
    }

    /// Fetches movies for `term`.
    ///
    /// Blank terms hit discovery, anything else searches the trimmed term.
    /// Exactly one catalog request is made and never retried. On a search
    /// with at least one result, a search-count upsert for the first movie
    /// is spawned and not awaited; its failure never changes the returned
    /// state.
    #[instrument(skip_all, fields(term = %term))]
    pub async fn load_movies(&self, term: &str) -> LoadOutcome {
        let query = CatalogQuery::from_term(term);
        let result = match &query {
            CatalogQuery::Discover => {
                let params = DiscoverMovieParams::default().language(self.language.clone());
                self.catalog.discover_movies(&params).await
            }
            CatalogQuery::Search(q) => {
                let params = SearchMovieParams::new(q.clone()).language(self.language.clone());
                self.catalog.search_movie(&params).await
            }
        };
        let state = map_page(result);

        let telemetry = match (&query, &state, &self.counter) {
            (CatalogQuery::Search(q), FetchState::Success(movies), Some(counter)) => movies
                .first()
                .map(|first| counter.spawn_record(q.clone(), first.clone())),
            _ => None,
        };

        tracing::debug!(
            search = query.is_search(),
            movies = state.movies().len(),
            telemetry = telemetry.is_some(),
            "movies loaded"
        );

        LoadOutcome {
            query,
            state,
            telemetry,
        }
    }
}
