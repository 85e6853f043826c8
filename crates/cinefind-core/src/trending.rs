//! Most-searched terms.

use cinefind_api::appwrite::{DocumentStore, Query, SearchCountDocument};
use tracing::instrument;

/// How many trending entries are shown by default.
pub const DEFAULT_TRENDING_LIMIT: u32 = 5;

/// One trending entry, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingSearch {
    /// Normalized key (document ID).
    pub key: String,
    /// Term as it was typed.
    pub search_term: String,
    /// Title of the first hit; the term when the record has none.
    pub title: String,
    /// Poster of the first hit.
    pub poster_url: Option<String>,
    /// Catalog ID of the first hit.
    pub movie_id: Option<u64>,
    /// Times the term was searched.
    pub count: u64,
}

impl From<SearchCountDocument> for TrendingSearch {
    fn from(doc: SearchCountDocument) -> Self {
        let title = doc
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| doc.search_term.clone());
        Self {
            key: doc.id,
            search_term: doc.search_term,
            title,
            poster_url: doc.poster_url,
            movie_id: doc.movie_id,
            count: doc.count,
        }
    }
}

/// Loads the `limit` most-searched terms, highest count first.
///
/// Failures are logged and yield an empty list.
#[instrument(skip_all, fields(limit = limit))]
pub async fn get_trending<S>(store: &S, limit: u32) -> Vec<TrendingSearch>
where
    S: DocumentStore + Sync,
{
    let queries = [Query::order_desc("count"), Query::limit(limit)];
    match store.list_documents(&queries).await {
        Ok(list) => {
            tracing::debug!(total = list.total, "trending loaded");
            list.documents.into_iter().map(TrendingSearch::from).collect()
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "failed to load trending searches");
            Vec::new()
        }
    }
}
