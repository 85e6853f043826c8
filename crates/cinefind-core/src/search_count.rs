//! Best-effort search-count upsert.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use cinefind_api::appwrite::{DocumentStore, NewSearchCount, SearchCountPatch};
use cinefind_api::tmdb::TmdbMovie;
use tokio::task::JoinHandle;
use tracing::instrument;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Longest document ID the store accepts.
const MAX_DOCUMENT_ID_LEN: usize = 36;

/// Normalized search term used as the counter key.
///
/// NFKC, lowercase, whitespace runs collapsed to `-`. `"The  Batman"` and
/// `"the batman"` share the key `the-batman`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(clippy::module_name_repetitions)]
pub struct SearchKey(String);

impl SearchKey {
    /// Normalizes a raw term.
    #[must_use]
    pub fn new(term: &str) -> Self {
        let folded: String = term.nfkc().collect::<String>().to_lowercase();
        Self(folded.split_whitespace().collect::<Vec<_>>().join("-"))
    }

    /// Returns the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for a blank term.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Document ID for this key.
    ///
    /// The key itself when it is a valid store ID, otherwise a UUIDv5 of
    /// the key in simple (32 hex) form.
    #[must_use]
    pub fn document_id(&self) -> String {
        if is_valid_document_id(&self.0) {
            self.0.clone()
        } else {
            Uuid::new_v5(&Uuid::NAMESPACE_OID, self.0.as_bytes())
                .simple()
                .to_string()
        }
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// At most 36 chars of `[A-Za-z0-9._-]`, not starting with a special char.
fn is_valid_document_id(id: &str) -> bool {
    id.len() <= MAX_DOCUMENT_ID_LEN
        && id
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// What a `record_search` call did. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Existing record bumped to the given count.
    Incremented(u64),
    /// New record created with count 1.
    Created,
    /// Both the update and the create failed.
    Failed,
    /// Blank term; nothing written.
    Skipped,
}

/// Keeps per-term search counts in a document store.
#[derive(Debug)]
pub struct SearchCounter<S> {
    /// Backing store.
    store: Arc<S>,
}

impl<S> SearchCounter<S>
where
    S: DocumentStore + Sync + 'static,
{
    /// Creates a counter over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Increments the counter for `term`, creating it on first use.
    ///
    /// The update step reads the record and writes `count + 1`. Any failure
    /// there (missing record included) falls back to a single create with
    /// `count = 1` and the first movie's details. Errors are logged and
    /// never returned. Two concurrent first searches may both reach the
    /// create; the loser fails and is logged.
    #[instrument(skip_all, fields(term = %term))]
    pub async fn record_search(&self, term: &str, movie: &TmdbMovie) -> RecordOutcome {
        let key = SearchKey::new(term);
        if key.is_empty() {
            return RecordOutcome::Skipped;
        }
        let document_id = key.document_id();

        match self.increment(&document_id).await {
            Ok(count) => {
                tracing::debug!(key = %key, count, "search count incremented");
                return RecordOutcome::Incremented(count);
            }
            Err(e) => {
                tracing::debug!(
                    key = %key,
                    error = %format!("{e:#}"),
                    "increment failed; creating"
                );
            }
        }

        let data = NewSearchCount {
            search_term: String::from(term.trim()),
            count: 1,
            movie_id: movie.id,
            title: String::from(movie.display_title()),
            poster_url: movie.poster_url(),
            timestamp: now_rfc3339(),
        };
        match self.store.create_document(&document_id, &data).await {
            Ok(_) => {
                tracing::debug!(key = %key, "search count created");
                RecordOutcome::Created
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %format!("{e:#}"), "failed to record search");
                RecordOutcome::Failed
            }
        }
    }

    /// Runs `record_search` on a detached task.
    pub fn spawn_record(
        self: &Arc<Self>,
        term: String,
        movie: TmdbMovie,
    ) -> JoinHandle<RecordOutcome> {
        let counter = Arc::clone(self);
        tokio::spawn(async move { counter.record_search(&term, &movie).await })
    }

    async fn increment(&self, document_id: &str) -> Result<u64> {
        let current = self
            .store
            .get_document(document_id)
            .await
            .context("failed to read search count")?;
        let patch = SearchCountPatch {
            count: current.count.saturating_add(1),
            timestamp: now_rfc3339(),
        };
        let updated = self
            .store
            .update_document(document_id, &patch)
            .await
            .context("failed to update search count")?;
        Ok(updated.count)
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
