//! Appwrite request/response types for the search-count collection.

use serde::{Deserialize, Serialize};

// --- Documents ---

/// A search-count document as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchCountDocument {
    /// Document ID (the normalized search key).
    #[serde(rename = "$id")]
    pub id: String,
    /// Creation time assigned by the store.
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<String>,
    /// Last update time assigned by the store.
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<String>,
    /// Search term as first typed.
    #[serde(rename = "searchTerm", default)]
    pub search_term: String,
    /// Number of recorded searches.
    #[serde(default)]
    pub count: u64,
    /// TMDB ID of the first hit.
    #[serde(default)]
    pub movie_id: Option<u64>,
    /// Title of the first hit.
    #[serde(default)]
    pub title: Option<String>,
    /// Poster URL of the first hit.
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Last recorded search (RFC 3339).
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Attributes for a newly created search-count document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSearchCount {
    /// Search term as typed.
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    /// Initial count (always 1).
    pub count: u64,
    /// TMDB ID of the first hit.
    pub movie_id: u64,
    /// Title of the first hit.
    pub title: String,
    /// Poster URL of the first hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    /// Creation time (RFC 3339).
    pub timestamp: String,
}

/// Attributes changed when an existing search is recorded again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCountPatch {
    /// New count.
    pub count: u64,
    /// Refresh time (RFC 3339).
    pub timestamp: String,
}

/// A page of documents from `list_documents`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentList {
    /// Total matching documents (ignores limit).
    #[serde(default)]
    pub total: u64,
    /// Documents on this page.
    #[serde(default)]
    pub documents: Vec<SearchCountDocument>,
}

// --- Queries ---

/// A list query modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Sort descending by attribute.
    OrderDesc(String),
    /// Maximum number of documents.
    Limit(u32),
}

impl Query {
    /// Sort descending by `attribute`.
    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Self::OrderDesc(attribute.into())
    }

    /// Limit the result count.
    #[must_use]
    pub const fn limit(limit: u32) -> Self {
        Self::Limit(limit)
    }

    /// Encodes the query in the JSON form accepted by `queries[]`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let value = match self {
            Self::OrderDesc(attribute) => {
                serde_json::json!({ "method": "orderDesc", "attribute": attribute })
            }
            Self::Limit(limit) => serde_json::json!({ "method": "limit", "values": [limit] }),
        };
        value.to_string()
    }
}

// --- Error Response ---

/// Appwrite error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteErrorResponse {
    /// Human-readable message.
    pub message: String,
    /// HTTP-like error code.
    #[serde(default)]
    pub code: u16,
    /// Machine-readable error type (e.g. `document_not_found`).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}
