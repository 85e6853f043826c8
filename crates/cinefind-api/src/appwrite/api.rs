//! `DocumentStore` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{DocumentList, NewSearchCount, Query, SearchCountDocument, SearchCountPatch};

/// Search-count collection operations.
///
/// Abstracts the document store for mock substitution in tests.
/// Implement `DocumentStore` (the `Send` variant) to get both traits.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(DocumentStore: Send)]
pub trait LocalDocumentStore {
    /// Fetches a document by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist or the request fails.
    async fn get_document(&self, document_id: &str) -> Result<SearchCountDocument>;

    /// Partially updates an existing document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist or the request fails.
    async fn update_document(
        &self,
        document_id: &str,
        patch: &SearchCountPatch,
    ) -> Result<SearchCountDocument>;

    /// Creates a document with the given ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is taken or the request fails.
    async fn create_document(
        &self,
        document_id: &str,
        data: &NewSearchCount,
    ) -> Result<SearchCountDocument>;

    /// Lists documents matching the given queries.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn list_documents(&self, queries: &[Query]) -> Result<DocumentList>;
}
