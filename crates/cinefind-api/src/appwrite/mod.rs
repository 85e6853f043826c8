//! Appwrite document store client module.
//!
//! Talks to the Appwrite REST API (`/databases/{db}/collections/{col}/documents`)
//! for the single collection that holds search-count records.

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{DocumentStore, LocalDocumentStore};
#[allow(clippy::module_name_repetitions)]
pub use client::{AppwriteClient, AppwriteClientBuilder};
pub use types::{
    AppwriteErrorResponse, DocumentList, NewSearchCount, Query, SearchCountDocument,
    SearchCountPatch,
};
