//! Mock catalog and store shared by the unit tests.
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, bail};
use cinefind_api::appwrite::{
    DocumentList, DocumentStore, NewSearchCount, Query, SearchCountDocument, SearchCountPatch,
};
use cinefind_api::tmdb::{
    DiscoverMovieParams, SearchMovieParams, TmdbApi, TmdbMovie, TmdbMoviePage,
};

use crate::catalog::CatalogQuery;

/// Builds a movie with just an ID and title.
pub fn movie(id: u64, title: &str) -> TmdbMovie {
    TmdbMovie {
        id,
        title: Some(String::from(title)),
        poster_path: Some(format!("/{id}.jpg")),
        ..TmdbMovie::default()
    }
}

/// Builds a page with the given results.
pub fn page(results: Option<Vec<TmdbMovie>>) -> TmdbMoviePage {
    TmdbMoviePage {
        page: Some(1),
        results,
        ..TmdbMoviePage::default()
    }
}

type Responder = dyn Fn(&CatalogQuery) -> (Duration, Result<TmdbMoviePage>) + Send + Sync;

/// Catalog mock that records every request.
pub struct MockCatalog {
    calls: Mutex<Vec<CatalogQuery>>,
    responder: Box<Responder>,
}

impl fmt::Debug for MockCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockCatalog")
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

impl MockCatalog {
    /// Responds to every request without delay.
    pub fn new(
        responder: impl Fn(&CatalogQuery) -> Result<TmdbMoviePage> + Send + Sync + 'static,
    ) -> Self {
        Self::with_delays(move |q| (Duration::ZERO, responder(q)))
    }

    /// Responds after a per-request delay.
    pub fn with_delays(
        responder: impl Fn(&CatalogQuery) -> (Duration, Result<TmdbMoviePage>)
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Echoes the search term back as a single movie; discover returns two.
    pub fn echo() -> Self {
        Self::new(|q| {
            Ok(match q {
                CatalogQuery::Discover => page(Some(vec![movie(1, "Popular"), movie(2, "Hot")])),
                CatalogQuery::Search(term) => page(Some(vec![movie(100, term)])),
            })
        })
    }

    /// Requests seen so far.
    pub fn calls(&self) -> Vec<CatalogQuery> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, query: CatalogQuery) -> Result<TmdbMoviePage> {
        self.calls.lock().unwrap().push(query.clone());
        let (delay, result) = (self.responder)(&query);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

impl TmdbApi for MockCatalog {
    async fn discover_movies(&self, _params: &DiscoverMovieParams) -> Result<TmdbMoviePage> {
        self.respond(CatalogQuery::Discover).await
    }

    async fn search_movie(&self, params: &SearchMovieParams) -> Result<TmdbMoviePage> {
        self.respond(CatalogQuery::Search(params.query.clone()))
            .await
    }
}

/// A store call as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String),
    Update(String, u64),
    Create(String),
    List(Vec<Query>),
}

/// In-memory store mock with switchable failures.
#[derive(Debug, Default)]
pub struct MockStore {
    docs: Mutex<BTreeMap<String, SearchCountDocument>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_update: bool,
    fail_create: bool,
    fail_list: bool,
}

impl MockStore {
    /// Makes every `update_document` call fail.
    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    /// Makes every `create_document` call fail.
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Makes every `list_documents` call fail.
    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Seeds a document with the given count.
    pub fn with_doc(self, id: &str, term: &str, count: u64) -> Self {
        self.docs.lock().unwrap().insert(
            String::from(id),
            SearchCountDocument {
                id: String::from(id),
                created_at: None,
                updated_at: None,
                search_term: String::from(term),
                count,
                movie_id: None,
                title: None,
                poster_url: None,
                timestamp: None,
            },
        );
        self
    }

    /// Calls seen so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Current document by ID.
    pub fn doc(&self, id: &str) -> Option<SearchCountDocument> {
        self.docs.lock().unwrap().get(id).cloned()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl DocumentStore for MockStore {
    async fn get_document(&self, document_id: &str) -> Result<SearchCountDocument> {
        self.record(StoreCall::Get(String::from(document_id)));
        match self.doc(document_id) {
            Some(doc) => Ok(doc),
            None => bail!("Appwrite API error (HTTP 404 Not Found): type=document_not_found"),
        }
    }

    async fn update_document(
        &self,
        document_id: &str,
        patch: &SearchCountPatch,
    ) -> Result<SearchCountDocument> {
        self.record(StoreCall::Update(String::from(document_id), patch.count));
        if self.fail_update {
            bail!("Appwrite API error (HTTP 500): type=general_unknown");
        }
        let mut docs = self.docs.lock().unwrap();
        let Some(doc) = docs.get_mut(document_id) else {
            bail!("Appwrite API error (HTTP 404 Not Found): type=document_not_found");
        };
        doc.count = patch.count;
        doc.timestamp = Some(patch.timestamp.clone());
        Ok(doc.clone())
    }

    async fn create_document(
        &self,
        document_id: &str,
        data: &NewSearchCount,
    ) -> Result<SearchCountDocument> {
        self.record(StoreCall::Create(String::from(document_id)));
        if self.fail_create {
            bail!("Appwrite API error (HTTP 409): type=document_already_exists");
        }
        let doc = SearchCountDocument {
            id: String::from(document_id),
            created_at: None,
            updated_at: None,
            search_term: data.search_term.clone(),
            count: data.count,
            movie_id: Some(data.movie_id),
            title: Some(data.title.clone()),
            poster_url: data.poster_url.clone(),
            timestamp: Some(data.timestamp.clone()),
        };
        self.docs
            .lock()
            .unwrap()
            .insert(String::from(document_id), doc.clone());
        Ok(doc)
    }

    async fn list_documents(&self, queries: &[Query]) -> Result<DocumentList> {
        self.record(StoreCall::List(queries.to_vec()));
        if self.fail_list {
            bail!("request failed: GET /v1/databases/db/collections/col/documents");
        }
        let mut documents: Vec<SearchCountDocument> =
            self.docs.lock().unwrap().values().cloned().collect();
        documents.sort_by(|a, b| b.count.cmp(&a.count));
        for query in queries {
            if let Query::Limit(limit) = query {
                documents.truncate(usize::try_from(*limit).unwrap());
            }
        }
        Ok(DocumentList {
            total: u64::try_from(documents.len()).unwrap(),
            documents,
        })
    }
}
