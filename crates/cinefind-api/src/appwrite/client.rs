//! `AppwriteClient` - Appwrite document store client for one collection.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::api::DocumentStore;
use super::types::{
    AppwriteErrorResponse, DocumentList, NewSearchCount, Query, SearchCountDocument,
    SearchCountPatch,
};

/// Header carrying the project ID.
const PROJECT_HEADER: &str = "x-appwrite-project";

/// Header carrying the server API key.
const KEY_HEADER: &str = "x-appwrite-key";

/// Appwrite client bound to a single database collection.
///
/// Built once at startup and shared by reference; there is no global instance.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct AppwriteClient {
    /// HTTP client (project and key headers preset).
    http_client: Client,
    /// API endpoint, e.g. `https://cloud.appwrite.io/v1/`.
    endpoint: Url,
    /// Database ID.
    database_id: String,
    /// Collection ID.
    collection_id: String,
}

/// Builder for `AppwriteClient`.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct AppwriteClientBuilder {
    endpoint: Option<Url>,
    project_id: Option<String>,
    database_id: Option<String>,
    collection_id: Option<String>,
    api_key: Option<String>,
    user_agent: Option<String>,
}

impl AppwriteClientBuilder {
    /// Sets the API endpoint (required).
    #[must_use]
    pub fn endpoint(mut self, url: Url) -> Self {
        self.endpoint = Some(url);
        self
    }

    /// Sets the project ID (required).
    #[must_use]
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    /// Sets the database ID (required).
    #[must_use]
    pub fn database_id(mut self, id: impl Into<String>) -> Self {
        self.database_id = Some(id.into());
        self
    }

    /// Sets the collection ID (required).
    #[must_use]
    pub fn collection_id(mut self, id: impl Into<String>) -> Self {
        self.collection_id = Some(id.into());
        self
    }

    /// Sets a server API key (optional; collection permissions apply without it).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - A required field is not set.
    /// - The endpoint cannot be used as a base URL.
    /// - A header value is invalid or `reqwest::Client` build fails.
    pub fn build(self) -> Result<AppwriteClient> {
        let mut endpoint = self.endpoint.context("endpoint is required")?;
        let project_id = self.project_id.context("project_id is required")?;
        let database_id = self.database_id.context("database_id is required")?;
        let collection_id = self.collection_id.context("collection_id is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        if endpoint.cannot_be_a_base() {
            bail!("endpoint cannot be a base URL: {endpoint}");
        }
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(PROJECT_HEADER),
            HeaderValue::from_str(&project_id).context("invalid project_id header value")?,
        );
        if let Some(key) = self.api_key.filter(|k| !k.is_empty()) {
            let mut value = HeaderValue::from_str(&key).context("invalid api_key header value")?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(KEY_HEADER), value);
        }

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(AppwriteClient {
            http_client,
            endpoint,
            database_id,
            collection_id,
        })
    }
}

impl AppwriteClient {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> AppwriteClientBuilder {
        AppwriteClientBuilder::default()
    }

    /// URL of the collection's documents, optionally of one document.
    fn documents_url(&self, document_id: Option<&str>) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| anyhow!("endpoint cannot be a base URL"))?;
            segments.pop_if_empty().extend([
                "databases",
                self.database_id.as_str(),
                "collections",
                self.collection_id.as_str(),
                "documents",
            ]);
            if let Some(id) = document_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Sends a request and decodes the JSON response.
    #[instrument(skip_all)]
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let mut builder = self.http_client.request(method, url).query(query);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let request = builder.build().context("failed to build Appwrite request")?;
        let target = format!("{} {}", request.method(), request.url().path());

        tracing::debug!(url = %request.url(), method = %request.method(), "Appwrite API request");

        let result = self.http_client.execute(request).await;
        let response = result.with_context(|| format!("request failed: {target}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            if let Ok(error_response) = serde_json::from_str::<AppwriteErrorResponse>(&body) {
                bail!(
                    "Appwrite API error (HTTP {}): type={}, message={}",
                    status,
                    error_response.kind.as_deref().unwrap_or("-"),
                    error_response.message,
                );
            }
            bail!("Appwrite API error (HTTP {status}): {body}");
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {target}"))?;
        let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
        raw_result.with_context(|| format!("failed to decode JSON response: {target}"))
    }
}

impl DocumentStore for AppwriteClient {
    #[instrument(skip_all, fields(document_id = %document_id))]
    async fn get_document(&self, document_id: &str) -> Result<SearchCountDocument> {
        let url = self.documents_url(Some(document_id))?;
        self.send_json(Method::GET, url, &[], None).await
    }

    #[instrument(skip_all, fields(document_id = %document_id))]
    async fn update_document(
        &self,
        document_id: &str,
        patch: &SearchCountPatch,
    ) -> Result<SearchCountDocument> {
        let url = self.documents_url(Some(document_id))?;
        let body = serde_json::json!({ "data": patch });
        self.send_json(Method::PATCH, url, &[], Some(body)).await
    }

    #[instrument(skip_all, fields(document_id = %document_id))]
    async fn create_document(
        &self,
        document_id: &str,
        data: &NewSearchCount,
    ) -> Result<SearchCountDocument> {
        let url = self.documents_url(None)?;
        let body = serde_json::json!({ "documentId": document_id, "data": data });
        self.send_json(Method::POST, url, &[], Some(body)).await
    }

    #[instrument(skip_all)]
    async fn list_documents(&self, queries: &[Query]) -> Result<DocumentList> {
        let url = self.documents_url(None)?;
        let query: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_query_string()))
            .collect();
        self.send_json(Method::GET, url, &query, None).await
    }
}
