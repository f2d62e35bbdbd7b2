//! REST API client for the PAD v2 HTTP endpoints.
//!
//! Wraps the read-only card, project and neural-network endpoints of the PAD
//! web service (`/api/v2/cards`, `/api/v2/projects`,
//! `/api/v2/neural-networks`) using [`reqwest`].

use std::time::Duration;

use pad_core::records::{CardRecord, NeuralNetworkRecord, ProjectRecord};
use pad_core::types::DbId;
use serde::de::DeserializeOwned;

/// Default page size for listing endpoints (`limit`).
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default upper bound on pages fetched by a single scan.
pub const DEFAULT_MAX_PAGES: u32 = 50;

const CARDS_PATH: &str = "/api/v2/cards";
const PROJECTS_PATH: &str = "/api/v2/projects";
const NEURAL_NETWORKS_PATH: &str = "/api/v2/neural-networks";

/// HTTP client for the PAD web service.
#[derive(Debug, Clone)]
pub struct PadApi {
    client: reqwest::Client,
    base_url: String,
    paging: Paging,
}

/// How listing endpoints are walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// `limit` sent with each page request.
    pub page_size: u32,
    /// Stop after this many pages even if the last one was full.
    pub max_pages: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Errors from the PAD REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum PadApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The PAD API returned a non-2xx status code.
    #[error("PAD API error ({status}) at {endpoint}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The configured paging cannot walk a listing.
    #[error("Invalid paging: {0}")]
    InvalidPaging(String),

    /// The response body was not the expected JSON shape.
    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<PadApiError> for pad_core::error::CoreError {
    fn from(err: PadApiError) -> Self {
        match err {
            PadApiError::InvalidPaging(_) => pad_core::error::CoreError::Internal(err.to_string()),
            other => pad_core::error::CoreError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl PadApi {
    /// Create a client for the PAD service at `base_url`
    /// (e.g. `https://pad.crc.nd.edu`). Every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PadApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            paging: Paging::default(),
        }
    }

    pub fn with_paging(mut self, paging: Paging) -> Self {
        self.paging = paging;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    /// `GET /api/v2/cards?skip=&limit=`
    pub async fn list_cards(&self, skip: u32, limit: u32) -> Result<Vec<CardRecord>, PadApiError> {
        self.list_page(CARDS_PATH, skip, limit).await
    }

    /// `GET /api/v2/cards/{id}`. Returns `None` on 404.
    pub async fn get_card(&self, id: DbId) -> Result<Option<CardRecord>, PadApiError> {
        self.get_optional(&format!("{CARDS_PATH}/{id}")).await
    }

    /// `GET /api/v2/projects?skip=&limit=`
    pub async fn list_projects(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<ProjectRecord>, PadApiError> {
        self.list_page(PROJECTS_PATH, skip, limit).await
    }

    /// `GET /api/v2/projects/{id}`. Returns `None` on 404.
    pub async fn get_project(&self, id: DbId) -> Result<Option<ProjectRecord>, PadApiError> {
        self.get_optional(&format!("{PROJECTS_PATH}/{id}")).await
    }

    /// `GET /api/v2/neural-networks?skip=&limit=`
    pub async fn list_neural_networks(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<NeuralNetworkRecord>, PadApiError> {
        self.list_page(NEURAL_NETWORKS_PATH, skip, limit).await
    }

    /// `GET /api/v2/neural-networks/{id}`. Returns `None` on 404.
    pub async fn get_neural_network(
        &self,
        id: DbId,
    ) -> Result<Option<NeuralNetworkRecord>, PadApiError> {
        self.get_optional(&format!("{NEURAL_NETWORKS_PATH}/{id}")).await
    }

    /// Every card on the service.
    pub async fn all_cards(&self) -> Result<Vec<CardRecord>, PadApiError> {
        self.list_all(CARDS_PATH).await
    }

    /// Every project on the service.
    pub async fn all_projects(&self) -> Result<Vec<ProjectRecord>, PadApiError> {
        self.list_all(PROJECTS_PATH).await
    }

    /// Every neural network on the service.
    pub async fn all_neural_networks(&self) -> Result<Vec<NeuralNetworkRecord>, PadApiError> {
        self.list_all(NEURAL_NETWORKS_PATH).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn list_page<T: DeserializeOwned>(
        &self,
        path: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<T>, PadApiError> {
        tracing::debug!(path, skip, limit, "Fetching PAD page");
        let response = self
            .client
            .get(self.url(path))
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await?;
        Self::parse_response(path, response).await
    }

    /// Walk a listing endpoint page by page until a short page arrives or the
    /// page budget is spent. An offset too large for `skip` also ends the scan.
    async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, PadApiError> {
        let Paging {
            page_size,
            max_pages,
        } = self.paging;
        if page_size == 0 {
            return Err(PadApiError::InvalidPaging(
                "page size must be at least 1".to_string(),
            ));
        }
        let mut items = Vec::new();

        for page in 0..max_pages {
            let Some(skip) = page.checked_mul(page_size) else {
                tracing::warn!(path, page, page_size, "Listing offset overflows, stopping scan");
                return Ok(items);
            };
            let batch: Vec<T> = self.list_page(path, skip, page_size).await?;
            let short = batch.len() < page_size as usize;
            items.extend(batch);
            if short {
                return Ok(items);
            }
        }

        tracing::warn!(
            path,
            max_pages,
            fetched = items.len(),
            "Page budget exhausted before the end of the listing"
        );
        Ok(items)
    }

    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, PadApiError> {
        tracing::debug!(path, "Fetching PAD record");
        let response = self.client.get(self.url(path)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse_response(path, response).await.map(Some)
    }

    /// Ensure the response has a success status code, then decode its body.
    ///
    /// The body is read as text first so that decode failures can name the
    /// endpoint that produced them.
    async fn parse_response<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, PadApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PadApiError::ApiError {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| PadApiError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }
}
