use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{Chunk, ChunkContext, Paper, QueryRequest, QueryResponse};

/// The three remote operations the search session depends on.
#[async_trait]
pub trait SectionApi: Send + Sync {
    /// `POST /api/query`
    async fn submit_query(&self, request: &QueryRequest) -> ApiResult<QueryResponse>;

    /// `GET /api/papers`
    async fn list_papers(&self) -> ApiResult<Vec<Paper>>;

    /// `GET /api/chunks/{chunk_id}/context`
    async fn chunk_context(&self, chunk_id: &str) -> ApiResult<ChunkContext>;
}

/// HTTP client for the section search API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(config.base_url.clone()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn from_env() -> ApiResult<Self> {
        Self::new(&ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/papers/{paper_id}`
    pub async fn get_paper(&self, paper_id: &str) -> ApiResult<Paper> {
        let url = self.endpoint(&["api", "papers", paper_id])?;
        self.send(Method::GET, url, None).await
    }

    /// `GET /api/papers/{paper_id}/chunks`
    pub async fn paper_chunks(&self, paper_id: &str) -> ApiResult<Vec<Chunk>> {
        let url = self.endpoint(&["api", "papers", paper_id, "chunks"])?;
        self.send(Method::GET, url, None).await
    }

    /// `GET /api/chunks/{chunk_id}`
    pub async fn get_chunk(&self, chunk_id: &str) -> ApiResult<Chunk> {
        let url = self.endpoint(&["api", "chunks", chunk_id])?;
        self.send(Method::GET, url, None).await
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded on
    /// its own, so identifiers containing `/`, `?` or `#` stay one segment.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&QueryRequest>,
    ) -> ApiResult<T> {
        let path = url.path().to_string();
        debug!(%method, path = %path, "sending API request");

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, path = %path, error = %e, "API request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(%method, path = %path, status = status.as_u16(), "API returned error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| ApiError::Decode { path, source })
    }
}

#[async_trait]
impl SectionApi for ApiClient {
    async fn submit_query(&self, request: &QueryRequest) -> ApiResult<QueryResponse> {
        let url = self.endpoint(&["api", "query"])?;
        self.send(Method::POST, url, Some(request)).await
    }

    async fn list_papers(&self) -> ApiResult<Vec<Paper>> {
        let url = self.endpoint(&["api", "papers"])?;
        self.send(Method::GET, url, None).await
    }

    async fn chunk_context(&self, chunk_id: &str) -> ApiResult<ChunkContext> {
        let url = self.endpoint(&["api", "chunks", chunk_id, "context"])?;
        self.send(Method::GET, url, None).await
    }
}
