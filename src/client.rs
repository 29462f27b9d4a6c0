//! HTTP client for the proposal archive search API

use crate::config::Config;
use crate::error::AppError;
use crate::http::client_with_timeout;
use crate::model::{Proposal, SearchRequest, SearchResponse};
use std::future::Future;
use tracing::{debug, warn};

pub const DEFAULT_SIMILAR_LIMIT: u32 = 5;
pub const MAX_SIMILAR_LIMIT: u32 = 20;

/// Anything that can answer searches. The session only talks to this trait.
pub trait SearchBackend: Send + Sync + 'static {
    /// Run a search; non-2xx and transport failures come back as `Err`
    fn search(&self, request: &SearchRequest) -> impl Future<Output = Result<SearchResponse, AppError>> + Send;

    /// Proposals similar to `proposal_id`
    fn similar(&self, proposal_id: &str, limit: u32) -> impl Future<Output = Result<Vec<Proposal>, AppError>> + Send;
}

/// reqwest-backed implementation of [`SearchBackend`]
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    config: Config,
}

impl SearchClient {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let http = client_with_timeout(config.timeout)?;
        Ok(Self { http, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: url::Url,
        params: &[(&str, String)],
    ) -> Result<T, AppError> {
        debug!("GET {} {:?}", url, params);

        let response = self.http.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Search backend returned {}", status);
            return Err(AppError::from_status(status));
        }

        let body = response.bytes().await?;
        let decoded = serde_json::from_slice(&body)?;
        Ok(decoded)
    }
}

impl SearchBackend for SearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, AppError> {
        let url = self.config.endpoint(&["search"])?;
        if !request.filters.is_empty() {
            debug!("Search filters: {:?}", request.filters);
        }

        let response: SearchResponse = self.get_json(url, &request.query_pairs()).await?;
        debug!(
            "Search '{}' ({}) returned {} of {} results",
            request.query,
            request.search_type,
            response.results.len(),
            response.total
        );
        Ok(response)
    }

    async fn similar(&self, proposal_id: &str, limit: u32) -> Result<Vec<Proposal>, AppError> {
        let proposal_id = proposal_id.trim();
        if proposal_id.is_empty() {
            return Err(AppError::InvalidInput("Proposal id cannot be empty".to_string()));
        }

        let url = self.config.endpoint(&["search", "similar", proposal_id])?;
        let limit = limit.clamp(1, MAX_SIMILAR_LIMIT);
        self.get_json(url, &[("limit", limit.to_string())]).await
    }
}
