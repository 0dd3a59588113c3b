//! Remote search index.
//!
//! [`RemoteSearchIndex`] implements [`SearchIndex`] by POSTing the
//! [`SearchRequest`] envelope as JSON to an index service and decoding a
//! [`SearchResponse`] or [`SearchError`] body.
//!
//! Transport failures, timeouts and server errors all surface as
//! [`ServiceError::IntegrationUnavailable`] so callers never mistake an
//! outage for an empty result set.

use async_trait::async_trait;
use catalog_search_protocol::{SearchError, SearchRequest, SearchResponse};
use reqwest::Client;
use std::fmt;
use std::time::Duration;

use super::SearchIndex;
use crate::config::SearchConfig;
use crate::error::{Result, ServiceError};

pub struct RemoteSearchIndex {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
    request_timeout: Duration,
}

impl RemoteSearchIndex {
    /// Create a remote index from configuration.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let endpoint = config.endpoint.as_ref().ok_or_else(|| ServiceError::Config {
            message: "remote search config missing 'endpoint'".to_string(),
        })?;

        let request_timeout = config.request_timeout();
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(request_timeout)
            .build()
            .map_err(|e| ServiceError::Config {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.clone(),
            auth_token: config.auth_token.clone(),
            request_timeout,
        })
    }

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            auth_token: None,
            request_timeout: Duration::from_millis(crate::config::DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for RemoteSearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSearchIndex")
            .field("endpoint", &self.endpoint)
            .field("has_auth_token", &self.auth_token.is_some())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[async_trait]
impl SearchIndex for RemoteSearchIndex {
    async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let timeout = request
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.request_timeout);

        let mut http_request = self.client.post(&self.endpoint).json(request);
        if let Some(ref token) = self.auth_token {
            http_request = http_request.bearer_auth(token);
        }

        let response = http_request.timeout(timeout).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("search request timeout: {e}")
            } else if e.is_connect() {
                format!("failed to connect to search service: {e}")
            } else {
                format!("search request failed: {e}")
            };
            tracing::warn!(endpoint = %self.endpoint, error = %e, "remote search failed");
            ServiceError::IntegrationUnavailable { message }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Structured protocol errors carry their own classification.
            if let Ok(search_error) = serde_json::from_str::<SearchError>(&body) {
                return Err(search_error.into());
            }
            if status.is_client_error() && status != reqwest::StatusCode::UNAUTHORIZED {
                return Err(ServiceError::invalid(format!(
                    "search service returned {status}: {body}"
                )));
            }
            return Err(ServiceError::unavailable(format!(
                "search service returned {status}: {body}"
            )));
        }

        response.json::<SearchResponse>().await.map_err(|e| {
            ServiceError::unavailable(format!("failed to parse search response: {e}"))
        })
    }
}
