//! Search Gateway
//!
//! Compiles text and facets, sends one request to the index, and returns
//! ranked hits. The gateway owns its index handle; there is no process-wide
//! client.

use catalog_search_protocol::{SearchHit, SearchRequest, DEFAULT_TIMEOUT_MS, MAX_LIMIT};
use catalog_search_query::{FacetDescriptor, SearchCompiler, SearchPolicy};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::backend::SearchIndex;
use crate::config::DEFAULT_INDEX_NAME;
use crate::error::{Result, ServiceError};

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Index every request is addressed to.
    pub index_name: String,
    /// Larger page sizes are clamped to this.
    pub max_limit: usize,
    /// Round-trip timeout used by [`SearchGateway::search`].
    pub default_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            max_limit: MAX_LIMIT,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug)]
pub struct SearchGateway<I: SearchIndex> {
    index: Arc<I>,
    compiler: SearchCompiler,
    config: GatewayConfig,
}

impl<I: SearchIndex> SearchGateway<I> {
    pub fn new(index: I, policy: &SearchPolicy, config: GatewayConfig) -> Self {
        Self::with_shared(Arc::new(index), policy, config)
    }

    /// Create a gateway over an index shared with other owners.
    pub fn with_shared(index: Arc<I>, policy: &SearchPolicy, config: GatewayConfig) -> Self {
        Self {
            index,
            compiler: SearchCompiler::new(policy),
            config,
        }
    }

    pub fn with_defaults(index: I) -> Self {
        Self::new(index, &SearchPolicy::default(), GatewayConfig::default())
    }

    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    pub fn compiler(&self) -> &SearchCompiler {
        &self.compiler
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Search with the configured default timeout.
    pub async fn search(
        &self,
        text: &str,
        facets: &FacetDescriptor,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let timeout = Duration::from_millis(self.config.default_timeout_ms);
        self.search_with_timeout(text, facets, offset, limit, timeout)
            .await
    }

    /// Search, aborting the index round-trip after `timeout`.
    ///
    /// Returns hits in descending score order. Index failures and timeouts
    /// are errors, never an empty list.
    pub async fn search_with_timeout(
        &self,
        text: &str,
        facets: &FacetDescriptor,
        offset: usize,
        limit: usize,
        timeout: Duration,
    ) -> Result<Vec<SearchHit>> {
        let limit = if limit > self.config.max_limit {
            tracing::warn!(
                requested = limit,
                max = self.config.max_limit,
                "limit clamped to max"
            );
            self.config.max_limit
        } else {
            limit
        };

        let span = tracing::debug_span!(
            "catalog_search",
            index = %self.config.index_name,
            offset,
            limit
        );
        self.run(text, facets, offset, limit, timeout)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        text: &str,
        facets: &FacetDescriptor,
        offset: usize,
        limit: usize,
        timeout: Duration,
    ) -> Result<Vec<SearchHit>> {
        if limit == 0 {
            tracing::debug!("zero limit, skipping index round-trip");
            return Ok(Vec::new());
        }

        let compiled = self.compiler.compile(text, facets);
        tracing::debug!(
            hints = compiled.extraction.hints.len(),
            fuzzy_suppressed = compiled.extraction.fuzzy_blacklisted,
            filtered = !compiled.filter.is_unrestricted(),
            "compiled search"
        );

        let request = SearchRequest::new(self.config.index_name.clone(), compiled.query)
            .with_filter(compiled.filter)
            .with_page(offset, limit)
            .with_timeout_ms(timeout.as_millis() as u64);

        let start = Instant::now();
        let response = match tokio::time::timeout(timeout, self.index.execute(&request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                if e.is_unavailable() {
                    tracing::warn!(error = %e, "search index unavailable");
                }
                return Err(e);
            }
            Err(_) => {
                let elapsed = start.elapsed();
                tracing::warn!(?elapsed, "search index timed out");
                return Err(ServiceError::Timeout { elapsed });
            }
        };

        let mut hits = response.hits;
        // Stable: equal scores keep the index's order.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            hits = hits.len(),
            total = response.total,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryIndex;
    use crate::document::WorkDocument;
    use async_trait::async_trait;
    use catalog_search_protocol::{SearchResponse, PROTOCOL_VERSION};
    use parking_lot::Mutex;

    /// Records requests and answers with fixed hits.
    #[derive(Debug, Default)]
    struct RecordingIndex {
        requests: Mutex<Vec<SearchRequest>>,
        hits: Vec<SearchHit>,
    }

    #[async_trait]
    impl SearchIndex for RecordingIndex {
        async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse> {
            self.requests.lock().push(request.clone());
            Ok(SearchResponse::new(
                PROTOCOL_VERSION.to_string(),
                None,
                self.hits.clone(),
                0,
            ))
        }
    }

    #[tokio::test]
    async fn test_request_envelope() {
        let gateway = SearchGateway::with_defaults(RecordingIndex::default());
        let facets = FacetDescriptor::builder()
            .languages(["eng"])
            .build()
            .unwrap();
        gateway.search("moby dick", &facets, 20, 10).await.unwrap();

        let requests = gateway.index().requests.lock();
        let request = &requests[0];
        assert_eq!(request.index, "works");
        assert_eq!(request.from, 20);
        assert_eq!(request.size, 10);
        assert_eq!(request.timeout_ms, Some(DEFAULT_TIMEOUT_MS));
        assert!(request.filter.is_some());
    }

    #[tokio::test]
    async fn test_unrestricted_filter_is_omitted() {
        let gateway = SearchGateway::with_defaults(RecordingIndex::default());
        gateway
            .search("moby", &FacetDescriptor::default(), 0, 10)
            .await
            .unwrap();
        assert!(gateway.index().requests.lock()[0].filter.is_none());
    }

    #[tokio::test]
    async fn test_limit_clamped() {
        let config = GatewayConfig {
            max_limit: 25,
            ..GatewayConfig::default()
        };
        let gateway =
            SearchGateway::new(RecordingIndex::default(), &SearchPolicy::default(), config);
        gateway
            .search("moby", &FacetDescriptor::default(), 0, 500)
            .await
            .unwrap();
        assert_eq!(gateway.index().requests.lock()[0].size, 25);
    }

    #[tokio::test]
    async fn test_zero_limit_skips_round_trip() {
        let gateway = SearchGateway::with_defaults(RecordingIndex::default());
        let hits = gateway
            .search("moby", &FacetDescriptor::default(), 0, 0)
            .await
            .unwrap();
        assert!(hits.is_empty());
        assert!(gateway.index().requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_hits_sorted_stably() {
        let index = RecordingIndex {
            hits: vec![
                SearchHit::new("b", 1.0),
                SearchHit::new("a", 2.0),
                SearchHit::new("c", 1.0),
            ],
            ..RecordingIndex::default()
        };
        let gateway = SearchGateway::with_defaults(index);
        let hits = gateway
            .search("x", &FacetDescriptor::default(), 0, 10)
            .await
            .unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.work_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_shared_memory_index() {
        let index = Arc::new(MemoryIndex::new("works"));
        let gateway = SearchGateway::with_shared(
            Arc::clone(&index),
            &SearchPolicy::default(),
            GatewayConfig::default(),
        );
        assert!(gateway
            .search("moby", &FacetDescriptor::default(), 0, 10)
            .await
            .unwrap()
            .is_empty());

        index.insert(WorkDocument::new("moby-dick", "Moby Dick"));
        let hits = gateway
            .search("moby", &FacetDescriptor::default(), 0, 10)
            .await
            .unwrap();
        assert_eq!(hits[0].work_id, "moby-dick");
    }
}
