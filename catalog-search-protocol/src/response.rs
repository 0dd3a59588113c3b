//! Search response types.

use serde::{Deserialize, Serialize};

/// Search response envelope.
///
/// Returned by the index for successful searches. An empty `hits` list means
/// the search ran and nothing matched; failures are reported as
/// [`SearchError`](crate::SearchError) instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Protocol version (echoed from request).
    pub protocol_version: String,

    /// Request ID (echoed from request if provided).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Total number of matching documents before pagination, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Search hits in descending score order.
    pub hits: Vec<SearchHit>,

    /// Non-fatal warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Time taken to execute the search in milliseconds.
    pub took_ms: u64,
}

/// A single search hit.
///
/// Only the work identifier and score are guaranteed; callers resolve the
/// identifier against the catalog themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Opaque identifier of the matched work.
    pub work_id: String,

    /// The relevance score (higher is more relevant).
    pub score: f64,
}

impl SearchResponse {
    /// Create a new search response.
    pub fn new(
        protocol_version: String,
        request_id: Option<String>,
        hits: Vec<SearchHit>,
        took_ms: u64,
    ) -> Self {
        Self {
            protocol_version,
            request_id,
            total: None,
            hits,
            warnings: Vec::new(),
            took_ms,
        }
    }

    /// Record the pre-pagination match count.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Add a warning to the response.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

impl SearchHit {
    /// Create a new search hit.
    pub fn new(work_id: impl Into<String>, score: f64) -> Self {
        Self {
            work_id: work_id.into(),
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serialization() {
        let response = SearchResponse::new(
            "1.0".to_string(),
            Some("test-123".to_string()),
            vec![SearchHit::new("17", 0.95), SearchHit::new("4", 0.87)],
            12,
        )
        .with_total(2);

        let json = serde_json::to_string_pretty(&response).unwrap();
        let parsed: SearchResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.protocol_version, "1.0");
        assert_eq!(parsed.total, Some(2));
        assert_eq!(parsed.hits.len(), 2);
        assert_eq!(parsed.hits[0].work_id, "17");
        assert_eq!(parsed.hits[0].score, 0.95);
        assert_eq!(parsed.took_ms, 12);
    }

    #[test]
    fn test_response_with_warnings() {
        let response = SearchResponse::new("1.0".to_string(), None, vec![], 5)
            .with_warning("limit clamped");

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("warnings"));
        assert!(!json.contains("request_id"));
        assert!(!json.contains("total"));

        let parsed: SearchResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.warnings, vec!["limit clamped".to_string()]);
    }
}
