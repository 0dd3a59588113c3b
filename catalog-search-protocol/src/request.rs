//! Search request types.

use serde::{Deserialize, Serialize};

use crate::filter::FilterExpression;
use crate::query::QueryExpression;
use crate::DEFAULT_LIMIT;

/// Search request envelope.
///
/// Carries one compiled search to an index: the ranking expression, the
/// optional scoping filter, and the page to return.
///
/// # Semantics
///
/// - **`from`/`size`**: skip `from` hits of the ranked list, then return at most `size`.
/// - **`filter`**: `None` means unrestricted; the index must not treat it as "match nothing".
/// - **`timeout_ms`**: Maximum time the index may spend on the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Protocol version (must match server's supported version).
    pub protocol_version: String,

    /// Optional client-provided request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Name of the works index to search.
    pub index: String,

    /// Ranking expression.
    pub query: QueryExpression,

    /// Scoping expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterExpression>,

    /// Offset into the ranked hit list.
    #[serde(default)]
    pub from: usize,

    /// Maximum number of hits to return.
    #[serde(default = "default_limit")]
    pub size: usize,

    /// Timeout in milliseconds for the entire operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl SearchRequest {
    /// Create a request for the first page of `query` results, unfiltered.
    pub fn new(index: impl Into<String>, query: QueryExpression) -> Self {
        Self {
            protocol_version: crate::PROTOCOL_VERSION.to_string(),
            request_id: None,
            index: index.into(),
            query,
            filter: None,
            from: 0,
            size: DEFAULT_LIMIT,
            timeout_ms: None,
        }
    }

    /// Attach a filter. An unrestricted filter (empty `And`) is dropped.
    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = if filter.is_unrestricted() {
            None
        } else {
            Some(filter)
        };
        self
    }

    /// Set the page.
    pub fn with_page(mut self, from: usize, size: usize) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    /// Set the request ID.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Set the timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}
