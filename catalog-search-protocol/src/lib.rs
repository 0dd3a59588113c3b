//! Search Service Protocol types for the catalog search service.
//!
//! This crate defines the wire contract between the search gateway and the
//! full-text index that executes compiled searches. These types are used by:
//!
//! - The query compilers (expression trees)
//! - Search index backends (in-process and remote)
//! - Callers of the gateway (shared hit type)
//!
//! # Protocol Overview
//!
//! The protocol provides:
//!
//! - **Typed expression trees** for ranking ([`QueryExpression`]) and scoping
//!   ([`FilterExpression`]) instead of untyped nested maps
//! - **Unified request/response envelope** with pagination (`from`, `size`)
//! - **Structured errors** so callers can tell "no matches" from "search
//!   unavailable"
//!
//! # Example
//!
//! ```rust
//! use catalog_search_protocol::{
//!     fields, FilterExpression, QueryExpression, SearchRequest, WeightedField,
//! };
//!
//! let query = QueryExpression::multi_match(
//!     "moby dick",
//!     vec![WeightedField::boosted(fields::TITLE, 4.0), WeightedField::new(fields::SUMMARY)],
//! );
//! let filter = FilterExpression::terms_in(fields::LANGUAGE, ["eng"]);
//!
//! let request = SearchRequest::new("works", query)
//!     .with_filter(filter)
//!     .with_page(0, 10);
//! assert_eq!(request.size, 10);
//! ```

mod error;
mod filter;
mod query;
mod request;
mod response;

pub use error::{ErrorCode, ErrorDetail, SearchError};
pub use filter::FilterExpression;
pub use query::{QueryExpression, RangeDirection, TermValue, WeightedField};
pub use request::SearchRequest;
pub use response::{SearchHit, SearchResponse};

/// Protocol version string included in all requests and responses.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Default page size for search requests if not specified.
pub const DEFAULT_LIMIT: usize = 10;

/// Maximum allowed page size for search requests.
pub const MAX_LIMIT: usize = 1000;

/// Default timeout in milliseconds for search requests.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Field names of the denormalized work record as stored in the index.
pub mod fields {
    // Free-text fields
    pub const TITLE: &str = "title";
    pub const SUBTITLE: &str = "subtitle";
    pub const SERIES: &str = "series";
    pub const SUMMARY: &str = "summary";
    pub const AUTHOR: &str = "author";
    pub const PUBLISHER: &str = "publisher";

    // Keyword fields
    pub const MEDIUM: &str = "medium";
    pub const LANGUAGE: &str = "language";
    pub const FICTION: &str = "fiction";
    pub const AUDIENCE: &str = "audience";
    pub const GENRE_ID: &str = "genres.id";
    pub const GENRE_NAME: &str = "genres.name";

    // Numeric fields
    pub const TARGET_AGE_LOWER: &str = "target_age.lower";
    pub const TARGET_AGE_UPPER: &str = "target_age.upper";

    // License pool fields
    pub const SUPPRESSED: &str = "license_pools.suppressed";
    pub const OPEN_ACCESS: &str = "license_pools.open_access";
    pub const LICENSES_OWNED: &str = "license_pools.licenses_owned";
    pub const LICENSES_AVAILABLE: &str = "license_pools.licenses_available";
}
