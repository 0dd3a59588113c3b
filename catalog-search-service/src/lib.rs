//! Search gateway and index backends for the library catalog.
//!
//! This crate executes searches compiled by `catalog-search-query` against a
//! full-text index speaking the `catalog-search-protocol` wire contract.
//!
//! # Architecture
//!
//! - [`SearchGateway`]: compiles text and facets, runs one index round-trip
//!   under a timeout, returns ranked hits
//! - [`SearchIndex`]: trait for index backends
//! - [`MemoryIndex`]: in-process BM25 index over [`WorkDocument`]s
//! - [`RemoteSearchIndex`]: HTTP client for a remote index service
//! - [`SearchConfig`]: TOML configuration for all of the above
//!
//! # Example
//!
//! ```rust
//! use catalog_search_query::FacetDescriptor;
//! use catalog_search_service::{MemoryIndex, SearchGateway, WorkDocument};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let index = MemoryIndex::with_documents(
//!     "works",
//!     [WorkDocument::new("moby-dick", "Moby Dick").with_author("Herman Melville")],
//! );
//! let gateway = SearchGateway::with_defaults(index);
//!
//! let hits = gateway
//!     .search("melville", &FacetDescriptor::default(), 0, 10)
//!     .await
//!     .unwrap();
//! assert_eq!(hits[0].work_id, "moby-dick");
//! # }
//! ```

pub mod analysis;
pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod gateway;

pub use backend::{MemoryIndex, RemoteSearchIndex, SearchIndex};
pub use config::{ConfigError, DeploymentMode, SearchConfig};
pub use document::{Genre, LicensePool, TargetAge, WorkDocument};
pub use error::{Result, ServiceError};
pub use gateway::{GatewayConfig, SearchGateway};
