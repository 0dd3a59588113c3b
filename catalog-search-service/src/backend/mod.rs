//! Search index backends.
//!
//! This module defines the `SearchIndex` trait and provides two
//! implementations:
//!
//! - [`MemoryIndex`]: in-process BM25 index over [`WorkDocument`](crate::WorkDocument)s
//! - [`RemoteSearchIndex`]: HTTP client for an index service speaking the
//!   catalog search protocol

mod memory;
mod remote;

pub use memory::MemoryIndex;
pub use remote::RemoteSearchIndex;

use crate::error::Result;
use async_trait::async_trait;
use catalog_search_protocol::{SearchRequest, SearchResponse};
use std::sync::Arc;

/// A full-text index that executes compiled searches.
///
/// Implementations must report failures as errors; an empty hit list always
/// means the search ran and nothing matched.
#[async_trait]
pub trait SearchIndex: std::fmt::Debug + Send + Sync {
    async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

#[async_trait]
impl<T: SearchIndex + ?Sized> SearchIndex for Arc<T> {
    async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse> {
        (**self).execute(request).await
    }
}
