//! Search query and filter compilation for the library catalog.
//!
//! Given free-text query text and a [`FacetDescriptor`], this crate produces
//! a weighted ranking expression and a separate scoping filter:
//!
//! - [`ClassificationExtractor`]: detects genre, fiction, audience and age
//!   hints in the text and returns the residual text
//! - [`QueryCompiler`]: dis-max over exact, phrase, fuzzy and classification
//!   interpretations of the text
//! - [`FilterCompiler`]: facet constraints (media, language, fiction,
//!   audience, age overlap, genre, deliverability)
//! - [`SearchCompiler`]: all three in one call, configured by [`SearchPolicy`]
//!
//! Everything here is pure; nothing touches the network or shared state.
//!
//! # Example
//!
//! ```rust
//! use catalog_search_query::{FacetDescriptor, Medium, SearchCompiler};
//!
//! let facets = FacetDescriptor::builder()
//!     .medium(Medium::Book)
//!     .age_range(8, 10)
//!     .build()
//!     .unwrap();
//!
//! let compiled = SearchCompiler::default().compile("young adult romance", &facets);
//! assert_eq!(compiled.extraction.hints.len(), 2);
//! ```

pub mod classification;
pub mod compiler;
pub mod error;
pub mod facets;
pub mod filter;
pub mod policy;
pub mod query;

pub use classification::{ClassificationExtractor, ClassificationHint, Extraction};
pub use compiler::{CompiledSearch, SearchCompiler};
pub use error::{FacetError, Result};
pub use facets::{
    AgeRange, Audience, FacetDescriptor, FacetDescriptorBuilder, FictionScope, GenreId,
    LanguageCode, Medium,
};
pub use filter::FilterCompiler;
pub use policy::{FuzzyBlacklist, HoldPolicy, RankingWeights, SearchPolicy};
pub use query::QueryCompiler;
