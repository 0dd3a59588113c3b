//! Validation errors for search scoping input.

use thiserror::Error;

/// Rejected facet selections.
///
/// Facets are never repaired silently; a malformed selection fails at
/// construction of the [`FacetDescriptor`](crate::FacetDescriptor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacetError {
    #[error("invalid age range: lower bound {lower} exceeds upper bound {upper}")]
    InvalidAgeRange { lower: u32, upper: u32 },

    #[error("language {code} is both included and excluded")]
    ConflictingLanguage { code: String },

    #[error("invalid language code: {code:?}")]
    InvalidLanguageCode { code: String },

    #[error("unknown {facet}: {value:?}")]
    UnknownValue { facet: &'static str, value: String },
}

/// Result type alias for facet construction.
pub type Result<T> = std::result::Result<T, FacetError>;
