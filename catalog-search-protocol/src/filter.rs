//! Scoping expression tree.

use serde::{Deserialize, Serialize};

use crate::query::TermValue;

/// Boolean filter over structured document fields.
///
/// Filters never affect ranking; a document either passes or is excluded.
/// Multi-valued fields pass a test when any of their values does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterExpression {
    /// All children must pass. An empty `And` passes every document.
    And { filters: Vec<FilterExpression> },

    /// At least one child must pass.
    Or { filters: Vec<FilterExpression> },

    Not { filter: Box<FilterExpression> },

    Term { field: String, value: TermValue },

    TermsIn { field: String, values: Vec<TermValue> },

    TermNotIn { field: String, values: Vec<TermValue> },

    RangeAtLeast { field: String, value: i64 },

    RangeAtMost { field: String, value: i64 },

    /// Passes when the document has no value for `field`.
    FieldMissing { field: String },
}

impl FilterExpression {
    pub fn and(filters: Vec<FilterExpression>) -> Self {
        FilterExpression::And { filters }
    }

    pub fn or(filters: Vec<FilterExpression>) -> Self {
        FilterExpression::Or { filters }
    }

    pub fn not(filter: FilterExpression) -> Self {
        FilterExpression::Not {
            filter: Box::new(filter),
        }
    }

    pub fn term(field: impl Into<String>, value: impl Into<TermValue>) -> Self {
        FilterExpression::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn terms_in<V: Into<TermValue>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        FilterExpression::TermsIn {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn term_not_in<V: Into<TermValue>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        FilterExpression::TermNotIn {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn at_least(field: impl Into<String>, value: i64) -> Self {
        FilterExpression::RangeAtLeast {
            field: field.into(),
            value,
        }
    }

    pub fn at_most(field: impl Into<String>, value: i64) -> Self {
        FilterExpression::RangeAtMost {
            field: field.into(),
            value,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        FilterExpression::FieldMissing {
            field: field.into(),
        }
    }

    /// True for an `And` with no children, i.e. a filter that scopes nothing.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, FilterExpression::And { filters } if filters.is_empty())
    }
}
