//! Ranking expression tree.

use serde::{Deserialize, Serialize};

/// A scalar value compared against a keyword, boolean or numeric field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl From<bool> for TermValue {
    fn from(value: bool) -> Self {
        TermValue::Bool(value)
    }
}

impl From<i64> for TermValue {
    fn from(value: i64) -> Self {
        TermValue::Integer(value)
    }
}

impl From<u32> for TermValue {
    fn from(value: u32) -> Self {
        TermValue::Integer(i64::from(value))
    }
}

impl From<&str> for TermValue {
    fn from(value: &str) -> Self {
        TermValue::Text(value.to_string())
    }
}

impl From<String> for TermValue {
    fn from(value: String) -> Self {
        TermValue::Text(value)
    }
}

impl std::fmt::Display for TermValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermValue::Bool(b) => write!(f, "{b}"),
            TermValue::Integer(i) => write!(f, "{i}"),
            TermValue::Text(s) => f.write_str(s),
        }
    }
}

/// Direction of a one-sided numeric range test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeDirection {
    /// Field value `>=` bound.
    AtLeast,
    /// Field value `<=` bound.
    AtMost,
}

impl RangeDirection {
    pub fn admits(self, value: i64, bound: i64) -> bool {
        match self {
            RangeDirection::AtLeast => value >= bound,
            RangeDirection::AtMost => value <= bound,
        }
    }
}

/// A text field with an optional score multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedField {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

impl WeightedField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            weight: None,
        }
    }

    pub fn boosted(field: impl Into<String>, weight: f32) -> Self {
        Self {
            field: field.into(),
            weight: Some(weight),
        }
    }

    /// Effective multiplier (1.0 when unweighted).
    pub fn weight(&self) -> f64 {
        f64::from(self.weight.unwrap_or(1.0))
    }
}

/// Ranking expression.
///
/// The `kind` field is the JSON discriminator. Scores of composite nodes are
/// derived from their children:
///
/// - [`DisMax`](QueryExpression::DisMax): best child, plus `tie_breaker` times the rest
/// - [`Should`](QueryExpression::Should): at least one child; scores add up
/// - [`Must`](QueryExpression::Must): every child; scores add up
/// - [`Bool`](QueryExpression::Bool): every `must` child, `should` children add a bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryExpression {
    /// Matches every document with a constant score.
    MatchAll,

    DisMax {
        queries: Vec<QueryExpression>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tie_breaker: Option<f32>,
    },

    Should {
        clauses: Vec<QueryExpression>,
    },

    Must {
        clauses: Vec<QueryExpression>,
    },

    Bool {
        must: Vec<QueryExpression>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        should: Vec<QueryExpression>,
    },

    /// Bag-of-words match of `text` across several text fields.
    ///
    /// Double-quoted segments of `text` must match as phrases. With `fuzzy`
    /// set, terms also match within an edit distance scaled by term length.
    MultiMatch {
        text: String,
        fields: Vec<WeightedField>,
        #[serde(default)]
        fuzzy: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        boost: Option<f32>,
    },

    /// Exact term match on a keyword field.
    Match {
        field: String,
        value: TermValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        boost: Option<f32>,
    },

    /// Consecutive-token match of `value` within a text field.
    PhraseMatch {
        field: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        boost: Option<f32>,
    },

    RangeMatch {
        field: String,
        bound: i64,
        direction: RangeDirection,
    },
}

impl QueryExpression {
    pub fn dis_max(queries: Vec<QueryExpression>) -> Self {
        QueryExpression::DisMax {
            queries,
            tie_breaker: None,
        }
    }

    pub fn multi_match(text: impl Into<String>, fields: Vec<WeightedField>) -> Self {
        QueryExpression::MultiMatch {
            text: text.into(),
            fields,
            fuzzy: false,
            boost: None,
        }
    }

    pub fn term(field: impl Into<String>, value: impl Into<TermValue>) -> Self {
        QueryExpression::Match {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn phrase(field: impl Into<String>, value: impl Into<String>, boost: Option<f32>) -> Self {
        QueryExpression::PhraseMatch {
            field: field.into(),
            value: value.into(),
            boost,
        }
    }

    pub fn range(field: impl Into<String>, bound: i64, direction: RangeDirection) -> Self {
        QueryExpression::RangeMatch {
            field: field.into(),
            bound,
            direction,
        }
    }

    /// Returns true if this node or any descendant is a fuzzy multi-field match.
    pub fn contains_fuzzy(&self) -> bool {
        match self {
            QueryExpression::MultiMatch { fuzzy, .. } => *fuzzy,
            QueryExpression::DisMax { queries, .. } => queries.iter().any(Self::contains_fuzzy),
            QueryExpression::Should { clauses } | QueryExpression::Must { clauses } => {
                clauses.iter().any(Self::contains_fuzzy)
            }
            QueryExpression::Bool { must, should } => {
                must.iter().chain(should).any(Self::contains_fuzzy)
            }
            QueryExpression::MatchAll
            | QueryExpression::Match { .. }
            | QueryExpression::PhraseMatch { .. }
            | QueryExpression::RangeMatch { .. } => false,
        }
    }
}
