//! Query Compiler
//!
//! Turns query text and its classification hints into a dis-max over up to
//! four interpretations, from most to least confident:
//!
//! 1. The full text as an exact/stemmed multi-field match
//! 2. The full text as a phrase in title, subtitle or summary
//! 3. The full text with edit-distance tolerance (skipped for blacklisted terms)
//! 4. Every classification hint AND the residual text
//!
//! Dis-max scores a document by its best interpretation, so a strong exact
//! match is never diluted by also matching the fuzzy clause.

use catalog_search_protocol::{fields, QueryExpression, WeightedField};

use crate::classification::{ClassificationHint, Extraction};
use crate::facets::fiction_term;
use crate::policy::{FuzzyBlacklist, RankingWeights, SearchPolicy};

#[derive(Debug, Clone)]
pub struct QueryCompiler {
    weights: RankingWeights,
    fuzzy_blacklist: FuzzyBlacklist,
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new(&SearchPolicy::default())
    }
}

impl QueryCompiler {
    pub fn new(policy: &SearchPolicy) -> Self {
        Self {
            weights: policy.weights.clone(),
            fuzzy_blacklist: FuzzyBlacklist::new(policy),
        }
    }

    pub fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    /// Compile `raw_text` and the hints extracted from it.
    ///
    /// Returns [`QueryExpression::MatchAll`] when there is neither text nor
    /// a hint; rejecting such searches is up to the caller.
    pub fn compile(&self, raw_text: &str, extraction: &Extraction) -> QueryExpression {
        let text = raw_text.trim();
        let mut queries = Vec::with_capacity(4);

        if !text.is_empty() {
            queries.push(self.text_match(text, false));
            queries.push(self.phrase_boost(text));
            // The raw text is checked too; `extraction` may come from elsewhere.
            if !extraction.fuzzy_blacklisted && !self.fuzzy_blacklist.matches(text) {
                queries.push(self.text_match(text, true));
            }
        }

        if extraction.has_hints() {
            queries.push(self.classification_clause(extraction));
        }

        if queries.is_empty() {
            return QueryExpression::MatchAll;
        }

        QueryExpression::DisMax {
            queries,
            tie_breaker: self.weights.tie_breaker,
        }
    }

    fn text_fields(&self) -> Vec<WeightedField> {
        let w = &self.weights;
        vec![
            WeightedField::boosted(fields::TITLE, w.title),
            weighted(fields::SUBTITLE, w.subtitle),
            weighted(fields::SERIES, w.series),
            weighted(fields::SUMMARY, w.summary),
            WeightedField::boosted(fields::AUTHOR, w.author),
            weighted(fields::PUBLISHER, w.publisher),
        ]
    }

    fn text_match(&self, text: &str, fuzzy: bool) -> QueryExpression {
        QueryExpression::MultiMatch {
            text: text.to_string(),
            fields: self.text_fields(),
            fuzzy,
            boost: fuzzy.then_some(self.weights.fuzzy),
        }
    }

    fn phrase_boost(&self, text: &str) -> QueryExpression {
        let w = &self.weights;
        QueryExpression::Should {
            clauses: vec![
                QueryExpression::phrase(fields::TITLE, text, Some(w.title_phrase)),
                QueryExpression::phrase(fields::SUBTITLE, text, Some(w.subtitle_phrase)),
                QueryExpression::phrase(fields::SUMMARY, text, Some(w.summary_phrase)),
            ],
        }
    }

    fn classification_clause(&self, extraction: &Extraction) -> QueryExpression {
        let mut clauses: Vec<QueryExpression> =
            extraction.hints.iter().map(hint_clause).collect();
        if !extraction.residual.is_empty() {
            clauses.push(self.text_match(&extraction.residual, false));
        }
        QueryExpression::Must { clauses }
    }
}

/// A text field weight of exactly 1.0 is left implicit.
fn weighted(field: &str, weight: f32) -> WeightedField {
    if (weight - 1.0).abs() < f32::EPSILON {
        WeightedField::new(field)
    } else {
        WeightedField::boosted(field, weight)
    }
}

fn hint_clause(hint: &ClassificationHint) -> QueryExpression {
    match hint {
        ClassificationHint::Genre(name) => QueryExpression::term(fields::GENRE_NAME, name.as_str()),
        ClassificationHint::Fiction(fiction) => {
            QueryExpression::term(fields::FICTION, fiction_term(*fiction))
        }
        ClassificationHint::Audience(audience) => {
            QueryExpression::term(fields::AUDIENCE, audience.index_term())
        }
        ClassificationHint::Age(range) => QueryExpression::Bool {
            must: range
                .overlap_bounds()
                .into_iter()
                .map(|(field, bound, direction)| QueryExpression::range(field, bound, direction))
                .collect(),
            should: range
                .containment_bounds()
                .into_iter()
                .map(|(field, bound, direction)| QueryExpression::range(field, bound, direction))
                .collect(),
        },
    }
}
