//! In-process search index.
//!
//! Holds denormalized [`WorkDocument`]s and executes compiled searches
//! against them: filters are evaluated exactly, queries are scored with
//! BM25 over per-field statistics.
//!
//! - IDF: log(1 + (N - n + 0.5) / (n + 0.5))
//! - Term score: IDF * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * (len / avg_len)))
//!
//! with k1 = 1.2 and b = 0.75. `N`, `n` and `avg_len` are computed per text
//! field over the documents that have that field.

use async_trait::async_trait;
use catalog_search_protocol::{
    FilterExpression, QueryExpression, RangeDirection, SearchHit, SearchRequest, SearchResponse,
    TermValue, PROTOCOL_VERSION,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use super::SearchIndex;
use crate::analysis::{allowed_edits, Analyzer, ParsedText};
use crate::document::{field_kind, FieldKind, FieldValues, WorkDocument, TEXT_FIELDS};
use crate::error::{Result, ServiceError};

const K1: f64 = 1.2;
const B: f64 = 0.75;

#[derive(Debug, Default)]
struct FieldStats {
    doc_count: usize,
    total_len: usize,
    doc_freq: HashMap<String, usize>,
}

impl FieldStats {
    fn add(&mut self, tokens: &[String]) {
        if tokens.is_empty() {
            return;
        }
        self.doc_count += 1;
        self.total_len += tokens.len();
        for term in tokens.iter().collect::<HashSet<_>>() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }
    }

    fn remove(&mut self, tokens: &[String]) {
        if tokens.is_empty() {
            return;
        }
        self.doc_count = self.doc_count.saturating_sub(1);
        self.total_len = self.total_len.saturating_sub(tokens.len());
        for term in tokens.iter().collect::<HashSet<_>>() {
            if let Some(df) = self.doc_freq.get_mut(term) {
                *df -= 1;
                if *df == 0 {
                    self.doc_freq.remove(term);
                }
            }
        }
    }

    fn bm25(&self, term: &str, tf: usize, doc_len: usize) -> f64 {
        if tf == 0 || self.doc_count == 0 {
            return 0.0;
        }
        let n = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        let big_n = self.doc_count as f64;
        let idf = (1.0 + (big_n - n + 0.5) / (n + 0.5)).ln();

        let avg_len = self.total_len as f64 / big_n;
        let tf = tf as f64;
        let norm = K1 * (1.0 - B + B * (doc_len as f64 / avg_len));
        idf * (tf * (K1 + 1.0)) / (tf + norm)
    }
}

#[derive(Debug)]
struct IndexedWork {
    doc: WorkDocument,
    tokens: HashMap<&'static str, Vec<String>>,
}

impl IndexedWork {
    fn tokens(&self, field: &str) -> &[String] {
        self.tokens.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Default)]
struct Corpus {
    works: Vec<IndexedWork>,
    stats: HashMap<&'static str, FieldStats>,
}

impl Corpus {
    fn add_stats(&mut self, work: &IndexedWork) {
        for (field, tokens) in &work.tokens {
            self.stats.entry(*field).or_default().add(tokens);
        }
    }

    fn remove_stats(&mut self, work: &IndexedWork) {
        for (field, tokens) in &work.tokens {
            if let Some(stats) = self.stats.get_mut(*field) {
                stats.remove(tokens);
            }
        }
    }

    fn stats(&self, field: &str) -> Option<&FieldStats> {
        self.stats.get(field)
    }
}

/// Query tree with text already analyzed and fields resolved.
#[derive(Debug)]
enum Prepared {
    MatchAll,
    DisMax {
        queries: Vec<Prepared>,
        tie_breaker: f64,
    },
    Should(Vec<Prepared>),
    Must(Vec<Prepared>),
    Bool {
        must: Vec<Prepared>,
        should: Vec<Prepared>,
    },
    Text {
        fields: Vec<(&'static str, f64)>,
        parsed: ParsedText,
        fuzzy: bool,
        boost: f64,
    },
    Term {
        field: String,
        value: TermValue,
        boost: f64,
    },
    Phrase {
        field: &'static str,
        tokens: Vec<String>,
        boost: f64,
    },
    Range {
        field: String,
        bound: i64,
        direction: RangeDirection,
    },
}

/// In-memory works index.
///
/// Hits with equal scores keep insertion order.
#[derive(Debug)]
pub struct MemoryIndex {
    name: String,
    analyzer: Analyzer,
    corpus: RwLock<Corpus>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            analyzer: Analyzer::default(),
            corpus: RwLock::new(Corpus::default()),
        }
    }

    pub fn with_documents(
        name: impl Into<String>,
        docs: impl IntoIterator<Item = WorkDocument>,
    ) -> Self {
        let index = Self::new(name);
        index.extend(docs);
        index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.corpus.read().works.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a document, replacing any existing one with the same `work_id`.
    pub fn insert(&self, doc: WorkDocument) {
        let work = self.index_document(doc);
        let mut corpus = self.corpus.write();
        corpus.add_stats(&work);
        match corpus
            .works
            .iter()
            .position(|w| w.doc.work_id == work.doc.work_id)
        {
            Some(pos) => {
                let old = std::mem::replace(&mut corpus.works[pos], work);
                corpus.remove_stats(&old);
            }
            None => corpus.works.push(work),
        }
    }

    pub fn extend(&self, docs: impl IntoIterator<Item = WorkDocument>) {
        for doc in docs {
            self.insert(doc);
        }
    }

    /// Returns true if a document was removed.
    pub fn remove(&self, work_id: &str) -> bool {
        let mut corpus = self.corpus.write();
        match corpus.works.iter().position(|w| w.doc.work_id == work_id) {
            Some(pos) => {
                let old = corpus.works.remove(pos);
                corpus.remove_stats(&old);
                true
            }
            None => false,
        }
    }

    fn index_document(&self, doc: WorkDocument) -> IndexedWork {
        let mut tokens = HashMap::with_capacity(TEXT_FIELDS.len());
        for field in TEXT_FIELDS {
            if let Some(FieldValues::Text(values)) = doc.field(field) {
                let analyzed: Vec<String> = values
                    .iter()
                    .flat_map(|v| self.analyzer.analyze(v))
                    .collect();
                if !analyzed.is_empty() {
                    tokens.insert(field, analyzed);
                }
            }
        }
        IndexedWork { doc, tokens }
    }

    fn prepare(&self, query: &QueryExpression) -> Result<Prepared> {
        let prepare_all = |queries: &[QueryExpression]| -> Result<Vec<Prepared>> {
            queries.iter().map(|q| self.prepare(q)).collect()
        };

        Ok(match query {
            QueryExpression::MatchAll => Prepared::MatchAll,
            QueryExpression::DisMax {
                queries,
                tie_breaker,
            } => Prepared::DisMax {
                queries: prepare_all(queries)?,
                tie_breaker: tie_breaker.map(f64::from).unwrap_or(0.0),
            },
            QueryExpression::Should { clauses } => Prepared::Should(prepare_all(clauses)?),
            QueryExpression::Must { clauses } => Prepared::Must(prepare_all(clauses)?),
            QueryExpression::Bool { must, should } => Prepared::Bool {
                must: prepare_all(must)?,
                should: prepare_all(should)?,
            },
            QueryExpression::MultiMatch {
                text,
                fields,
                fuzzy,
                boost,
            } => Prepared::Text {
                fields: fields
                    .iter()
                    .map(|f| -> Result<(&'static str, f64)> {
                        Ok((text_field(&f.field)?, f.weight()))
                    })
                    .collect::<Result<_>>()?,
                parsed: self.analyzer.parse_query(text),
                fuzzy: *fuzzy,
                boost: boost.map(f64::from).unwrap_or(1.0),
            },
            QueryExpression::Match {
                field,
                value,
                boost,
            } => {
                expect_kind(field, FieldKind::Keyword)?;
                Prepared::Term {
                    field: field.clone(),
                    value: value.clone(),
                    boost: boost.map(f64::from).unwrap_or(1.0),
                }
            }
            QueryExpression::PhraseMatch {
                field,
                value,
                boost,
            } => Prepared::Phrase {
                field: text_field(field)?,
                tokens: self.analyzer.analyze(value),
                boost: boost.map(f64::from).unwrap_or(1.0),
            },
            QueryExpression::RangeMatch {
                field,
                bound,
                direction,
            } => {
                expect_kind(field, FieldKind::Numeric)?;
                Prepared::Range {
                    field: field.clone(),
                    bound: *bound,
                    direction: *direction,
                }
            }
        })
    }

    fn search_sync(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let start = Instant::now();

        if request.protocol_version != PROTOCOL_VERSION {
            return Err(ServiceError::UnsupportedProtocolVersion {
                version: request.protocol_version.clone(),
            });
        }
        if request.index != self.name {
            return Err(ServiceError::IndexNotFound {
                index: request.index.clone(),
            });
        }

        let query = self.prepare(&request.query)?;
        if let Some(filter) = &request.filter {
            validate_filter(filter)?;
        }

        let corpus = self.corpus.read();
        let mut scored: Vec<(usize, f64)> = corpus
            .works
            .iter()
            .enumerate()
            .filter(|(_, work)| {
                request
                    .filter
                    .as_ref()
                    .map_or(true, |f| filter_matches(&work.doc, f))
            })
            .filter_map(|(pos, work)| score(&corpus, work, &query).map(|s| (pos, s)))
            .collect();

        // Stable: equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let total = scored.len();
        let hits: Vec<SearchHit> = scored
            .into_iter()
            .skip(request.from)
            .take(request.size)
            .map(|(pos, s)| SearchHit::new(corpus.works[pos].doc.work_id.clone(), s))
            .collect();

        let took_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            index = %self.name,
            total,
            returned = hits.len(),
            took_ms,
            "memory index search"
        );

        Ok(SearchResponse::new(
            PROTOCOL_VERSION.to_string(),
            request.request_id.clone(),
            hits,
            took_ms,
        )
        .with_total(total as u64))
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.search_sync(request)
    }
}

fn text_field(field: &str) -> Result<&'static str> {
    TEXT_FIELDS
        .iter()
        .find(|f| **f == field)
        .copied()
        .ok_or_else(|| ServiceError::invalid(format!("not a text field: {field}")))
}

fn expect_kind(field: &str, kind: FieldKind) -> Result<()> {
    match field_kind(field) {
        Some(k) if k == kind => Ok(()),
        Some(k) => Err(ServiceError::invalid(format!(
            "field {field} is {k:?}, expected {kind:?}"
        ))),
        None => Err(ServiceError::invalid(format!("unknown field: {field}"))),
    }
}

fn validate_filter(filter: &FilterExpression) -> Result<()> {
    match filter {
        FilterExpression::And { filters } | FilterExpression::Or { filters } => {
            filters.iter().try_for_each(validate_filter)
        }
        FilterExpression::Not { filter } => validate_filter(filter),
        FilterExpression::Term { field, .. }
        | FilterExpression::TermsIn { field, .. }
        | FilterExpression::TermNotIn { field, .. } => expect_kind(field, FieldKind::Keyword),
        FilterExpression::RangeAtLeast { field, .. } | FilterExpression::RangeAtMost { field, .. } => {
            expect_kind(field, FieldKind::Numeric)
        }
        FilterExpression::FieldMissing { field } => field_kind(field)
            .map(|_| ())
            .ok_or_else(|| ServiceError::invalid(format!("unknown field: {field}"))),
    }
}

fn keywords(doc: &WorkDocument, field: &str) -> Vec<TermValue> {
    match doc.field(field) {
        Some(FieldValues::Keyword(values)) => values,
        _ => Vec::new(),
    }
}

fn numbers(doc: &WorkDocument, field: &str) -> Vec<i64> {
    match doc.field(field) {
        Some(FieldValues::Numeric(values)) => values,
        _ => Vec::new(),
    }
}

/// Multi-valued fields match when any value matches. An empty `Or` matches
/// nothing; an empty `And` matches everything.
fn filter_matches(doc: &WorkDocument, filter: &FilterExpression) -> bool {
    match filter {
        FilterExpression::And { filters } => filters.iter().all(|f| filter_matches(doc, f)),
        FilterExpression::Or { filters } => filters.iter().any(|f| filter_matches(doc, f)),
        FilterExpression::Not { filter } => !filter_matches(doc, filter),
        FilterExpression::Term { field, value } => keywords(doc, field).contains(value),
        FilterExpression::TermsIn { field, values } => {
            keywords(doc, field).iter().any(|v| values.contains(v))
        }
        FilterExpression::TermNotIn { field, values } => {
            !keywords(doc, field).iter().any(|v| values.contains(v))
        }
        FilterExpression::RangeAtLeast { field, value } => {
            numbers(doc, field).iter().any(|n| n >= value)
        }
        FilterExpression::RangeAtMost { field, value } => {
            numbers(doc, field).iter().any(|n| n <= value)
        }
        FilterExpression::FieldMissing { field } => match doc.field(field) {
            Some(FieldValues::Text(values)) => values.iter().all(|v| v.trim().is_empty()),
            Some(FieldValues::Keyword(values)) => values.is_empty(),
            Some(FieldValues::Numeric(values)) => values.is_empty(),
            None => true,
        },
    }
}

/// Score of `work` under `query`, or `None` if it does not match.
fn score(corpus: &Corpus, work: &IndexedWork, query: &Prepared) -> Option<f64> {
    match query {
        Prepared::MatchAll => Some(1.0),
        Prepared::DisMax {
            queries,
            tie_breaker,
        } => {
            let scores: Vec<f64> = queries
                .iter()
                .filter_map(|q| score(corpus, work, q))
                .collect();
            let best = scores.iter().copied().reduce(f64::max)?;
            let rest: f64 = scores.iter().sum::<f64>() - best;
            Some(best + tie_breaker * rest)
        }
        Prepared::Should(clauses) => {
            let scores: Vec<f64> = clauses
                .iter()
                .filter_map(|q| score(corpus, work, q))
                .collect();
            (!scores.is_empty()).then(|| scores.iter().sum::<f64>())
        }
        Prepared::Must(clauses) => clauses.iter().map(|q| score(corpus, work, q)).sum(),
        Prepared::Bool { must, should } => {
            let required: f64 = must
                .iter()
                .map(|q| score(corpus, work, q))
                .sum::<Option<f64>>()?;
            let optional: Vec<f64> = should
                .iter()
                .filter_map(|q| score(corpus, work, q))
                .collect();
            if must.is_empty() && optional.is_empty() {
                return None;
            }
            Some(required + optional.iter().sum::<f64>())
        }
        Prepared::Text {
            fields,
            parsed,
            fuzzy,
            boost,
        } => text_score(corpus, work, fields, parsed, *fuzzy).map(|s| s * boost),
        Prepared::Term {
            field,
            value,
            boost,
        } => keywords(&work.doc, field)
            .contains(value)
            .then_some(*boost),
        Prepared::Phrase {
            field,
            tokens,
            boost,
        } => {
            let stats = corpus.stats(field)?;
            let doc_tokens = work.tokens(field);
            let count = phrase_count(doc_tokens, tokens);
            (count > 0).then(|| {
                let s: f64 = tokens
                    .iter()
                    .map(|t| stats.bm25(t, count, doc_tokens.len()))
                    .sum();
                s * boost
            })
        }
        Prepared::Range {
            field,
            bound,
            direction,
        } => numbers(&work.doc, field)
            .iter()
            .any(|n| direction.admits(*n, *bound))
            .then_some(1.0),
    }
}

/// Sum over fields of weighted BM25 for every matching term and phrase.
fn text_score(
    corpus: &Corpus,
    work: &IndexedWork,
    fields: &[(&'static str, f64)],
    parsed: &ParsedText,
    fuzzy: bool,
) -> Option<f64> {
    let mut total = 0.0;
    let mut matched = false;

    for (field, weight) in fields {
        let doc_tokens = work.tokens(field);
        let Some(stats) = corpus.stats(field) else {
            continue;
        };
        if doc_tokens.is_empty() {
            continue;
        }
        let doc_len = doc_tokens.len();

        for term in &parsed.terms {
            let term_score = if fuzzy {
                fuzzy_term_score(stats, doc_tokens, term)
            } else {
                let tf = doc_tokens.iter().filter(|t| *t == term).count();
                stats.bm25(term, tf, doc_len)
            };
            if term_score > 0.0 {
                matched = true;
                total += weight * term_score;
            }
        }

        for phrase in &parsed.phrases {
            let count = phrase_count(doc_tokens, phrase);
            if count > 0 {
                matched = true;
                total += weight
                    * phrase
                        .iter()
                        .map(|t| stats.bm25(t, count, doc_len))
                        .sum::<f64>();
            }
        }
    }

    matched.then_some(total)
}

/// Best-scoring document token within the allowed edit distance of `term`.
/// Closer tokens score higher.
fn fuzzy_term_score(stats: &FieldStats, doc_tokens: &[String], term: &str) -> f64 {
    let max_edits = allowed_edits(term.chars().count());
    let mut best = 0.0_f64;
    let mut seen = HashSet::new();
    for token in doc_tokens {
        if !seen.insert(token) {
            continue;
        }
        let distance = strsim::damerau_levenshtein(term, token);
        if distance > max_edits {
            continue;
        }
        let tf = doc_tokens.iter().filter(|t| *t == token).count();
        let s = stats.bm25(token, tf, doc_tokens.len()) / (1.0 + distance as f64);
        best = best.max(s);
    }
    best
}

fn phrase_count(doc_tokens: &[String], phrase: &[String]) -> usize {
    if phrase.is_empty() || phrase.len() > doc_tokens.len() {
        return 0;
    }
    doc_tokens
        .windows(phrase.len())
        .filter(|w| *w == phrase)
        .count()
}
