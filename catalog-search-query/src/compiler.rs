//! One-call compilation of a search: extraction, ranking and scoping.

use catalog_search_protocol::{FilterExpression, QueryExpression};

use crate::classification::{ClassificationExtractor, Extraction};
use crate::facets::FacetDescriptor;
use crate::filter::FilterCompiler;
use crate::policy::SearchPolicy;
use crate::query::QueryCompiler;

/// Output of [`SearchCompiler::compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSearch {
    pub extraction: Extraction,
    pub query: QueryExpression,
    pub filter: FilterExpression,
}

/// Extractor plus both compilers, configured from one [`SearchPolicy`].
///
/// Stateless after construction; share it freely across requests.
#[derive(Debug, Clone, Default)]
pub struct SearchCompiler {
    extractor: ClassificationExtractor,
    query: QueryCompiler,
    filter: FilterCompiler,
}

impl SearchCompiler {
    pub fn new(policy: &SearchPolicy) -> Self {
        Self {
            extractor: ClassificationExtractor::new(policy),
            query: QueryCompiler::new(policy),
            filter: FilterCompiler::new(policy.hold_policy),
        }
    }

    pub fn compile(&self, raw_text: &str, facets: &FacetDescriptor) -> CompiledSearch {
        let extraction = self.extractor.extract(raw_text);
        let query = self.query.compile(raw_text, &extraction);
        let filter = self.filter.compile(facets);
        CompiledSearch {
            extraction,
            query,
            filter,
        }
    }

    pub fn extractor(&self) -> &ClassificationExtractor {
        &self.extractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::HoldPolicy;

    #[test]
    fn test_compile_wires_policy_through() {
        let policy = SearchPolicy::default().with_hold_policy(HoldPolicy::Hide);
        let compiler = SearchCompiler::new(&policy);
        let facets = FacetDescriptor::builder()
            .only_deliverable(true)
            .build()
            .unwrap();

        let compiled = compiler.compile("romance", &facets);
        assert_eq!(compiled.extraction.hints.len(), 1);
        assert!(matches!(compiled.query, QueryExpression::DisMax { .. }));

        let FilterExpression::And { filters } = &compiled.filter else {
            panic!("expected and");
        };
        let FilterExpression::And { filters: deliverable } = &filters[0] else {
            panic!("expected deliverability and");
        };
        assert_eq!(deliverable.len(), 3);
    }

    #[test]
    fn test_empty_search() {
        let compiled = SearchCompiler::default().compile("", &FacetDescriptor::default());
        assert_eq!(compiled.query, QueryExpression::MatchAll);
        assert!(compiled.filter.is_unrestricted());
    }
}
