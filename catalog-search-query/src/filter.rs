//! Filter Compiler
//!
//! Turns a [`FacetDescriptor`] into an `And` of independent sub-filters. An
//! unset facet contributes no node at all, so an unrestricted descriptor
//! compiles to an empty `And`.

use catalog_search_protocol::{fields, FilterExpression, RangeDirection};

use crate::facets::{fiction_term, AgeRange, FacetDescriptor, FictionScope};
use crate::policy::HoldPolicy;

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterCompiler {
    hold_policy: HoldPolicy,
}

impl FilterCompiler {
    pub fn new(hold_policy: HoldPolicy) -> Self {
        Self { hold_policy }
    }

    pub fn hold_policy(&self) -> HoldPolicy {
        self.hold_policy
    }

    pub fn compile(&self, facets: &FacetDescriptor) -> FilterExpression {
        let mut filters = Vec::new();

        if let Some(languages) = facets.languages() {
            filters.push(FilterExpression::terms_in(
                fields::LANGUAGE,
                languages.iter().map(|l| l.as_str()),
            ));
        }
        if !facets.exclude_languages().is_empty() {
            filters.push(FilterExpression::term_not_in(
                fields::LANGUAGE,
                facets.exclude_languages().iter().map(|l| l.as_str()),
            ));
        }
        if !facets.media().is_empty() {
            filters.push(FilterExpression::terms_in(
                fields::MEDIUM,
                facets.media().iter().map(|m| m.as_str()),
            ));
        }
        match facets.fiction() {
            FictionScope::Fiction => {
                filters.push(FilterExpression::term(fields::FICTION, fiction_term(true)));
            }
            FictionScope::Nonfiction => {
                filters.push(FilterExpression::term(fields::FICTION, fiction_term(false)));
            }
            FictionScope::Both => {}
        }
        if !facets.audiences().is_empty() {
            filters.push(FilterExpression::terms_in(
                fields::AUDIENCE,
                facets.audiences().iter().map(|a| a.index_term()),
            ));
        }
        if let Some(range) = facets.age_range() {
            filters.push(age_filter(range));
        }
        if !facets.genre_ids().is_empty() {
            filters.push(FilterExpression::terms_in(
                fields::GENRE_ID,
                facets.genre_ids().iter().map(|g| g.0),
            ));
        }
        if facets.only_deliverable() {
            filters.push(self.deliverable_filter());
        }

        FilterExpression::and(filters)
    }

    /// Not suppressed, and either open access or at least one license owned.
    /// Under [`HoldPolicy::Hide`] a copy must also be available right now.
    fn deliverable_filter(&self) -> FilterExpression {
        let mut filters = Vec::with_capacity(3);
        if self.hold_policy == HoldPolicy::Hide {
            filters.push(FilterExpression::or(vec![
                FilterExpression::at_least(fields::LICENSES_AVAILABLE, 1),
                FilterExpression::term(fields::OPEN_ACCESS, true),
            ]));
        }
        filters.push(FilterExpression::not(FilterExpression::term(
            fields::SUPPRESSED,
            true,
        )));
        filters.push(FilterExpression::or(vec![
            FilterExpression::at_least(fields::LICENSES_OWNED, 1),
            FilterExpression::term(fields::OPEN_ACCESS, true),
        ]));
        FilterExpression::and(filters)
    }
}

/// Interval overlap that tolerates a document missing either bound.
fn age_filter(range: AgeRange) -> FilterExpression {
    let checks = range
        .overlap_bounds()
        .into_iter()
        .map(|(field, bound, direction)| {
            let test = match direction {
                RangeDirection::AtLeast => FilterExpression::at_least(field, bound),
                RangeDirection::AtMost => FilterExpression::at_most(field, bound),
            };
            FilterExpression::or(vec![test, FilterExpression::missing(field)])
        })
        .collect();
    FilterExpression::and(checks)
}
