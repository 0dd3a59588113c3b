//! Tunable ranking and scoping policy.
//!
//! These values are loaded once at startup (from configuration or the
//! defaults below) and shared read-only by every compilation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Grade `N` is taught to children of roughly age `N + GRADE_AGE_OFFSET`.
pub const GRADE_AGE_OFFSET: u32 = 5;

/// Terms that attract false-positive fuzzy matches.
pub const DEFAULT_FUZZY_BLACKLIST: &[&str] = &[
    "baseball",
    "basketball",
    "football",
    "softball",
    "volleyball",
];

/// What to do with works whose copies are all checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldPolicy {
    /// Show them; patrons may place holds.
    #[default]
    Allow,
    /// Hide them from deliverable-only searches.
    Hide,
}

/// Score multipliers for the ranking clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub title: f32,
    pub author: f32,
    pub subtitle: f32,
    pub series: f32,
    pub summary: f32,
    pub publisher: f32,
    pub title_phrase: f32,
    pub subtitle_phrase: f32,
    pub summary_phrase: f32,
    /// Applied to the whole fuzzy clause so exact matches outrank it.
    pub fuzzy: f32,
    pub tie_breaker: Option<f32>,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            title: 4.0,
            author: 4.0,
            subtitle: 1.0,
            series: 1.0,
            summary: 1.0,
            publisher: 1.0,
            title_phrase: 3.0,
            subtitle_phrase: 2.0,
            summary_phrase: 1.0,
            fuzzy: 0.5,
            tie_breaker: None,
        }
    }
}

/// Everything about search behavior that is configuration rather than code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPolicy {
    pub hold_policy: HoldPolicy,
    pub grade_age_offset: u32,
    pub fuzzy_blacklist: Vec<String>,
    pub weights: RankingWeights,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            hold_policy: HoldPolicy::default(),
            grade_age_offset: GRADE_AGE_OFFSET,
            fuzzy_blacklist: DEFAULT_FUZZY_BLACKLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            weights: RankingWeights::default(),
        }
    }
}

impl SearchPolicy {
    pub fn with_hold_policy(mut self, hold_policy: HoldPolicy) -> Self {
        self.hold_policy = hold_policy;
        self
    }
}

/// Lowercased fuzzy blacklist, matched against whole tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyBlacklist(BTreeSet<String>);

impl FuzzyBlacklist {
    pub fn new(policy: &SearchPolicy) -> Self {
        Self(
            policy
                .fuzzy_blacklist
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
        )
    }

    /// True if any alphanumeric token of `text` is blacklisted.
    pub fn matches(&self, text: &str) -> bool {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .any(|t| self.0.contains(&t.to_lowercase()))
    }
}

impl Default for FuzzyBlacklist {
    fn default() -> Self {
        Self::new(&SearchPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = SearchPolicy::default();
        assert_eq!(policy.hold_policy, HoldPolicy::Allow);
        assert_eq!(policy.grade_age_offset, 5);
        assert!(policy.fuzzy_blacklist.iter().any(|t| t == "basketball"));
        assert_eq!(policy.weights.title, 4.0);
        assert!(policy.weights.fuzzy < 1.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let policy: SearchPolicy = toml::from_str(
            r#"
            hold_policy = "hide"

            [weights]
            title = 6.0
            "#,
        )
        .unwrap();

        assert_eq!(policy.hold_policy, HoldPolicy::Hide);
        assert_eq!(policy.weights.title, 6.0);
        assert_eq!(policy.weights.author, 4.0);
        assert_eq!(policy.grade_age_offset, GRADE_AGE_OFFSET);
        assert!(!policy.fuzzy_blacklist.is_empty());
    }

    #[test]
    fn test_fuzzy_blacklist_matches_whole_tokens() {
        let blacklist = FuzzyBlacklist::default();
        assert!(blacklist.matches("basketball"));
        assert!(blacklist.matches("Great BASKETBALL stories"));
        assert!(blacklist.matches("pro-football"));
        assert!(!blacklist.matches("basket weaving"));
        assert!(!blacklist.matches("basketballs"));
    }
}
