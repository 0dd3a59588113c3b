//! Classification Extractor
//!
//! Finds classification hints embedded in free-text queries ("young adult
//! romance", "grade 4 science", "lincoln biography") and strips the matched
//! phrases so the leftover text can be scored on its own:
//!
//! - Grade phrases: `grade N`, `grade N-M` (converted to ages via the grade offset)
//! - Age phrases: `age N`, `ages N-M`, `N-M years [old]`
//! - Audience phrases: `young adult`, `children's`, ...
//! - Genre names and aliases from a closed vocabulary
//! - Fiction keywords: `fiction`, `nonfiction`
//!
//! Categories run in that order and each removes its matches before the next
//! one looks at the text, so "science fiction" is a genre, not a fiction hint.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::facets::{AgeRange, Audience};
use crate::policy::{FuzzyBlacklist, SearchPolicy};

/// A structured fact inferred from query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationHint {
    /// Canonical genre name, e.g. `Biography & Memoir`.
    Genre(String),
    /// `true` for fiction, `false` for nonfiction.
    Fiction(bool),
    Audience(Audience),
    Age(AgeRange),
}

impl ClassificationHint {
    fn rank(&self) -> u8 {
        match self {
            ClassificationHint::Genre(_) => 0,
            ClassificationHint::Fiction(_) => 1,
            ClassificationHint::Audience(_) => 2,
            ClassificationHint::Age(_) => 3,
        }
    }
}

/// Result of running the extractor over one query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// Query text with every hint phrase removed, whitespace collapsed.
    pub residual: String,
    /// Hints in canonical order: genres, fiction, audience, age.
    pub hints: Vec<ClassificationHint>,
    /// A fuzzy-blacklisted token appears somewhere in the raw text.
    pub fuzzy_blacklisted: bool,
}

impl Extraction {
    pub fn has_hints(&self) -> bool {
        !self.hints.is_empty()
    }
}

/// Genres recognized in query text: canonical name and lowercase aliases.
const GENRE_VOCABULARY: &[(&str, &[&str])] = &[
    (
        "Action & Adventure",
        &["action & adventure", "action and adventure", "adventure"],
    ),
    (
        "Biography & Memoir",
        &[
            "biography & memoir",
            "autobiography",
            "autobiographies",
            "biography",
            "biographies",
            "memoir",
            "memoirs",
        ],
    ),
    ("Business", &["business"]),
    (
        "Comics & Graphic Novels",
        &["comics & graphic novels", "graphic novels", "graphic novel", "comics", "manga"],
    ),
    ("Cooking", &["cooking", "cookbooks", "cookbook"]),
    ("Fantasy", &["fantasy"]),
    ("Historical Fiction", &["historical fiction"]),
    ("History", &["history"]),
    ("Horror", &["horror"]),
    ("Humor", &["humor", "humour"]),
    ("Mystery", &["mystery", "mysteries"]),
    ("Poetry", &["poetry", "poems"]),
    ("Romance", &["romance"]),
    ("Science Fiction", &["science fiction", "sci-fi", "scifi"]),
    ("Self-Help", &["self-help", "self help"]),
    ("Suspense/Thriller", &["suspense", "thrillers", "thriller"]),
    ("Travel", &["travel"]),
    ("True Crime", &["true crime"]),
    ("Westerns", &["westerns", "western"]),
];

struct Patterns {
    grade: Regex,
    age: Regex,
    years: Regex,
    audiences: Vec<(Audience, Regex)>,
    genres: Vec<(&'static str, Regex)>,
    nonfiction: Regex,
    fiction: Regex,
}

fn word_alternation(phrases: &[&str]) -> Regex {
    let mut sorted: Vec<&str> = phrases.to_vec();
    sorted.sort_by_key(|p| std::cmp::Reverse(p.len()));
    let alternation = sorted
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        grade: Regex::new(r"(?i)\bgrades?\s+(\d{1,2})(?:\s*(?:-|to)\s*(\d{1,2}))?\b").unwrap(),
        age: Regex::new(
            r"(?i)\bages?\s+(\d{1,2})(?:\s*(?:-|to)\s*(\d{1,2}))?(?:\s+years?(?:\s+old)?)?\b",
        )
        .unwrap(),
        years: Regex::new(r"(?i)\b(\d{1,2})(?:\s*(?:-|to)\s*(\d{1,2}))?\s+years?(?:\s+old)?\b")
            .unwrap(),
        audiences: vec![
            (
                Audience::YoungAdult,
                Regex::new(r"(?i)\b(?:young\s+adults?|teenagers?|teens?)\b").unwrap(),
            ),
            (
                Audience::Children,
                Regex::new(r"(?i)\b(?:children(?:['’]s|s)?|childrens|kids|juvenile)\b").unwrap(),
            ),
            (
                Audience::AdultsOnly,
                Regex::new(r"(?i)\badults\s+only\b").unwrap(),
            ),
        ],
        genres: GENRE_VOCABULARY
            .iter()
            .map(|(name, aliases)| (*name, word_alternation(aliases)))
            .collect(),
        nonfiction: Regex::new(r"(?i)\bnon(?:-|\s)?fiction\b").unwrap(),
        fiction: Regex::new(r"(?i)\bfiction\b").unwrap(),
    })
}

/// Closed list of genre names the extractor recognizes.
pub fn known_genres() -> impl Iterator<Item = &'static str> {
    GENRE_VOCABULARY.iter().map(|(name, _)| *name)
}

/// Replace every match of `re` that `accept` approves with a space.
fn strip<F>(text: &str, re: &Regex, mut accept: F) -> String
where
    F: FnMut(&Captures<'_>) -> bool,
{
    re.replace_all(text, |caps: &Captures<'_>| {
        if accept(caps) {
            " ".to_string()
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

/// Parse `N` or `N-M` captures into an inclusive range, shifted by `offset`.
fn captured_range(caps: &Captures<'_>, offset: u32) -> Option<AgeRange> {
    let lower: u32 = caps.get(1)?.as_str().parse().ok()?;
    let upper: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => lower,
    };
    AgeRange::new(lower.checked_add(offset)?, upper.checked_add(offset)?).ok()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Detects classification hints in free text.
///
/// Pattern tables are compiled once per process; each extractor only carries
/// the configurable grade offset and fuzzy blacklist.
#[derive(Debug, Clone)]
pub struct ClassificationExtractor {
    grade_age_offset: u32,
    fuzzy_blacklist: FuzzyBlacklist,
}

impl Default for ClassificationExtractor {
    fn default() -> Self {
        Self::new(&SearchPolicy::default())
    }
}

impl ClassificationExtractor {
    pub fn new(policy: &SearchPolicy) -> Self {
        Self {
            grade_age_offset: policy.grade_age_offset,
            fuzzy_blacklist: FuzzyBlacklist::new(policy),
        }
    }

    /// True if any token of `raw_text` is fuzzy-blacklisted.
    pub fn is_fuzzy_blacklisted(&self, raw_text: &str) -> bool {
        self.fuzzy_blacklist.matches(raw_text)
    }

    pub fn extract(&self, raw_text: &str) -> Extraction {
        let p = patterns();
        let mut found: Vec<ClassificationHint> = Vec::new();

        let offset = self.grade_age_offset;
        let mut text = strip(raw_text, &p.grade, |caps| match captured_range(caps, offset) {
            Some(range) => {
                found.push(ClassificationHint::Age(range));
                true
            }
            None => false,
        });

        for re in [&p.age, &p.years] {
            text = strip(&text, re, |caps| match captured_range(caps, 0) {
                Some(range) => {
                    found.push(ClassificationHint::Age(range));
                    true
                }
                None => false,
            });
        }

        for (audience, re) in &p.audiences {
            text = strip(&text, re, |_| {
                found.push(ClassificationHint::Audience(*audience));
                true
            });
        }

        for (genre, re) in &p.genres {
            text = strip(&text, re, |_| {
                found.push(ClassificationHint::Genre((*genre).to_string()));
                true
            });
        }

        text = strip(&text, &p.nonfiction, |_| {
            found.push(ClassificationHint::Fiction(false));
            true
        });
        text = strip(&text, &p.fiction, |_| {
            found.push(ClassificationHint::Fiction(true));
            true
        });

        let mut hints: Vec<ClassificationHint> = Vec::with_capacity(found.len());
        for hint in found {
            if !hints.contains(&hint) {
                hints.push(hint);
            }
        }
        hints.sort_by_key(ClassificationHint::rank);

        let extraction = Extraction {
            residual: collapse_whitespace(&text),
            hints,
            fuzzy_blacklisted: self.is_fuzzy_blacklisted(raw_text),
        };
        tracing::trace!(
            hints = extraction.hints.len(),
            fuzzy_blacklisted = extraction.fuzzy_blacklisted,
            "classification extracted"
        );
        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Extraction {
        ClassificationExtractor::default().extract(text)
    }

    fn age(lower: u32, upper: u32) -> ClassificationHint {
        ClassificationHint::Age(AgeRange::new(lower, upper).unwrap())
    }

    #[test]
    fn test_age_range_with_years() {
        let ex = extract("age 5-10 years");
        assert_eq!(ex.hints, vec![age(5, 10)]);
        assert_eq!(ex.residual, "");
    }

    #[test]
    fn test_single_age() {
        let ex = extract("dinosaurs age 9");
        assert_eq!(ex.hints, vec![age(9, 9)]);
        assert_eq!(ex.residual, "dinosaurs");
    }

    #[test]
    fn test_bare_years_range() {
        let ex = extract("test 5-10 years");
        assert_eq!(ex.hints, vec![age(5, 10)]);
        assert_eq!(ex.residual, "test");
    }

    #[test]
    fn test_years_old() {
        let ex = extract("books for 8 years old");
        assert_eq!(ex.hints, vec![age(8, 8)]);
        assert_eq!(ex.residual, "books for");
    }

    #[test]
    fn test_grade_uses_offset() {
        let ex = extract("grade 6");
        assert_eq!(ex.hints, vec![age(11, 11)]);
        assert_eq!(ex.residual, "");

        let ex = extract("Grade 4-6 science");
        assert_eq!(ex.hints, vec![age(9, 11)]);
        assert_eq!(ex.residual, "science");
    }

    #[test]
    fn test_custom_grade_offset() {
        let policy = SearchPolicy {
            grade_age_offset: 6,
            ..SearchPolicy::default()
        };
        let ex = ClassificationExtractor::new(&policy).extract("grade 1");
        assert_eq!(ex.hints, vec![age(7, 7)]);
    }

    #[test]
    fn test_inverted_range_stays_in_residual() {
        let ex = extract("age 10-5");
        assert!(ex.hints.is_empty());
        assert_eq!(ex.residual, "age 10-5");
    }

    #[test]
    fn test_genre_and_residual() {
        let ex = extract("lincoln biography");
        assert_eq!(
            ex.hints,
            vec![ClassificationHint::Genre("Biography & Memoir".to_string())]
        );
        assert_eq!(ex.residual, "lincoln");
    }

    #[test]
    fn test_genre_case_insensitive_keeps_residual_case() {
        let ex = extract("Abraham Lincoln BIOGRAPHIES");
        assert_eq!(
            ex.hints,
            vec![ClassificationHint::Genre("Biography & Memoir".to_string())]
        );
        assert_eq!(ex.residual, "Abraham Lincoln");
    }

    #[test]
    fn test_genre_and_fiction_in_canonical_order() {
        let ex = extract("test romance fiction");
        assert_eq!(
            ex.hints,
            vec![
                ClassificationHint::Genre("Romance".to_string()),
                ClassificationHint::Fiction(true),
            ]
        );
        assert_eq!(ex.residual, "test");
    }

    #[test]
    fn test_nonfiction_variants() {
        for text in ["test nonfiction", "test non-fiction", "test non fiction"] {
            let ex = extract(text);
            assert_eq!(ex.hints, vec![ClassificationHint::Fiction(false)], "{text}");
            assert_eq!(ex.residual, "test");
        }
    }

    #[test]
    fn test_science_fiction_is_a_genre_only() {
        let ex = extract("science fiction robots");
        assert_eq!(
            ex.hints,
            vec![ClassificationHint::Genre("Science Fiction".to_string())]
        );
        assert_eq!(ex.residual, "robots");
    }

    #[test]
    fn test_audiences() {
        let ex = extract("test young adult");
        assert_eq!(ex.hints, vec![ClassificationHint::Audience(Audience::YoungAdult)]);
        assert_eq!(ex.residual, "test");

        let ex = extract("children's");
        assert_eq!(ex.hints, vec![ClassificationHint::Audience(Audience::Children)]);
        assert_eq!(ex.residual, "");
    }

    #[test]
    fn test_multiple_categories() {
        let ex = extract("age 8 president biography");
        assert_eq!(
            ex.hints,
            vec![
                ClassificationHint::Genre("Biography & Memoir".to_string()),
                age(8, 8),
            ]
        );
        assert_eq!(ex.residual, "president");

        let ex = extract("young adult romance");
        assert_eq!(
            ex.hints,
            vec![
                ClassificationHint::Genre("Romance".to_string()),
                ClassificationHint::Audience(Audience::YoungAdult),
            ]
        );
        assert_eq!(ex.residual, "");
    }

    #[test]
    fn test_duplicate_hints_collapse() {
        let ex = extract("romance and more romance");
        assert_eq!(ex.hints, vec![ClassificationHint::Genre("Romance".to_string())]);
        assert_eq!(ex.residual, "and more");
    }

    #[test]
    fn test_plain_text_has_no_hints() {
        let ex = extract("moby dick");
        assert!(!ex.has_hints());
        assert_eq!(ex.residual, "moby dick");
        assert!(!ex.fuzzy_blacklisted);
    }

    #[test]
    fn test_fuzzy_blacklist() {
        assert!(extract("basketball").fuzzy_blacklisted);
        assert!(extract("Great BASKETBALL stories").fuzzy_blacklisted);
        assert!(!extract("basket weaving").fuzzy_blacklisted);
    }

    #[test]
    fn test_known_genres() {
        assert!(known_genres().any(|g| g == "Romance"));
        assert!(known_genres().any(|g| g == "Biography & Memoir"));
    }
}
