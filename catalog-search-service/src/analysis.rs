//! Text analysis for the in-memory index.
//!
//! Pipeline: lowercase, fold accents, drop apostrophes, split on anything
//! that is not alphanumeric, remove stopwords, Snowball English stemming.
//! Documents and queries go through the same pipeline.

use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Query text split into loose terms and double-quoted phrases.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedText {
    pub terms: Vec<String>,
    pub phrases: Vec<Vec<String>>,
}

pub struct Analyzer {
    stemmer: Stemmer,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("stemmer", &"english")
            .finish()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Analyzer {
    /// Analyze `text` into index terms, in order.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        fold(text)
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
            .map(|t| self.stemmer.stem(t).into_owned())
            .collect()
    }

    /// Analyze query text, keeping double-quoted segments together as phrases.
    ///
    /// An unbalanced trailing quote is treated as if it were closed.
    pub fn parse_query(&self, text: &str) -> ParsedText {
        let mut parsed = ParsedText::default();
        for (i, segment) in text.split('"').enumerate() {
            let tokens = self.analyze(segment);
            if i % 2 == 1 && tokens.len() > 1 {
                parsed.phrases.push(tokens);
            } else {
                parsed.terms.extend(tokens);
            }
        }
        parsed
    }
}

/// Lowercase, strip combining marks, drop apostrophes.
fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Edits tolerated for a fuzzy term of `len` characters.
pub fn allowed_edits(len: usize) -> usize {
    match len {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stems_and_drops_stopwords() {
        let analyzer = Analyzer::default();
        assert_eq!(analyzer.analyze("The Running of the Bulls"), vec!["run", "bull"]);
        assert_eq!(analyzer.analyze("runs"), analyzer.analyze("running"));
    }

    #[test]
    fn test_folds_accents() {
        let analyzer = Analyzer::default();
        assert_eq!(
            analyzer.analyze("Les Misérables"),
            analyzer.analyze("les miserables")
        );
    }

    #[test]
    fn test_apostrophes_removed() {
        let analyzer = Analyzer::default();
        assert_eq!(
            analyzer.analyze("Breakfast at Tiffany's"),
            analyzer.analyze("breakfast at tiffanys")
        );
        assert_eq!(analyzer.analyze("Tiffany’s"), analyzer.analyze("tiffanys"));
    }

    #[test]
    fn test_splits_on_punctuation() {
        let analyzer = Analyzer::default();
        let tokens = analyzer.analyze("age 3-5");
        assert_eq!(tokens.len(), 3);
        assert_eq!(&tokens[1..], ["3", "5"]);
    }

    #[test]
    fn test_parse_query_phrases() {
        let analyzer = Analyzer::default();
        let parsed = analyzer.parse_query(r#"whale "moby dick" sea"#);
        assert_eq!(parsed.phrases, vec![analyzer.analyze("moby dick")]);
        assert_eq!(parsed.terms, vec!["whale", "sea"]);

        // A single quoted word is just a term.
        let parsed = analyzer.parse_query(r#""moby""#);
        assert!(parsed.phrases.is_empty());
        assert_eq!(parsed.terms.len(), 1);
    }

    #[test]
    fn test_allowed_edits() {
        assert_eq!(allowed_edits(2), 0);
        assert_eq!(allowed_edits(4), 1);
        assert_eq!(allowed_edits(5), 1);
        assert_eq!(allowed_edits(6), 2);
    }
}
