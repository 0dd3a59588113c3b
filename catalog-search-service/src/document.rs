//! Denormalized work record as seen by the in-memory index.
//!
//! This is the narrow read view of a catalog work: the text fields that are
//! scored, and the keyword/numeric fields that facets filter on.

use catalog_search_protocol::{fields, TermValue};
use catalog_search_query::facets::fiction_term;
use catalog_search_query::{Audience, Medium};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// One source of copies for a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LicensePool {
    #[serde(default)]
    pub open_access: bool,
    #[serde(default)]
    pub suppressed: bool,
    #[serde(default)]
    pub licenses_owned: i64,
    #[serde(default)]
    pub licenses_available: i64,
}

impl LicensePool {
    pub fn licensed(owned: i64, available: i64) -> Self {
        Self {
            licenses_owned: owned,
            licenses_available: available,
            ..Self::default()
        }
    }

    pub fn open_access() -> Self {
        Self {
            open_access: true,
            ..Self::default()
        }
    }

    pub fn suppressed(mut self) -> Self {
        self.suppressed = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetAge {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDocument {
    pub work_id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub medium: Option<Medium>,
    /// Three-letter language code, lowercase.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub fiction: Option<bool>,
    #[serde(default)]
    pub audience: Option<Audience>,
    #[serde(default)]
    pub target_age: Option<TargetAge>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub license_pools: Vec<LicensePool>,
}

/// Values of one field on one document.
pub(crate) enum FieldValues {
    /// Analyzed text fields; the index keeps their tokens.
    Text(Vec<String>),
    Keyword(Vec<TermValue>),
    Numeric(Vec<i64>),
}

impl WorkDocument {
    pub fn new(work_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            work_id: work_id.into(),
            title: title.into(),
            subtitle: None,
            series: None,
            summary: None,
            authors: Vec::new(),
            publisher: None,
            medium: None,
            language: None,
            fiction: None,
            audience: None,
            target_age: None,
            genres: Vec::new(),
            license_pools: Vec::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_medium(mut self, medium: Medium) -> Self {
        self.medium = Some(medium);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_fiction(mut self, fiction: bool) -> Self {
        self.fiction = Some(fiction);
        self
    }

    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = Some(audience);
        self
    }

    pub fn with_target_age(mut self, lower: Option<i64>, upper: Option<i64>) -> Self {
        self.target_age = Some(TargetAge { lower, upper });
        self
    }

    pub fn with_genre(mut self, id: u32, name: impl Into<String>) -> Self {
        self.genres.push(Genre {
            id,
            name: name.into(),
        });
        self
    }

    pub fn with_license_pool(mut self, pool: LicensePool) -> Self {
        self.license_pools.push(pool);
        self
    }

    /// Look up a field by its index name. `None` for unknown fields.
    pub(crate) fn field(&self, field: &str) -> Option<FieldValues> {
        let text = |value: &Option<String>| FieldValues::Text(value.iter().cloned().collect());
        let keywords = |values: Vec<TermValue>| Some(FieldValues::Keyword(values));
        let numbers = |values: Vec<i64>| Some(FieldValues::Numeric(values));
        let pools = || self.license_pools.iter();

        match field {
            fields::TITLE => Some(FieldValues::Text(vec![self.title.clone()])),
            fields::SUBTITLE => Some(text(&self.subtitle)),
            fields::SERIES => Some(text(&self.series)),
            fields::SUMMARY => Some(text(&self.summary)),
            fields::AUTHOR => Some(FieldValues::Text(self.authors.clone())),
            fields::PUBLISHER => Some(text(&self.publisher)),
            fields::MEDIUM => keywords(self.medium.iter().map(|m| m.as_str().into()).collect()),
            fields::LANGUAGE => keywords(self.language.iter().map(|l| l.as_str().into()).collect()),
            fields::FICTION => {
                keywords(self.fiction.iter().map(|f| fiction_term(*f).into()).collect())
            }
            fields::AUDIENCE => {
                keywords(self.audience.iter().map(|a| a.index_term().into()).collect())
            }
            fields::GENRE_ID => keywords(self.genres.iter().map(|g| g.id.into()).collect()),
            fields::GENRE_NAME => {
                keywords(self.genres.iter().map(|g| g.name.as_str().into()).collect())
            }
            fields::TARGET_AGE_LOWER => {
                numbers(self.target_age.iter().filter_map(|t| t.lower).collect())
            }
            fields::TARGET_AGE_UPPER => {
                numbers(self.target_age.iter().filter_map(|t| t.upper).collect())
            }
            fields::SUPPRESSED => keywords(pools().map(|p| p.suppressed.into()).collect()),
            fields::OPEN_ACCESS => keywords(pools().map(|p| p.open_access.into()).collect()),
            fields::LICENSES_OWNED => numbers(pools().map(|p| p.licenses_owned).collect()),
            fields::LICENSES_AVAILABLE => numbers(pools().map(|p| p.licenses_available).collect()),
            _ => None,
        }
    }
}

/// Text fields tokenized at insert time.
pub(crate) const TEXT_FIELDS: [&str; 6] = [
    fields::TITLE,
    fields::SUBTITLE,
    fields::SERIES,
    fields::SUMMARY,
    fields::AUTHOR,
    fields::PUBLISHER,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Text,
    Keyword,
    Numeric,
}

pub(crate) fn field_kind(field: &str) -> Option<FieldKind> {
    if TEXT_FIELDS.contains(&field) {
        return Some(FieldKind::Text);
    }
    match field {
        fields::MEDIUM
        | fields::LANGUAGE
        | fields::FICTION
        | fields::AUDIENCE
        | fields::GENRE_ID
        | fields::GENRE_NAME
        | fields::SUPPRESSED
        | fields::OPEN_ACCESS => Some(FieldKind::Keyword),
        fields::TARGET_AGE_LOWER
        | fields::TARGET_AGE_UPPER
        | fields::LICENSES_OWNED
        | fields::LICENSES_AVAILABLE => Some(FieldKind::Numeric),
        _ => None,
    }
}
