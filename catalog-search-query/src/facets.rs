//! Facet Descriptor: the immutable scope of one search request.

use catalog_search_protocol::{fields, RangeDirection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{FacetError, Result};

/// Physical or digital format of an edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Medium {
    Book,
    Audio,
    Video,
    Music,
    Periodical,
    Image,
    Courseware,
}

impl Medium {
    pub fn as_str(self) -> &'static str {
        match self {
            Medium::Book => "Book",
            Medium::Audio => "Audio",
            Medium::Video => "Video",
            Medium::Music => "Music",
            Medium::Periodical => "Periodical",
            Medium::Image => "Image",
            Medium::Courseware => "Courseware",
        }
    }
}

impl FromStr for Medium {
    type Err = FacetError;

    fn from_str(s: &str) -> Result<Self> {
        let medium = match s.trim().to_ascii_lowercase().as_str() {
            "book" => Medium::Book,
            "audio" => Medium::Audio,
            "video" => Medium::Video,
            "music" => Medium::Music,
            "periodical" => Medium::Periodical,
            "image" => Medium::Image,
            "courseware" => Medium::Courseware,
            _ => {
                return Err(FacetError::UnknownValue {
                    facet: "medium",
                    value: s.to_string(),
                })
            }
        };
        Ok(medium)
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intended readership of a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Audience {
    Adult,
    AdultsOnly,
    YoungAdult,
    Children,
}

impl Audience {
    /// Display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Adult => "Adult",
            Audience::AdultsOnly => "Adults Only",
            Audience::YoungAdult => "Young Adult",
            Audience::Children => "Children",
        }
    }

    /// Keyword stored in the index: the display name without spaces.
    pub fn index_term(self) -> &'static str {
        match self {
            Audience::Adult => "Adult",
            Audience::AdultsOnly => "AdultsOnly",
            Audience::YoungAdult => "YoungAdult",
            Audience::Children => "Children",
        }
    }
}

impl FromStr for Audience {
    type Err = FacetError;

    fn from_str(s: &str) -> Result<Self> {
        let folded: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let audience = match folded.as_str() {
            "adult" => Audience::Adult,
            "adultsonly" => Audience::AdultsOnly,
            "youngadult" => Audience::YoungAdult,
            "children" => Audience::Children,
            _ => {
                return Err(FacetError::UnknownValue {
                    facet: "audience",
                    value: s.to_string(),
                })
            }
        };
        Ok(audience)
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2- or 3-letter language code, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        let valid = (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic());
        if !valid {
            return Err(FacetError::InvalidLanguageCode {
                code: code.to_string(),
            });
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = FacetError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog identifier of a genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GenreId(pub u32);

/// Fiction tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FictionScope {
    Fiction,
    Nonfiction,
    #[default]
    Both,
}

/// Index keyword for the fiction field.
pub fn fiction_term(fiction: bool) -> &'static str {
    if fiction {
        "Fiction"
    } else {
        "Nonfiction"
    }
}

/// Inclusive target-age interval, `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AgeRange {
    lower: u32,
    upper: u32,
}

impl AgeRange {
    pub fn new(lower: u32, upper: u32) -> Result<Self> {
        if lower > upper {
            return Err(FacetError::InvalidAgeRange { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn single(age: u32) -> Self {
        Self {
            lower: age,
            upper: age,
        }
    }

    pub fn lower(&self) -> u32 {
        self.lower
    }

    pub fn upper(&self) -> u32 {
        self.upper
    }

    /// Bounds a document's `target_age` must satisfy to overlap this range:
    /// its upper end reaches `lower` and its lower end stays within `upper`.
    pub fn overlap_bounds(&self) -> [(&'static str, i64, RangeDirection); 2] {
        [
            (
                fields::TARGET_AGE_UPPER,
                i64::from(self.lower),
                RangeDirection::AtLeast,
            ),
            (
                fields::TARGET_AGE_LOWER,
                i64::from(self.upper),
                RangeDirection::AtMost,
            ),
        ]
    }

    /// Bounds a document's `target_age` must satisfy to lie inside this range.
    pub fn containment_bounds(&self) -> [(&'static str, i64, RangeDirection); 2] {
        [
            (
                fields::TARGET_AGE_LOWER,
                i64::from(self.lower),
                RangeDirection::AtLeast,
            ),
            (
                fields::TARGET_AGE_UPPER,
                i64::from(self.upper),
                RangeDirection::AtMost,
            ),
        ]
    }
}

/// Requested scope of one search.
///
/// Immutable once built; construct through [`FacetDescriptor::builder`].
/// The default descriptor places no restriction on anything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FacetDescriptor {
    media: BTreeSet<Medium>,
    languages: Option<BTreeSet<LanguageCode>>,
    exclude_languages: BTreeSet<LanguageCode>,
    fiction: FictionScope,
    audiences: BTreeSet<Audience>,
    age_range: Option<AgeRange>,
    genre_ids: BTreeSet<GenreId>,
    only_deliverable: bool,
}

impl FacetDescriptor {
    pub fn builder() -> FacetDescriptorBuilder {
        FacetDescriptorBuilder::default()
    }

    pub fn media(&self) -> &BTreeSet<Medium> {
        &self.media
    }

    /// `None` means any language.
    pub fn languages(&self) -> Option<&BTreeSet<LanguageCode>> {
        self.languages.as_ref()
    }

    pub fn exclude_languages(&self) -> &BTreeSet<LanguageCode> {
        &self.exclude_languages
    }

    pub fn fiction(&self) -> FictionScope {
        self.fiction
    }

    pub fn audiences(&self) -> &BTreeSet<Audience> {
        &self.audiences
    }

    pub fn age_range(&self) -> Option<AgeRange> {
        self.age_range
    }

    pub fn genre_ids(&self) -> &BTreeSet<GenreId> {
        &self.genre_ids
    }

    pub fn only_deliverable(&self) -> bool {
        self.only_deliverable
    }
}

/// Collects facet selections and validates them on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct FacetDescriptorBuilder {
    media: BTreeSet<Medium>,
    languages: Option<Vec<String>>,
    exclude_languages: Vec<String>,
    fiction: FictionScope,
    audiences: BTreeSet<Audience>,
    age_range: Option<(u32, u32)>,
    genre_ids: BTreeSet<GenreId>,
    only_deliverable: bool,
}

impl FacetDescriptorBuilder {
    pub fn medium(mut self, medium: Medium) -> Self {
        self.media.insert(medium);
        self
    }

    pub fn media(mut self, media: impl IntoIterator<Item = Medium>) -> Self {
        self.media.extend(media);
        self
    }

    /// Restrict to these languages. An empty list leaves languages
    /// unrestricted.
    pub fn languages<S: AsRef<str>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        let codes: Vec<String> = codes
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect();
        if !codes.is_empty() {
            self.languages.get_or_insert_with(Vec::new).extend(codes);
        }
        self
    }

    pub fn exclude_languages<S: AsRef<str>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.exclude_languages
            .extend(codes.into_iter().map(|c| c.as_ref().to_string()));
        self
    }

    pub fn fiction(mut self, fiction: FictionScope) -> Self {
        self.fiction = fiction;
        self
    }

    pub fn audience(mut self, audience: Audience) -> Self {
        self.audiences.insert(audience);
        self
    }

    pub fn audiences(mut self, audiences: impl IntoIterator<Item = Audience>) -> Self {
        self.audiences.extend(audiences);
        self
    }

    pub fn age_range(mut self, lower: u32, upper: u32) -> Self {
        self.age_range = Some((lower, upper));
        self
    }

    pub fn genre_ids(mut self, ids: impl IntoIterator<Item = GenreId>) -> Self {
        self.genre_ids.extend(ids);
        self
    }

    pub fn only_deliverable(mut self, only_deliverable: bool) -> Self {
        self.only_deliverable = only_deliverable;
        self
    }

    pub fn build(self) -> Result<FacetDescriptor> {
        let languages = self
            .languages
            .map(|codes| parse_codes(&codes))
            .transpose()?;
        let exclude_languages = parse_codes(&self.exclude_languages)?;

        if let Some(included) = &languages {
            if let Some(code) = included.intersection(&exclude_languages).next() {
                return Err(FacetError::ConflictingLanguage {
                    code: code.to_string(),
                });
            }
        }

        let age_range = self
            .age_range
            .map(|(lower, upper)| AgeRange::new(lower, upper))
            .transpose()?;

        Ok(FacetDescriptor {
            media: self.media,
            languages,
            exclude_languages,
            fiction: self.fiction,
            audiences: self.audiences,
            age_range,
            genre_ids: self.genre_ids,
            only_deliverable: self.only_deliverable,
        })
    }
}

fn parse_codes(codes: &[String]) -> Result<BTreeSet<LanguageCode>> {
    codes.iter().map(|c| LanguageCode::new(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unrestricted() {
        let facets = FacetDescriptor::default();
        assert!(facets.media().is_empty());
        assert!(facets.languages().is_none());
        assert!(facets.exclude_languages().is_empty());
        assert_eq!(facets.fiction(), FictionScope::Both);
        assert!(facets.age_range().is_none());
        assert!(!facets.only_deliverable());
    }

    #[test]
    fn test_builder_collects_selections() {
        let facets = FacetDescriptor::builder()
            .medium(Medium::Book)
            .languages(["ENG", "spa"])
            .audiences([Audience::YoungAdult, Audience::Children])
            .age_range(5, 10)
            .genre_ids([GenreId(3), GenreId(1)])
            .fiction(FictionScope::Fiction)
            .only_deliverable(true)
            .build()
            .unwrap();

        let languages: Vec<&str> = facets.languages().unwrap().iter().map(|l| l.as_str()).collect();
        assert_eq!(languages, vec!["eng", "spa"]);
        assert_eq!(facets.age_range(), Some(AgeRange::new(5, 10).unwrap()));
        assert_eq!(
            facets.genre_ids().iter().copied().collect::<Vec<_>>(),
            vec![GenreId(1), GenreId(3)]
        );
        assert!(facets.only_deliverable());
    }

    #[test]
    fn test_empty_language_list_is_unrestricted() {
        let facets = FacetDescriptor::builder()
            .languages(Vec::<String>::new())
            .build()
            .unwrap();
        assert!(facets.languages().is_none());
        assert_eq!(facets, FacetDescriptor::default());

        let facets = FacetDescriptor::builder()
            .languages(["eng"])
            .languages(Vec::<&str>::new())
            .build()
            .unwrap();
        assert_eq!(facets.languages().map(|l| l.len()), Some(1));
    }

    #[test]
    fn test_inverted_age_range_rejected() {
        let err = FacetDescriptor::builder().age_range(10, 5).build().unwrap_err();
        assert_eq!(err, FacetError::InvalidAgeRange { lower: 10, upper: 5 });
    }

    #[test]
    fn test_conflicting_languages_rejected() {
        let err = FacetDescriptor::builder()
            .languages(["eng", "fre"])
            .exclude_languages(["ENG"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FacetError::ConflictingLanguage {
                code: "eng".to_string()
            }
        );
    }

    #[test]
    fn test_disjoint_include_exclude_allowed() {
        let facets = FacetDescriptor::builder()
            .languages(["eng"])
            .exclude_languages(["spa"])
            .build();
        assert!(facets.is_ok());
    }

    #[test]
    fn test_invalid_language_code_rejected() {
        for bad in ["", "e", "engl", "e1"] {
            let result = FacetDescriptor::builder().exclude_languages([bad]).build();
            assert!(
                matches!(result, Err(FacetError::InvalidLanguageCode { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("audio".parse::<Medium>().unwrap(), Medium::Audio);
        assert!("vinyl".parse::<Medium>().is_err());
        assert_eq!("Young Adult".parse::<Audience>().unwrap(), Audience::YoungAdult);
        assert_eq!("YoungAdult".parse::<Audience>().unwrap(), Audience::YoungAdult);
        assert_eq!(Audience::AdultsOnly.index_term(), "AdultsOnly");
    }

    #[test]
    fn test_language_code_serde() {
        let code: LanguageCode = serde_json::from_str("\"EN\"").unwrap();
        assert_eq!(code.as_str(), "en");
        assert!(serde_json::from_str::<LanguageCode>("\"english\"").is_err());
    }
}
