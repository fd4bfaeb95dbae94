use crate::normalize::NormalizedText;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Bonuses added on top of a field's base score
pub struct FieldScorer {
    whole: u32,
    prefix: u32,
    interior: u32,
    proximity_window: usize,
}

impl Default for FieldScorer {
    fn default() -> Self {
        Self {
            whole: 100,           // field equals the query
            prefix: 70,           // field starts with the query
            interior: 40,         // query found further in
            proximity_window: 40, // earlier matches earn up to this much
        }
    }
}

impl FieldScorer {
    pub fn new(whole: u32, prefix: u32, interior: u32, proximity_window: usize) -> Self {
        Self {
            whole,
            prefix,
            interior,
            proximity_window,
        }
    }

    /// Score one text field against an already-normalized query
    pub fn score<'a>(&self, text: &'a str, query: &str, base_score: u32) -> Option<FieldMatch<'a>> {
        if text.is_empty() {
            return None;
        }

        let normalized = NormalizedText::new(text);
        let index = normalized.find(query)?;

        let bonus = if normalized.as_str() == query {
            self.whole
        } else if index == 0 {
            self.prefix
        } else {
            self.interior
        };
        let proximity = self.proximity_window.saturating_sub(index) as u32;

        let span = normalized.original_span(index, query.chars().count())?;

        Some(FieldMatch {
            score: base_score + bonus + proximity,
            index,
            text,
            span,
        })
    }
}

/// A query hit inside one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch<'a> {
    pub score: u32,
    /// Character offset of the match in the normalized field
    pub index: usize,
    /// The field as stored in the corpus
    pub text: &'a str,
    /// Byte range of the match within `text`
    pub span: Range<usize>,
}

pub fn score_field<'a>(text: &'a str, query: &str, base_score: u32) -> Option<FieldMatch<'a>> {
    FieldScorer::default().score(text, query, base_score)
}

/// Best-scoring entry of a tag list; the earliest entry wins ties
pub fn score_keyword_list<'a>(
    values: &'a [String],
    query: &str,
    base_score: u32,
) -> Option<FieldMatch<'a>> {
    best_candidate(
        values
            .iter()
            .map(|value| ((), score_field(value, query, base_score))),
    )
    .map(|(_, hit)| hit)
}

/// Pick the highest-scoring matched candidate; earlier candidates win ties
pub fn best_candidate<'a, F>(
    candidates: impl IntoIterator<Item = (F, Option<FieldMatch<'a>>)>,
) -> Option<(F, FieldMatch<'a>)> {
    candidates
        .into_iter()
        .filter_map(|(field, hit)| hit.map(|hit| (field, hit)))
        .fold(None, |best: Option<(F, FieldMatch<'a>)>, (field, hit)| {
            if best.as_ref().map_or(true, |(_, current)| hit.score > current.score) {
                Some((field, hit))
            } else {
                best
            }
        })
}

/// Anything carrying a relevance score
pub trait Scored {
    fn score(&self) -> u32;
}

/// Sort by descending score, keeping corpus order among ties, then keep the top `limit`
pub fn rank_matches<T: Scored>(mut matches: Vec<T>, limit: usize) -> Vec<T> {
    matches.sort_by(|a, b| b.score().cmp(&a.score()));
    matches.truncate(limit);
    matches
}

/// Surah fields, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurahField {
    NameArabic,
    NameKurdish,
    MeaningKurdish,
    NameTranslit,
}

impl SurahField {
    pub const ALL: [SurahField; 4] = [
        SurahField::NameArabic,
        SurahField::NameKurdish,
        SurahField::MeaningKurdish,
        SurahField::NameTranslit,
    ];

    pub fn base_score(self) -> u32 {
        match self {
            SurahField::NameArabic => 60,
            SurahField::NameKurdish => 70,
            SurahField::MeaningKurdish => 45,
            SurahField::NameTranslit => 35,
        }
    }
}

/// Verse fields, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerseMatchType {
    Keyword,
    Tagline,
    Arabic,
    Uthmani,
    Translation,
    Tafsir,
}

impl VerseMatchType {
    pub const ALL: [VerseMatchType; 6] = [
        VerseMatchType::Keyword,
        VerseMatchType::Tagline,
        VerseMatchType::Arabic,
        VerseMatchType::Uthmani,
        VerseMatchType::Translation,
        VerseMatchType::Tafsir,
    ];

    /// Curated tags outrank incidental hits in prose
    pub fn base_score(self) -> u32 {
        match self {
            VerseMatchType::Keyword => 90,
            VerseMatchType::Tagline => 85,
            VerseMatchType::Arabic => 55,
            VerseMatchType::Uthmani => 60,
            VerseMatchType::Translation => 70,
            VerseMatchType::Tafsir => 50,
        }
    }

    /// Tag lists are not displayed, so their match position means nothing to a snippet
    pub fn is_tag(self) -> bool {
        matches!(self, VerseMatchType::Keyword | VerseMatchType::Tagline)
    }
}

/// Book fields, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookField {
    Title,
    Author,
    Description,
}

impl BookField {
    pub const ALL: [BookField; 3] = [BookField::Title, BookField::Author, BookField::Description];

    pub fn base_score(self) -> u32 {
        match self {
            BookField::Title => 75,
            BookField::Author => 55,
            BookField::Description => 35,
        }
    }
}
