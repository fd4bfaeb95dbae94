use flate2::read::GzDecoder;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a corpus bundle
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to open corpus file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse corpus data")]
    Json(#[from] serde_json::Error),
}

/// A single verse (ayah) with its translation and commentary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    #[serde(default)]
    pub number_in_surah: Option<u32>,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_arabic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_uthmani: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_kurdish: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tafsir_kurdish: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub taglines: Vec<String>,
}

impl Verse {
    /// Number shown to readers; falls back to the position in the surah
    pub fn display_number(&self, index: usize) -> u32 {
        self.number_in_surah
            .or(self.number)
            .unwrap_or_else(|| u32::try_from(index + 1).unwrap_or(u32::MAX))
    }

    /// Text used when the verse is listed: Uthmani script, else plain Arabic, else translation
    pub fn primary_text(&self) -> &str {
        [&self.text_uthmani, &self.text_arabic, &self.text_kurdish]
            .into_iter()
            .find(|text| !text.is_empty())
            .map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surah {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_arabic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_kurdish: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meaning_kurdish: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_translit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revelation_type: String,
    #[serde(default)]
    pub verse_count: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_lessons: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verses: Vec<Verse>,
}

impl Surah {
    pub fn new(id: u32, number: u32, name_arabic: &str, name_kurdish: &str) -> Self {
        Self {
            id,
            number,
            name_arabic: name_arabic.to_string(),
            name_kurdish: name_kurdish.to_string(),
            ..Self::default()
        }
    }

    pub fn with_verse(mut self, verse: Verse) -> Self {
        self.verses.push(verse);
        self
    }
}

/// A tafsir book reviewed in the collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub highlights: Vec<String>,
}

impl Book {
    pub fn new(id: &str, title: &str, author: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            description: description.to_string(),
            highlights: Vec::new(),
        }
    }
}

/// The in-memory content bundle searched by the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corpus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub surahs: Vec<Surah>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tafsir_books: Vec<Book>,
}

impl Corpus {
    pub fn new(surahs: Vec<Surah>, tafsir_books: Vec<Book>) -> Self {
        Self {
            surahs,
            tafsir_books,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CorpusError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CorpusError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load a JSON bundle from disk, gunzipping `.gz` files
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let corpus = if path.extension().map_or(false, |ext| ext == "gz") {
            Self::from_reader(GzDecoder::new(reader))?
        } else {
            Self::from_reader(reader)?
        };

        let stats = corpus.stats();
        tracing::info!(
            path = %path.display(),
            surahs = stats.surahs,
            verses = stats.verses,
            books = stats.books,
            "Loaded corpus"
        );

        Ok(corpus)
    }

    pub fn get_surah(&self, id: u32) -> Option<&Surah> {
        self.surahs.iter().find(|s| s.id == id)
    }

    pub fn get_book(&self, id: &str) -> Option<&Book> {
        self.tafsir_books.iter().find(|b| b.id == id)
    }

    /// Surahs numbered within `start..=end`, ordered by number
    pub fn surahs_range(&self, start: u32, end: u32) -> Vec<&Surah> {
        let mut surahs: Vec<&Surah> = self
            .surahs
            .iter()
            .filter(|s| s.number >= start && s.number <= end)
            .collect();
        surahs.sort_by_key(|s| s.number);
        surahs
    }

    pub fn surahs_with_lessons(&self) -> Vec<&Surah> {
        self.surahs
            .iter()
            .filter(|s| s.has_lessons && !s.verses.is_empty())
            .collect()
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            surahs: self.surahs.len(),
            verses: self.surahs.iter().map(|s| s.verses.len()).sum(),
            books: self.tafsir_books.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub surahs: usize,
    pub verses: usize,
    pub books: usize,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<Option<String>>),
}

/// Tag lists show up both as a bare string and as an array in the data bundle
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values.into_iter().flatten().collect(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => String::new(),
        Some(StringOrNumber::String(value)) => value,
        Some(StringOrNumber::Number(value)) => value.to_string(),
    })
}
