use crate::corpus::{Book, Corpus, CorpusError, Surah, Verse};
use crate::normalize::normalize;
use crate::ranking::{
    best_candidate, rank_matches, score_field, score_keyword_list, BookField, FieldMatch, Scored,
    SurahField, VerseMatchType,
};
use crate::snippet::{build_snippet, highlight, snippet_around, Highlight, DEFAULT_SNIPPET_LENGTH};
use serde::Serialize;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

/// Queries shorter than this (after normalization) do not scan the corpus
pub const MIN_QUERY_CHARS: usize = 2;

/// Search options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub surah_limit: usize,
    pub verse_limit: usize,
    pub book_limit: usize,
    pub snippet_length: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            surah_limit: 6,
            verse_limit: 8,
            book_limit: 6,
            snippet_length: DEFAULT_SNIPPET_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahMatch {
    pub id: u32,
    pub number: u32,
    pub name_arabic: String,
    pub name_kurdish: String,
    pub meaning_kurdish: String,
    pub name_translit: String,
    pub score: u32,
    pub match_field: SurahField,
}

impl SurahMatch {
    fn new(surah: &Surah, field: SurahField, score: u32) -> Self {
        Self {
            id: surah.id,
            number: surah.number,
            name_arabic: surah.name_arabic.clone(),
            name_kurdish: surah.name_kurdish.clone(),
            meaning_kurdish: surah.meaning_kurdish.clone(),
            name_translit: surah.name_translit.clone(),
            score,
            match_field: field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseMatch {
    pub surah_id: u32,
    pub surah_number: u32,
    pub surah_name_arabic: String,
    pub surah_name_kurdish: String,
    /// Position in the surah's verse list
    pub verse_index: usize,
    pub verse_number: u32,
    /// Excerpt centered on the match, cut from the field that matched
    /// (Arabic, Uthmani, translation or tafsir text). Keyword and tagline
    /// hits show the head of the verse's primary text instead.
    pub snippet: String,
    pub score: u32,
    pub match_type: VerseMatchType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMatch {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub score: u32,
    pub match_field: BookField,
    /// Character offset of the match in `match_text`
    pub match_index: usize,
    /// Byte range of the match in `match_text`
    pub match_span: Range<usize>,
    pub match_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl BookMatch {
    /// The matched field split around the match
    pub fn highlight(&self) -> Option<Highlight<'_>> {
        highlight(&self.match_text, &self.match_span)
    }
}

impl Scored for SurahMatch {
    fn score(&self) -> u32 {
        self.score
    }
}

impl Scored for VerseMatch {
    fn score(&self) -> u32 {
        self.score
    }
}

impl Scored for BookMatch {
    fn score(&self) -> u32 {
        self.score
    }
}

/// Search result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub surahs: Vec<SurahMatch>,
    pub verses: Vec<VerseMatch>,
    pub books: Vec<BookMatch>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.surahs.is_empty() && self.verses.is_empty() && self.books.is_empty()
    }

    pub fn total(&self) -> usize {
        self.surahs.len() + self.verses.len() + self.books.len()
    }
}

/// Search a corpus with the default limits
pub fn search(corpus: &Corpus, query: &str) -> SearchResults {
    search_with_options(corpus, query, &SearchOptions::default())
}

pub fn search_with_options(corpus: &Corpus, query: &str, options: &SearchOptions) -> SearchResults {
    let query = normalize(query);
    if query.chars().count() < MIN_QUERY_CHARS {
        return SearchResults::default();
    }

    let results = SearchResults {
        surahs: match_surahs(corpus, &query, options),
        verses: match_verses(corpus, &query, options),
        books: match_books(corpus, &query, options),
    };

    tracing::debug!(
        query = %query,
        surahs = results.surahs.len(),
        verses = results.verses.len(),
        books = results.books.len(),
        "Search completed"
    );

    results
}

fn match_surahs(corpus: &Corpus, query: &str, options: &SearchOptions) -> Vec<SurahMatch> {
    let matches = corpus
        .surahs
        .iter()
        .filter_map(|surah| {
            let (field, hit) = best_candidate(SurahField::ALL.map(|field| {
                let text = match field {
                    SurahField::NameArabic => &surah.name_arabic,
                    SurahField::NameKurdish => &surah.name_kurdish,
                    SurahField::MeaningKurdish => &surah.meaning_kurdish,
                    SurahField::NameTranslit => &surah.name_translit,
                };
                (field, score_field(text, query, field.base_score()))
            }))?;
            Some(SurahMatch::new(surah, field, hit.score))
        })
        .collect();

    rank_matches(matches, options.surah_limit)
}

fn score_verse<'a>(verse: &'a Verse, kind: VerseMatchType, query: &str) -> Option<FieldMatch<'a>> {
    let base = kind.base_score();
    match kind {
        VerseMatchType::Keyword => score_keyword_list(&verse.keywords, query, base),
        VerseMatchType::Tagline => score_keyword_list(&verse.taglines, query, base),
        VerseMatchType::Arabic => score_field(&verse.text_arabic, query, base),
        VerseMatchType::Uthmani => score_field(&verse.text_uthmani, query, base),
        VerseMatchType::Translation => score_field(&verse.text_kurdish, query, base),
        VerseMatchType::Tafsir => score_field(&verse.tafsir_kurdish, query, base),
    }
}

fn match_verses(corpus: &Corpus, query: &str, options: &SearchOptions) -> Vec<VerseMatch> {
    let mut matches = Vec::new();

    for surah in &corpus.surahs {
        for (index, verse) in surah.verses.iter().enumerate() {
            let Some((kind, hit)) =
                best_candidate(VerseMatchType::ALL.map(|kind| (kind, score_verse(verse, kind, query))))
            else {
                continue;
            };

            // tags are never shown, so fall back to the head of the verse itself
            let snippet = if kind.is_tag() {
                let text = match verse.primary_text() {
                    "" => hit.text,
                    primary => primary,
                };
                build_snippet(text, None, options.snippet_length)
            } else {
                snippet_around(hit.text, &hit.span, options.snippet_length)
            };

            matches.push(VerseMatch {
                surah_id: surah.id,
                surah_number: surah.number,
                surah_name_arabic: surah.name_arabic.clone(),
                surah_name_kurdish: surah.name_kurdish.clone(),
                verse_index: index,
                verse_number: verse.display_number(index),
                snippet,
                score: hit.score,
                match_type: kind,
            });
        }
    }

    rank_matches(matches, options.verse_limit)
}

fn match_books(corpus: &Corpus, query: &str, options: &SearchOptions) -> Vec<BookMatch> {
    let matches = corpus
        .tafsir_books
        .iter()
        .filter_map(|book| {
            let (field, hit) = best_candidate(BookField::ALL.map(|field| {
                let text = match field {
                    BookField::Title => &book.title,
                    BookField::Author => &book.author,
                    BookField::Description => &book.description,
                };
                (field, score_field(text, query, field.base_score()))
            }))?;
            Some(book_match(book, field, hit, options))
        })
        .collect();

    rank_matches(matches, options.book_limit)
}

fn book_match(book: &Book, field: BookField, hit: FieldMatch<'_>, options: &SearchOptions) -> BookMatch {
    let snippet = (field == BookField::Description)
        .then(|| snippet_around(hit.text, &hit.span, options.snippet_length));

    BookMatch {
        id: book.id.clone(),
        title: book.title.clone(),
        author: book.author.clone(),
        description: book.description.clone(),
        score: hit.score,
        match_field: field,
        match_index: hit.text[..hit.span.start].chars().count(),
        match_span: hit.span,
        match_text: hit.text.to_string(),
        snippet,
    }
}

/// Search engine over a shared, read-only corpus
#[derive(Debug, Clone)]
pub struct SearchEngine {
    corpus: Arc<Corpus>,
    options: SearchOptions,
}

impl SearchEngine {
    pub fn new(corpus: Corpus) -> Self {
        Self::with_options(corpus, SearchOptions::default())
    }

    pub fn with_options(corpus: impl Into<Arc<Corpus>>, options: SearchOptions) -> Self {
        Self {
            corpus: corpus.into(),
            options,
        }
    }

    /// Load the corpus bundle at `path`
    pub fn open<P: AsRef<Path>>(path: P, options: SearchOptions) -> Result<Self, CorpusError> {
        Ok(Self::with_options(Corpus::load(path)?, options))
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn search(&self, query: &str) -> SearchResults {
        search_with_options(&self.corpus, query, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn verse(number: u32, arabic: &str, kurdish: &str) -> Verse {
        Verse {
            number_in_surah: Some(number),
            text_arabic: arabic.to_string(),
            text_kurdish: kurdish.to_string(),
            ..Verse::default()
        }
    }

    fn sample_corpus() -> Corpus {
        let fatiha = Surah {
            meaning_kurdish: "دەستپێکەر".to_string(),
            name_translit: "Al-Fatiha".to_string(),
            ..Surah::new(1, 1, "الفاتحة", "الفاتحة")
        }
        .with_verse(verse(1, "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ", "بەناوی خوای بەخشندە و میهرەبان"))
        .with_verse(verse(2, "الْحَمْدُ لِلَّهِ رَبِّ الْعَالَمِينَ", "سوپاس بۆ خوا پەروەردگاری جیهانیان"));

        let asr = Surah::new(103, 103, "العصر", "عەسر").with_verse(Verse {
            keywords: vec!["صبر".to_string()],
            ..verse(3, "إِلَّا الَّذِينَ آمَنُوا وَتَوَاصَوْا بِالصَّبْرِ", "جگە لەوانەی باوەڕیان هێنا")
        });

        let books = vec![
            Book::new("1", "تەفسیری ئاسان", "مامۆستا هەژار", "تەفسیرێکی سادە بۆ خوێنەران"),
            Book::new("2", "تەفسیری نامی", "محمد", "شرحێکی تەواو"),
        ];

        Corpus::new(vec![fatiha, asr], books)
    }

    #[test]
    fn test_engine_search() {
        let engine = SearchEngine::new(sample_corpus());
        let results = engine.search("فاتح");

        assert_eq!(results.surahs.len(), 1);
        assert_eq!(results.surahs[0].id, 1);
        // Kurdish name outweighs the identical Arabic name
        assert_eq!(results.surahs[0].match_field, SurahField::NameKurdish);
        assert_eq!(results.surahs[0].score, 70 + 40 + 38);
        assert!(results.verses.is_empty());
        assert!(results.books.is_empty());
        assert_eq!(results.total(), 1);
    }

    #[test]
    fn test_short_queries_are_empty() {
        let corpus = sample_corpus();
        for query in ["", " ", "ا", "  ب  ", "\u{064E}\u{0650}", "\u{0640}\u{0640}\u{0640}"] {
            assert!(search(&corpus, query).is_empty(), "query {query:?}");
        }
    }

    #[test]
    fn test_keyword_match_snippet_uses_verse_head() {
        let results = search(&sample_corpus(), "صبر");

        assert_eq!(results.verses.len(), 1);
        let hit = &results.verses[0];
        assert_eq!(hit.match_type, VerseMatchType::Keyword);
        assert_eq!(hit.surah_id, 103);
        assert_eq!(hit.verse_index, 0);
        assert_eq!(hit.verse_number, 3);
        assert_eq!(hit.score, 90 + 100 + 40);
        assert_eq!(hit.snippet, "إِلَّا الَّذِينَ آمَنُوا وَتَوَاصَوْا بِالصَّبْرِ");
    }

    #[test]
    fn test_translation_snippet_centers_on_match() {
        let results = search(&sample_corpus(), "پەروەردگار");

        assert_eq!(results.verses.len(), 1);
        let hit = &results.verses[0];
        assert_eq!(hit.match_type, VerseMatchType::Translation);
        assert_eq!(hit.verse_number, 2);
        assert!(hit.snippet.contains("پەروەردگاری"));
    }

    #[test]
    fn test_tagline_snippet_is_verse_head() {
        let head = "بِسْمِ ".repeat(30);
        let surah = Surah::new(40, 2, "البقرة", "بەقەرە").with_verse(Verse {
            number_in_surah: Some(153),
            text_uthmani: head.clone(),
            taglines: vec!["ئارامگرتن".to_string()],
            ..Verse::default()
        });
        let results = search(&Corpus::new(vec![surah], vec![]), "ئارامگرتن");

        assert_eq!(results.verses.len(), 1);
        let hit = &results.verses[0];
        assert_eq!(hit.match_type, VerseMatchType::Tagline);
        assert_eq!(hit.score, 85 + 100 + 40);
        assert_eq!(hit.snippet, build_snippet(&head, None, DEFAULT_SNIPPET_LENGTH));
        assert!(hit.snippet.ends_with(crate::snippet::ELLIPSIS));
        // references use the surah number, not its id
        assert_eq!((hit.surah_id, hit.surah_number, hit.verse_number), (40, 2, 153));
    }

    #[test]
    fn test_tafsir_snippet_centers_on_match() {
        let tafsir = format!("{}شیکردنەوە{}", "پێشەکی ".repeat(30), " کۆتایی".repeat(30));
        let surah = Surah::new(1, 1, "", "").with_verse(Verse {
            text_arabic: "الم".to_string(),
            tafsir_kurdish: tafsir,
            ..Verse::default()
        });
        let results = search(&Corpus::new(vec![surah], vec![]), "شیکردنەوە");

        let hit = &results.verses[0];
        assert_eq!(hit.match_type, VerseMatchType::Tafsir);
        assert_eq!(hit.score, 50 + 40);
        assert!(hit.snippet.starts_with(crate::snippet::ELLIPSIS));
        assert!(hit.snippet.ends_with(crate::snippet::ELLIPSIS));
        assert!(hit.snippet.contains("شیکردنەوە"));
    }

    #[test]
    fn test_surah_secondary_fields() {
        let results = search(&sample_corpus(), "Fatiha");
        assert_eq!(results.surahs.len(), 1);
        assert_eq!(results.surahs[0].match_field, SurahField::NameTranslit);
        assert_eq!(results.surahs[0].score, 35 + 40 + 37);

        let results = search(&sample_corpus(), "دەستپێک");
        assert_eq!(results.surahs[0].match_field, SurahField::MeaningKurdish);
        assert_eq!(results.surahs[0].score, 45 + 70 + 40);
    }

    #[test]
    fn test_author_match_has_no_snippet() {
        let results = search(&sample_corpus(), "هەژار");

        assert_eq!(results.books.len(), 1);
        let book = &results.books[0];
        assert_eq!(book.id, "1");
        assert_eq!(book.match_field, BookField::Author);
        assert_eq!(book.match_text, "مامۆستا هەژار");
        assert_eq!(book.match_index, 8);
        assert_eq!(book.score, 55 + 40 + 32);
        assert!(book.snippet.is_none());
    }

    #[test]
    fn test_book_fields() {
        let results = search(&sample_corpus(), "تەفسیر");
        assert_eq!(results.books.len(), 2);

        for book in &results.books {
            assert_eq!(book.match_field, BookField::Title);
            assert_eq!(book.match_index, 0);
            assert!(book.snippet.is_none());
        }
        // both are prefix matches at 0; corpus order is kept
        assert_eq!(results.books[0].id, "1");
        assert_eq!(results.books[1].id, "2");

        let results = search(&sample_corpus(), "سادە");
        let book = &results.books[0];
        assert_eq!(book.match_field, BookField::Description);
        assert_eq!(book.snippet.as_deref(), Some("تەفسیرێکی سادە بۆ خوێنەران"));
        assert_eq!(book.highlight().map(|h| h.matched), Some("سادە"));
        assert_eq!(book.match_index, 10);
    }

    #[test]
    fn test_custom_limits() {
        let options = SearchOptions {
            book_limit: 1,
            ..SearchOptions::default()
        };
        let engine = SearchEngine::with_options(sample_corpus(), options);
        assert_eq!(engine.search("تەفسیر").books.len(), 1);
        assert_eq!(engine.options().book_limit, 1);
    }

    #[test]
    fn test_search_results_serialize_with_bundle_keys() -> anyhow::Result<()> {
        let results = search(&sample_corpus(), "صبر");
        let json = serde_json::to_value(&results)?;
        assert_eq!(json["verses"][0]["matchType"], "keyword");
        assert_eq!(json["verses"][0]["surahId"], 103);
        assert_eq!(json["verses"][0]["surahNumber"], 103);
        assert!(json["surahs"].as_array().map_or(false, |a| a.is_empty()));
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_results_are_ranked_and_bounded(query in "[ابتسرلمنهوي ]{0,6}") {
            let results = search(&sample_corpus(), &query);

            prop_assert!(results.surahs.len() <= 6);
            prop_assert!(results.verses.len() <= 8);
            prop_assert!(results.books.len() <= 6);
            prop_assert!(results.surahs.windows(2).all(|w| w[0].score >= w[1].score));
            prop_assert!(results.verses.windows(2).all(|w| w[0].score >= w[1].score));
            prop_assert!(results.books.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }
}
