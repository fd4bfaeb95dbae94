// Re-export main components
pub mod api;
pub mod corpus;
pub mod engine;
pub mod format;
pub mod normalize;
pub mod ranking;
pub mod snippet;

// Re-export commonly used types
pub use corpus::{Book, Corpus, CorpusError, CorpusStats, Surah, Verse};
pub use engine::{
    search, search_with_options, BookMatch, SearchEngine, SearchOptions, SearchResults, SurahMatch,
    VerseMatch,
};
pub use normalize::{normalize, NormalizedText};
pub use ranking::{BookField, SurahField, VerseMatchType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
