//! Text canonicalization shared by queries and corpus fields.
//!
//! Arabic and Kurdish script encode the same letter in several visually
//! equivalent ways, so every comparison goes through [`normalize`]:
//!
//! 1. lowercase
//! 2. canonical decomposition (NFD, with combining marks reordered)
//! 3. strip Arabic harakat, superscript alef and Quranic annotation marks
//! 4. strip tatweel
//! 5. strip zero-width joiners and bidi controls
//! 6. fold alef/yeh/waw variants
//! 7. collapse whitespace and trim
//!
//! [`NormalizedText`] runs the same pipeline but remembers where each output
//! character came from, so a match found in normalized text can be mapped
//! back onto the original string.

use std::ops::Range;
use unicode_normalization::char::{canonical_combining_class, decompose_canonical};

/// Normalize a string for comparison
pub fn normalize(text: &str) -> String {
    NormalizedText::new(text).into_string()
}

/// Characters removed entirely before comparison
fn is_stripped(c: char) -> bool {
    matches!(c,
        '\u{064B}'..='\u{065F}' |  // fathatan .. wavy hamza below
        '\u{0670}' |               // superscript alef
        '\u{06D6}'..='\u{06ED}' |  // small high ligatures and Quranic marks
        '\u{0640}' |               // tatweel
        '\u{200C}'..='\u{200F}' |  // ZWNJ, ZWJ, LRM, RLM
        '\u{2066}'..='\u{2069}'    // directional isolates
    )
}

fn fold_variant(c: char) -> char {
    match c {
        'إ' | 'أ' | 'آ' => 'ا',
        'ى' | 'ئ' => 'ي',
        'ؤ' => 'و',
        _ => c,
    }
}

/// Stable sort of every run of combining marks by combining class
fn reorder_marks(chars: &mut [(char, usize)]) {
    let mut start = 0;
    while start < chars.len() {
        if canonical_combining_class(chars[start].0) == 0 {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < chars.len() && canonical_combining_class(chars[end].0) != 0 {
            end += 1;
        }
        chars[start..end].sort_by_key(|(c, _)| canonical_combining_class(*c));
        start = end;
    }
}

/// Normalized form of a string, plus the byte offset in the original for every
/// normalized character.
#[derive(Debug, Clone)]
pub struct NormalizedText<'a> {
    original: &'a str,
    text: String,
    origins: Vec<usize>,
}

impl<'a> NormalizedText<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut chars: Vec<(char, usize)> = Vec::with_capacity(original.len());
        let mut pending_space: Option<usize> = None;

        for (offset, c) in original.char_indices() {
            for lower in c.to_lowercase() {
                decompose_canonical(lower, |d| {
                    if is_stripped(d) {
                        return;
                    }
                    if d.is_whitespace() {
                        pending_space.get_or_insert(offset);
                        return;
                    }
                    if let Some(space) = pending_space.take() {
                        if !chars.is_empty() {
                            chars.push((' ', space));
                        }
                    }
                    chars.push((fold_variant(d), offset));
                });
            }
        }

        reorder_marks(&mut chars);

        let text = chars.iter().map(|(c, _)| *c).collect();
        let origins = chars.into_iter().map(|(_, offset)| offset).collect();

        Self {
            original,
            text,
            origins,
        }
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.origins.len()
    }

    /// Character index of the first occurrence of an already-normalized needle
    pub fn find(&self, needle: &str) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        self.text
            .find(needle)
            .map(|byte| self.text[..byte].chars().count())
    }

    /// Byte range of the original text covered by `len` normalized characters
    /// starting at character `start`.
    ///
    /// The range swallows marks and controls that were stripped after the last
    /// matched character, but never the whitespace that follows it.
    pub fn original_span(&self, start: usize, len: usize) -> Option<Range<usize>> {
        let end = start.checked_add(len)?;
        if len == 0 || end > self.origins.len() {
            return None;
        }

        let covered = &self.origins[start..end];
        let begin = covered.iter().copied().min()?;
        let last = covered.iter().copied().max()?;
        let last_end = last
            + self.original[last..]
                .chars()
                .next()
                .map_or(0, char::len_utf8);

        let stop = match self.origins.get(end) {
            Some(&next) => next,
            None => self.original.trim_end().len(),
        };

        Some(begin..stop.max(last_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_harakat_and_tatweel() {
        assert_eq!(normalize("بِسْمِ ٱللَّهِ"), "بسم ٱلله");
        assert_eq!(normalize("الرحـــمن"), "الرحمن");
        assert_eq!(normalize("ذَٰلِكَ"), "ذلك");
    }

    #[test]
    fn test_fold_letter_variants() {
        assert_eq!(normalize("أكتب"), "اكتب");
        assert_eq!(normalize("إيمان"), "ايمان");
        assert_eq!(normalize("آمن"), "امن");
        assert_eq!(normalize("موسى"), "موسي");
        assert_eq!(normalize("مؤمن"), "مومن");
        assert_eq!(normalize("سائل"), "سايل");
    }

    #[test]
    fn test_strip_bidi_controls() {
        assert_eq!(normalize("کورد\u{200C}ی"), "کوردی");
        assert_eq!(normalize("\u{2067}abc\u{2069}\u{200F}"), "abc");
    }

    #[test]
    fn test_lowercase_and_whitespace() {
        assert_eq!(normalize("  Al-Fatiha \t\n  Surah "), "al-fatiha surah");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_latin_marks_are_decomposed_not_stripped() {
        assert_eq!(normalize("É"), "e\u{0301}");
        // canonical reordering: dot below (220) before acute (230)
        assert_eq!(normalize("e\u{0301}\u{0323}"), "e\u{0323}\u{0301}");
    }

    #[test]
    fn test_find_returns_char_index() {
        let normalized = NormalizedText::new("قُلْ هُوَ ٱللَّهُ أَحَدٌ");
        assert_eq!(normalized.as_str(), "قل هو ٱلله احد");
        assert_eq!(normalized.find("هو"), Some(3));
        assert_eq!(normalized.find("احد"), Some(11));
        assert_eq!(normalized.find("صمد"), None);
        assert_eq!(normalized.find(""), None);
    }

    #[test]
    fn test_original_span_covers_diacritics() {
        let original = "قُلْ هُوَ ٱللَّهُ أَحَدٌ";
        let normalized = NormalizedText::new(original);

        let start = normalized.find("احد").unwrap();
        let span = normalized.original_span(start, 3).unwrap();
        assert_eq!(&original[span], "أَحَدٌ");

        let start = normalized.find("هو").unwrap();
        let span = normalized.original_span(start, 2).unwrap();
        assert_eq!(&original[span], "هُوَ");
    }

    #[test]
    fn test_original_span_excludes_trailing_whitespace() {
        let original = "  Surah   Al-Fatiha  ";
        let normalized = NormalizedText::new(original);

        let start = normalized.find("al-fatiha").unwrap();
        let span = normalized.original_span(start, 9).unwrap();
        assert_eq!(&original[span], "Al-Fatiha");

        let span = normalized.original_span(0, 5).unwrap();
        assert_eq!(&original[span], "Surah");
    }

    #[test]
    fn test_original_span_out_of_bounds() {
        let normalized = NormalizedText::new("abc");
        assert!(normalized.original_span(2, 2).is_none());
        assert!(normalized.original_span(0, 0).is_none());
    }

    #[test]
    fn test_expanded_characters_map_to_their_source() {
        let original = "xİy";
        let normalized = NormalizedText::new(original);
        assert_eq!(normalized.as_str(), "xi\u{0307}y");
        let span = normalized.original_span(1, 1).unwrap();
        assert_eq!(&original[span], "İ");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in "\\PC{0,40}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn prop_normalize_arabic_is_idempotent(
            text in "[\u{0621}-\u{065F}\u{0670}\u{06C0}-\u{06ED}\u{200C}-\u{200F} ]{0,40}"
        ) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn prop_origins_track_every_char(text in "\\PC{0,40}") {
            let normalized = NormalizedText::new(&text);
            prop_assert_eq!(normalized.char_len(), normalized.as_str().chars().count());
            for i in 0..normalized.char_len() {
                let span = normalized.original_span(i, 1).unwrap();
                prop_assert!(text.get(span).is_some());
            }
        }
    }
}
