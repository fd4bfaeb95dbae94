use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_SNIPPET_LENGTH: usize = 90;
pub const ELLIPSIS: &str = "…";

/// Excerpt of at most `length` grapheme clusters.
///
/// Without an index the text is cut at the end. With an index the window is
/// centered on it, and an ellipsis marks each side that does not reach the
/// text boundary.
pub fn build_snippet(text: &str, index: Option<usize>, length: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let total = graphemes.len();

    let Some(index) = index else {
        if total <= length {
            return text.to_string();
        }
        let mut snippet = graphemes[..length].concat();
        snippet.push_str(ELLIPSIS);
        return snippet;
    };

    let start = index.saturating_sub(length / 2).min(total);
    let end = total.min(start.saturating_add(length));

    let mut snippet = String::with_capacity(text.len().min(length.saturating_mul(8)) + 2 * ELLIPSIS.len());
    if start > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(&graphemes[start..end].concat());
    if end < total {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

/// Excerpt centered on a byte range of `text`
pub fn snippet_around(text: &str, span: &Range<usize>, length: usize) -> String {
    build_snippet(text, Some(grapheme_index(text, span.start)), length)
}

/// Number of grapheme clusters before `byte_offset`
pub fn grapheme_index(text: &str, byte_offset: usize) -> usize {
    let end = byte_offset.min(text.len());
    text.get(..end)
        .map_or(0, |prefix| prefix.graphemes(true).count())
}

/// A text split around a matched span, for display code to wrap the match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

pub fn highlight<'a>(text: &'a str, span: &Range<usize>) -> Option<Highlight<'a>> {
    Some(Highlight {
        before: text.get(..span.start)?,
        matched: text.get(span.clone())?,
        after: text.get(span.end..)?,
    })
}
