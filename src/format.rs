//! Display helpers for Kurdish readers.

const KURDISH_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

/// Replace ASCII digits with Arabic-Indic digits
pub fn to_kurdish_number(value: impl ToString) -> String {
    value
        .to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => KURDISH_DIGITS[d as usize],
            _ => c,
        })
        .collect()
}

/// Replace Arabic-Indic digits with ASCII digits
pub fn from_kurdish_number(text: &str) -> String {
    text.chars()
        .map(|c| match KURDISH_DIGITS.iter().position(|&d| d == c) {
            Some(d) => char::from(b'0' + d as u8),
            None => c,
        })
        .collect()
}

/// `surah:verse` in Kurdish digits
pub fn format_verse_ref(surah_number: u32, verse_number: u32) -> String {
    format!(
        "{}:{}",
        to_kurdish_number(surah_number),
        to_kurdish_number(verse_number)
    )
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", text[..cut].trim()),
        None => text.to_string(),
    }
}
