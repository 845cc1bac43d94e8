//! Reading time and excerpts.

use crate::render::to_plain_text;

/// Average reading speed used for estimates.
pub const WORDS_PER_MINUTE: usize = 200;

/// Number of words in the rendered text of a markdown document.
#[must_use]
pub fn word_count(markdown: &str) -> usize {
    to_plain_text(markdown).split_whitespace().count()
}

/// Estimated minutes needed to read a markdown document. Never less than 1.
#[must_use]
pub fn reading_time_minutes(markdown: &str) -> i32 {
    let minutes = word_count(markdown).div_ceil(WORDS_PER_MINUTE).max(1);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

/// Plain-text excerpt of at most `max_chars` characters.
///
/// Cuts at the last word boundary that fits and appends an ellipsis when the
/// text was shortened.
#[must_use]
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let text = to_plain_text(markdown);
    if text.chars().count() <= max_chars {
        return text;
    }

    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_time_minimum() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes("just a few words"), 1);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let body = "word ".repeat(401);
        assert_eq!(word_count(&body), 401);
        assert_eq!(reading_time_minutes(&body), 3);
    }

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("Hello **world**", 50), "Hello world");
    }

    #[test]
    fn test_excerpt_cuts_on_word() {
        assert_eq!(excerpt("The quick brown fox jumps", 12), "The quick…");
    }

    #[test]
    fn test_excerpt_multibyte() {
        assert_eq!(excerpt("ñandú ñandú ñandú", 8), "ñandú…");
    }
}
