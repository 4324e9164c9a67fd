use serde::Serialize;

/// Average narration speed used for the duration estimate.
pub const WORDS_PER_MINUTE: usize = 150;

/// Above this many words the preview recommends splitting the text.
pub const LARGE_TEXT_WORDS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextMetrics {
    pub word_count: usize,
    pub estimated_minutes: usize,
}

impl TextMetrics {
    pub fn of(text: &str) -> Self {
        let word_count = text.split_whitespace().count();
        Self {
            word_count,
            estimated_minutes: word_count.div_ceil(WORDS_PER_MINUTE),
        }
    }

    pub fn is_large(&self) -> bool {
        self.word_count > LARGE_TEXT_WORDS
    }

    pub fn summary(&self) -> String {
        format!(
            "Words: {} | Estimated audio length: {} min",
            self.word_count, self.estimated_minutes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize) -> String {
        vec!["palabra"; count].join(" ")
    }

    #[test]
    fn counts_whitespace_delimited_tokens() {
        assert_eq!(TextMetrics::of("uno dos\ttres\n\ncuatro").word_count, 4);
        assert_eq!(TextMetrics::of("   ").word_count, 0);
    }

    #[test]
    fn surrounding_whitespace_does_not_change_count() {
        let base = TextMetrics::of("hello brave new world");
        let padded = TextMetrics::of("\n\t  hello brave new world   \n");
        assert_eq!(base, padded);
    }

    #[test]
    fn rounds_minutes_up() {
        assert_eq!(TextMetrics::of("").estimated_minutes, 0);
        assert_eq!(TextMetrics::of(&words(1)).estimated_minutes, 1);
        assert_eq!(TextMetrics::of(&words(150)).estimated_minutes, 1);
        assert_eq!(TextMetrics::of(&words(151)).estimated_minutes, 2);
    }

    #[test]
    fn flags_large_text_only_above_threshold() {
        assert!(TextMetrics::of(&words(12_000)).is_large());
        assert!(!TextMetrics::of(&words(9_999)).is_large());
        assert!(!TextMetrics::of(&words(10_000)).is_large());
    }

    #[test]
    fn summary_matches_preview_format() {
        let metrics = TextMetrics::of(&words(300));
        assert_eq!(metrics.summary(), "Words: 300 | Estimated audio length: 2 min");
    }
}
