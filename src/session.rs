//! Per-user session context.
//!
//! Everything a user can change between actions lives in [`Session`]: the
//! uploaded document, the editable working text and the voice/speed
//! selectors. Clearing the session is `Session::default()`.

use serde::Serialize;
use thiserror::Error;

use crate::{
    document::Document,
    speech::{ConversionRequest, Speed, VoiceChoice},
};

/// Characters of the full text copied into an empty preview.
pub const PREVIEW_CHARS: usize = 2000;
const ELLIPSIS: &str = "...";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Upload a document before selecting pages")]
    NoDocument,
    #[error("The document has no pages")]
    NoPages,
    /// Carries the clamped 1-based bounds that were rejected.
    #[error("Start must be less than End")]
    Inverted { first: usize, last: usize },
}

/// 0-based half-open page range, always within the document it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    start: usize,
    end: usize,
}

impl Selection {
    /// Builds a selection from the 1-based inclusive bounds shown to users.
    /// Each bound is clamped to the document before validation.
    pub fn from_inclusive(start: usize, end: usize, page_count: usize) -> Result<Self, RangeError> {
        if page_count == 0 {
            return Err(RangeError::NoPages);
        }
        let first = start.clamp(1, page_count);
        let last = end.clamp(1, page_count);
        if first > last {
            return Err(RangeError::Inverted { first, last });
        }
        Ok(Self {
            start: first - 1,
            end: last,
        })
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    pub fn first_page(&self) -> usize {
        self.start + 1
    }

    pub fn last_page(&self) -> usize {
        self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub document: Option<Document>,
    pub working_text: String,
    pub voice: VoiceChoice,
    pub speed: Speed,
}

impl Session {
    pub fn page_count(&self) -> usize {
        self.document.as_ref().map_or(0, Document::page_count)
    }

    /// Full extracted text, or empty when nothing was uploaded.
    pub fn full_text(&self) -> String {
        self.document
            .as_ref()
            .map(Document::full_text)
            .unwrap_or_default()
    }

    /// Replaces the working text with the pages of `start..=end` (1-based).
    /// On error the working text is left untouched.
    pub fn select_pages(&mut self, start: usize, end: usize) -> Result<Selection, RangeError> {
        let document = self.document.as_ref().ok_or(RangeError::NoDocument)?;
        let selection = Selection::from_inclusive(start, end, document.page_count())?;
        self.working_text = document.text_of(selection.range());
        Ok(selection)
    }

    /// Fills an empty working text from the start of the document.
    pub fn seed_preview(&mut self) {
        if self.working_text.is_empty() {
            self.working_text = preview_of(&self.full_text());
        }
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        self.working_text = text.into();
    }

    pub fn reset_preview(&mut self) {
        self.working_text.clear();
    }

    pub fn preview_request(&self) -> ConversionRequest {
        self.request_for(self.working_text.clone())
    }

    pub fn full_request(&self) -> ConversionRequest {
        self.request_for(self.full_text())
    }

    fn request_for(&self, text: String) -> ConversionRequest {
        ConversionRequest {
            text,
            voice: self.voice,
            speed: self.speed,
        }
    }
}

fn preview_of(full_text: &str) -> String {
    match full_text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &full_text[..cut]),
        None => full_text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_pages() -> Document {
        Document::from_texts((1..=10).map(|n| format!("page {n}")))
    }

    fn session_with(document: Document) -> Session {
        Session {
            document: Some(document),
            ..Session::default()
        }
    }

    #[test]
    fn selects_inclusive_page_range() {
        let mut session = session_with(ten_pages());
        let selection = session.select_pages(3, 5).unwrap();
        assert_eq!(session.working_text, "page 3\npage 4\npage 5");
        assert_eq!((selection.first_page(), selection.last_page()), (3, 5));
    }

    #[test]
    fn every_valid_range_joins_its_pages() {
        let document = ten_pages();
        for start in 1..=10 {
            for end in start..=10 {
                let mut session = session_with(document.clone());
                session.select_pages(start, end).unwrap();
                let expected: Vec<String> = (start..=end).map(|n| format!("page {n}")).collect();
                assert_eq!(session.working_text, expected.join("\n"));
            }
        }
    }

    #[test]
    fn single_page_selection_is_allowed() {
        let mut session = session_with(ten_pages());
        session.select_pages(4, 4).unwrap();
        assert_eq!(session.working_text, "page 4");
    }

    #[test]
    fn inverted_range_leaves_text_untouched() {
        let mut session = session_with(ten_pages());
        session.edit("my notes");
        for (start, end) in [(5, 3), (10, 1), (2, 1)] {
            let err = session.select_pages(start, end).unwrap_err();
            assert_eq!(err, RangeError::Inverted { first: start, last: end });
            assert_eq!(session.working_text, "my notes");
        }
        let err = session.select_pages(40, 7).unwrap_err();
        assert_eq!(err, RangeError::Inverted { first: 10, last: 7 });
    }

    #[test]
    fn bounds_are_clamped_to_document() {
        let mut session = session_with(ten_pages());
        let selection = session.select_pages(0, 99).unwrap();
        assert_eq!(selection.range(), 0..10);
        assert!(session.working_text.ends_with("page 10"));
    }

    #[test]
    fn empty_pages_are_skipped_in_selection() {
        let mut session = session_with(Document::from_texts(["a", "", "c"]));
        session.select_pages(1, 3).unwrap();
        assert_eq!(session.working_text, "a\nc");
    }

    #[test]
    fn selection_requires_pages() {
        let mut session = Session::default();
        assert_eq!(session.select_pages(1, 2), Err(RangeError::NoDocument));

        let mut session = session_with(Document::default());
        assert_eq!(session.select_pages(1, 1), Err(RangeError::NoPages));
    }

    #[test]
    fn seeds_short_text_verbatim() {
        let mut session = session_with(Document::from_texts(["hello", "world"]));
        session.seed_preview();
        assert_eq!(session.working_text, "hello\nworld");
    }

    #[test]
    fn seeds_long_text_truncated_with_ellipsis() {
        let long = "é".repeat(PREVIEW_CHARS + 5);
        let mut session = session_with(Document::from_texts([long]));
        session.seed_preview();
        assert_eq!(session.working_text.chars().count(), PREVIEW_CHARS + 3);
        assert!(session.working_text.ends_with("..."));
    }

    #[test]
    fn exactly_preview_sized_text_has_no_ellipsis() {
        let exact = "a".repeat(PREVIEW_CHARS);
        let mut session = session_with(Document::from_texts([exact.clone()]));
        session.seed_preview();
        assert_eq!(session.working_text, exact);
    }

    #[test]
    fn seeding_keeps_existing_edits() {
        let mut session = session_with(ten_pages());
        session.edit("custom");
        session.seed_preview();
        assert_eq!(session.working_text, "custom");

        session.reset_preview();
        session.seed_preview();
        assert!(session.working_text.starts_with("page 1"));
    }

    #[test]
    fn requests_carry_selectors() {
        let mut session = session_with(ten_pages());
        session.voice = VoiceChoice::Female;
        session.speed = Speed::Turbo;
        session.edit("just this");

        let preview = session.preview_request();
        assert_eq!(preview.text, "just this");
        assert_eq!(preview.voice, VoiceChoice::Female);
        assert_eq!(preview.speed, Speed::Turbo);
        assert!(session.full_request().text.contains("page 10"));
    }
}
