//! Uploaded documents and the text extraction adapter.
//!
//! A [`Document`] is the ordered list of pages recovered from an upload. Text
//! is pulled out through the [`TextExtractor`] trait; [`PdfExtractor`] is the
//! `lopdf` backed implementation used by the application.

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("the upload is empty")]
    EmptyInput,
    #[error("unable to parse PDF: {0}")]
    Malformed(#[source] lopdf::Error),
    #[error("the PDF is encrypted")]
    Encrypted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    text: String,
}

impl Page {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Builds a document from raw page strings, mostly useful for tests and
    /// alternative extractors.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(Page::new).collect())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Joins the non-empty pages in `range` with newlines.
    ///
    /// `range` is 0-based and half-open; callers validate it first.
    pub fn text_of(&self, range: std::ops::Range<usize>) -> String {
        self.pages[range]
            .iter()
            .filter(|page| !page.is_empty())
            .map(Page::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn full_text(&self) -> String {
        self.text_of(0..self.pages.len())
    }
}

/// Turns uploaded bytes into a [`Document`].
pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Document, ExtractionError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Document, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let pdf = lopdf::Document::load_mem(bytes).map_err(ExtractionError::Malformed)?;
        if pdf.is_encrypted() {
            return Err(ExtractionError::Encrypted);
        }

        let pages: Vec<Page> = pdf
            .get_pages()
            .keys()
            .map(|&number| match pdf.extract_text(&[number]) {
                Ok(text) => Page::new(text.trim()),
                Err(err) => {
                    warn!("No text recovered from page {number}: {err}");
                    Page::default()
                }
            })
            .collect();

        debug!(
            "{} of {} pages carry text",
            pages.iter().filter(|page| !page.is_empty()).count(),
            pages.len()
        );
        info!("PDF extracted with {} pages", pages.len());
        Ok(Document::new(pages))
    }
}
