//! Text extraction: PDF bytes → ordered page text via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is blocking and keeps
//! thread-local state. Loading and walking the document happens on Tokio's
//! blocking pool so the async workers stay free for the network call.
//!
//! ## Layout rules
//!
//! Each page's text segments are joined with a single space and every page is
//! terminated by a newline. No re-flow, hyphenation repair or column
//! detection is attempted: the model copes with ragged text well enough, and
//! the source is truncated to a small budget anyway.

use crate::config::QuizConfig;
use crate::error::QuizError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Text of a document, one entry per page, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pages: Vec<String>,
    max_chars: usize,
}

impl ExtractedDocument {
    /// Assemble a document from per-page text items.
    ///
    /// Items on a page are joined with one space; the outer order is page
    /// order and is kept as given.
    pub fn from_pages<P, I, S>(pages: P, max_chars: usize) -> Self
    where
        P: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = pages
            .into_iter()
            .map(|items| {
                items
                    .into_iter()
                    .map(|s| s.as_ref().to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        Self { pages, max_chars }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// The untruncated concatenation: every page followed by `\n`.
    pub fn full_text(&self) -> String {
        let mut text = String::with_capacity(self.pages.iter().map(|p| p.len() + 1).sum());
        for page in &self.pages {
            text.push_str(page);
            text.push('\n');
        }
        text
    }

    /// [`Self::full_text`] cut to the first `max_chars` characters.
    pub fn truncated_text(&self) -> String {
        truncate_chars(&self.full_text(), self.max_chars).to_string()
    }

    /// Whether [`Self::truncated_text`] drops anything.
    pub fn is_truncated(&self) -> bool {
        self.full_text().chars().count() > self.max_chars
    }
}

/// Longest prefix of `s` holding at most `max_chars` characters.
///
/// Counts `char`s, so a multi-byte character is either kept whole or dropped.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Reads page text out of PDF bytes.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    max_chars: usize,
    password: Option<String>,
    pdfium_lib_path: Option<PathBuf>,
}

impl TextExtractor {
    pub fn new(config: &QuizConfig) -> Self {
        Self {
            max_chars: config.max_chars,
            password: config.password.clone(),
            pdfium_lib_path: config.pdfium_lib_path.clone(),
        }
    }

    /// Extract every page's text from `bytes`.
    ///
    /// Runs inside `spawn_blocking` since pdfium calls block.
    pub async fn extract(&self, bytes: Vec<u8>) -> Result<ExtractedDocument, QuizError> {
        let extractor = self.clone();
        tokio::task::spawn_blocking(move || extractor.extract_blocking(&bytes))
            .await
            .map_err(|e| QuizError::Internal(format!("Extraction task panicked: {}", e)))?
    }

    /// Blocking implementation of [`Self::extract`].
    pub fn extract_blocking(&self, bytes: &[u8]) -> Result<ExtractedDocument, QuizError> {
        let pdfium = bind_pdfium(self.pdfium_lib_path.as_deref())?;
        let password = self.password.as_deref();

        let document = pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    if password.is_some() {
                        QuizError::WrongPassword
                    } else {
                        QuizError::PasswordRequired
                    }
                } else {
                    QuizError::DocumentParse { detail: err_str }
                }
            })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        if total_pages == 0 {
            return Err(QuizError::EmptyDocument);
        }
        info!("PDF loaded: {} pages", total_pages);

        let mut page_items: Vec<Vec<String>> = Vec::with_capacity(total_pages);
        for (idx, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| QuizError::DocumentParse {
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;

            let items: Vec<String> = text.segments().iter().map(|seg| seg.text()).collect();
            debug!(
                "Page {}: {} text items, {} chars",
                idx + 1,
                items.len(),
                items.iter().map(|s| s.chars().count()).sum::<usize>()
            );
            page_items.push(items);
        }

        let doc = ExtractedDocument::from_pages(page_items, self.max_chars);
        if doc.is_truncated() {
            info!(
                "Extracted text truncated to {} chars ({} pages)",
                self.max_chars, total_pages
            );
        }
        Ok(doc)
    }
}

/// Bind to pdfium: an explicit library path wins, then a copy next to the
/// working directory, then the system library search path.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, QuizError> {
    let bindings = match lib_path {
        Some(path) => Pdfium::bind_to_library(path)
            .map_err(|e| QuizError::PdfiumBindingFailed(format!("{}: {:?}", path.display(), e)))?,
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| QuizError::PdfiumBindingFailed(format!("{:?}", e)))?,
    };
    Ok(Pdfium::new(bindings))
}
