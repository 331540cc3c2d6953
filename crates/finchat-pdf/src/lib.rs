//! Finchat Text Extraction
//!
//! Implementations of the `TextExtractor` trait from `finchat-domain`.
//!
//! - `PdfExtractor`: page text of a PDF document, in page order (lopdf)
//! - `PlainTextExtractor`: UTF-8 text files, decoded lossily
//! - `ConfiguredExtractor`: runtime choice between the two

#![warn(missing_docs)]

use finchat_domain::TextExtractor;
use lopdf::Document;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while extracting text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfError {
    /// The bytes are not a readable PDF document
    #[error("Failed to load PDF: {0}")]
    Load(String),

    /// The document is encrypted and cannot be read without a password
    #[error("PDF is encrypted")]
    Encrypted,
}

/// Extracts the text of every page of a PDF document
///
/// Pages are visited in document order and their text is concatenated. A page
/// whose content stream cannot be decoded contributes nothing; the remaining
/// pages are still returned.
///
/// # Examples
///
/// ```
/// use finchat_domain::TextExtractor;
/// use finchat_pdf::{PdfError, PdfExtractor};
///
/// let result = PdfExtractor::new().extract(b"not a pdf");
/// assert!(matches!(result, Err(PdfError::Load(_))));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create an extractor
    pub fn new() -> Self {
        Self
    }

    /// Text of each page, in page order
    pub fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>, PdfError> {
        let mut doc = Document::load_mem(bytes).map_err(|e| PdfError::Load(e.to_string()))?;
        if doc.is_encrypted() {
            // Owner-password-only documents open with the empty user password
            if let Err(e) = doc.decrypt("") {
                debug!("Empty-password decryption failed: {}", e);
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted document with the empty user password");
        }

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!("Skipping unreadable page {}: {}", page_number, e);
                    texts.push(String::new());
                }
            }
        }

        debug!("Extracted {} pages", texts.len());
        Ok(texts)
    }
}

impl TextExtractor for PdfExtractor {
    type Error = PdfError;

    fn extract(&self, bytes: &[u8]) -> Result<String, Self::Error> {
        Ok(self.extract_pages(bytes)?.concat())
    }
}

/// Treats documents as UTF-8 text; invalid sequences become U+FFFD
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    type Error = PdfError;

    fn extract(&self, bytes: &[u8]) -> Result<String, Self::Error> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Extractor selected at runtime from configuration
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredExtractor {
    /// PDF documents
    Pdf(PdfExtractor),
    /// Plain text documents
    Text(PlainTextExtractor),
}

impl TextExtractor for ConfiguredExtractor {
    type Error = PdfError;

    fn extract(&self, bytes: &[u8]) -> Result<String, Self::Error> {
        match self {
            ConfiguredExtractor::Pdf(extractor) => extractor.extract(bytes),
            ConfiguredExtractor::Text(extractor) => extractor.extract(bytes),
        }
    }
}
