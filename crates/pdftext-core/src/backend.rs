use thiserror::Error;

use crate::{DocumentRef, EngineOptions, ExtractionResult};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to open PDF: {0}")]
    Open(String),
    #[error("password required or incorrect")]
    Password,
    #[error("invalid or corrupt PDF: {0}")]
    Format(String),
    #[error("invalid page range")]
    PageRange,
}

/// Trait for PDF text extraction engines.
///
/// Implementors do the actual PDF work (opening, decryption, page text
/// layout); input validation, option translation, normalization and output
/// shaping live in [`crate::PdfExtractor`].
///
/// `options` is `None` when the caller supplied no meaningful engine option,
/// in which case the engine applies its own defaults (whole document, no
/// password).
pub trait PdfEngine: Send + Sync {
    /// Engine identifier for logging.
    fn name(&self) -> &str;

    /// Extract metadata and per-page text from a document.
    fn extract(
        &self,
        doc: &DocumentRef,
        options: Option<&EngineOptions>,
    ) -> Result<ExtractionResult, EngineError>;
}
