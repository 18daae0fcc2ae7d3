use std::ops::RangeInclusive;

use mupdf::{Document, MetadataName, TextPageFlags};

use pdftext_core::{
    DocumentRef, EngineError, EngineOptions, ExtractionResult, Metadata, Page, PdfEngine,
};

/// MuPDF-based implementation of [`PdfEngine`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the validation and normalization layer does
/// not transitively depend on it.
///
/// Each call opens the document afresh; nothing is cached between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfEngine;

impl MupdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PdfEngine for MupdfEngine {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn extract(
        &self,
        doc: &DocumentRef,
        options: Option<&EngineOptions>,
    ) -> Result<ExtractionResult, EngineError> {
        let mut document = open(doc)?;

        if document
            .needs_password()
            .map_err(|e| EngineError::Open(e.to_string()))?
        {
            let password = options.and_then(|o| o.password.as_deref()).unwrap_or("");
            let ok = document
                .authenticate(password)
                .map_err(|e| EngineError::Open(e.to_string()))?;
            if !ok {
                return Err(EngineError::Password);
            }
        }

        let page_count = document
            .page_count()
            .map_err(|e| EngineError::Format(e.to_string()))?;
        let page_count = u32::try_from(page_count).unwrap_or(0);

        let range = select_pages(
            page_count,
            options.and_then(|o| o.page_start),
            options.and_then(|o| o.page_end),
        )?;

        let metadata = Metadata {
            title: document.metadata(MetadataName::Title).unwrap_or_default(),
            author: document.metadata(MetadataName::Author).unwrap_or_default(),
            page_count,
        };

        let pages = range
            .map(|index| Page {
                page_number: index + 1,
                text: page_text(&document, index),
            })
            .collect();

        Ok(ExtractionResult { metadata, pages })
    }
}

fn open(doc: &DocumentRef) -> Result<Document, EngineError> {
    match doc {
        DocumentRef::Path(path) => {
            let path_str = path
                .to_str()
                .ok_or_else(|| EngineError::Open("invalid path encoding".into()))?;
            Document::open(path_str).map_err(|e| EngineError::Open(e.to_string()))
        }
        DocumentRef::Bytes(bytes) => Document::from_bytes(bytes, "application/pdf")
            .map_err(|e| EngineError::Format(e.to_string())),
    }
}

/// Resolve 1-based inclusive bounds into 0-based page indices.
///
/// Non-positive bounds mean "unbounded"; the end is clamped to the last page.
/// An empty selection (including a document with no pages) is an error.
pub fn select_pages(
    page_count: u32,
    page_start: Option<i64>,
    page_end: Option<i64>,
) -> Result<RangeInclusive<u32>, EngineError> {
    let last = i64::from(page_count) - 1;
    let start = match page_start {
        Some(n) if n > 0 => n - 1,
        _ => 0,
    };
    let end = match page_end {
        Some(n) if n > 0 => (n - 1).min(last),
        _ => last,
    };
    if start > end {
        return Err(EngineError::PageRange);
    }
    // Both bounds now lie in 0..page_count.
    Ok(start as u32..=end as u32)
}

/// Text of one page, one line per text line. A page that fails to load or
/// lay out yields empty text rather than failing the document.
fn page_text(document: &Document, index: u32) -> String {
    let page = match document.load_page(index as i32) {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(page = index + 1, error = %e, "failed to load page");
            return String::new();
        }
    };
    let text_page = match page.to_text_page(TextPageFlags::empty()) {
        Ok(text_page) => text_page,
        Err(e) => {
            tracing::warn!(page = index + 1, error = %e, "failed to read page text");
            return String::new();
        }
    };

    let mut text = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
            text.push('\n');
        }
    }
    text
}
