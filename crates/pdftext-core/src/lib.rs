use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod extractor;
pub mod input;
pub mod normalize;
pub mod options;

pub use backend::{EngineError, PdfEngine};
pub use extractor::{PdfExtractor, extract, extract_structured, extract_text};
pub use input::{DocumentInput, FsProbe, PathKind, PathProbe, validate, validate_with};
pub use normalize::{NormalizeSpec, normalize};
pub use options::{EngineOptions, ExtractOptions, NormalizeOption, OutputMode, translate};

/// A validated reference to the document handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRef {
    /// Absolute path to an existing regular file.
    Path(PathBuf),
    /// Raw PDF bytes already in memory.
    Bytes(Vec<u8>),
}

/// Document-level metadata reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub author: String,
    /// Total pages in the document, regardless of the selected range.
    pub page_count: u32,
}

/// Text of a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based page number in the source document (not the index in `pages`).
    pub page_number: u32,
    pub text: String,
}

/// Structured result of extracting a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub metadata: Metadata,
    /// Pages in ascending `page_number` order.
    pub pages: Vec<Page>,
}

/// Output of [`extract`], shaped by [`ExtractOptions::output_mode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Structured(ExtractionResult),
    Text(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("input must be a path string or a byte buffer")]
    InvalidInputType,
    #[error("path must not be empty")]
    EmptyPath,
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("not a regular file: {}", path.display())]
    NotARegularFile { path: PathBuf },
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}
