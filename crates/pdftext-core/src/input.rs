//! Validation of caller-supplied document references.
//!
//! Paths are resolved and probed on the filesystem before any engine work is
//! attempted; byte buffers are handed through untouched.

use std::any::Any;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::{DocumentRef, ExtractError};

/// A document as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl DocumentInput {
    /// Build an input from a dynamically typed value.
    ///
    /// Accepts owned or `'static` borrowed strings, paths and byte buffers.
    /// Anything else fails with [`ExtractError::InvalidInputType`].
    pub fn from_any(value: &dyn Any) -> Result<Self, ExtractError> {
        if let Some(s) = value.downcast_ref::<String>() {
            return Ok(Self::Path(PathBuf::from(s)));
        }
        if let Some(s) = value.downcast_ref::<&'static str>() {
            return Ok(Self::Path(PathBuf::from(*s)));
        }
        if let Some(p) = value.downcast_ref::<PathBuf>() {
            return Ok(Self::Path(p.clone()));
        }
        if let Some(p) = value.downcast_ref::<&'static Path>() {
            return Ok(Self::Path(p.to_path_buf()));
        }
        if let Some(s) = value.downcast_ref::<OsString>() {
            return Ok(Self::Path(PathBuf::from(s)));
        }
        if let Some(b) = value.downcast_ref::<Vec<u8>>() {
            return Ok(Self::Bytes(b.clone()));
        }
        if let Some(b) = value.downcast_ref::<Box<[u8]>>() {
            return Ok(Self::Bytes(b.to_vec()));
        }
        if let Some(b) = value.downcast_ref::<&'static [u8]>() {
            return Ok(Self::Bytes(b.to_vec()));
        }
        Err(ExtractError::InvalidInputType)
    }
}

impl From<&str> for DocumentInput {
    fn from(s: &str) -> Self {
        Self::Path(PathBuf::from(s))
    }
}

impl From<String> for DocumentInput {
    fn from(s: String) -> Self {
        Self::Path(PathBuf::from(s))
    }
}

impl From<&Path> for DocumentInput {
    fn from(p: &Path) -> Self {
        Self::Path(p.to_path_buf())
    }
}

impl From<PathBuf> for DocumentInput {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<&[u8]> for DocumentInput {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for DocumentInput {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

/// What a probed path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    /// Exists, but is a directory or some other non-regular entry.
    Other,
}

/// Read-only filesystem check used by the validator.
pub trait PathProbe: Send + Sync {
    fn probe(&self, path: &Path) -> io::Result<PathKind>;
}

/// [`PathProbe`] backed by `std::fs::metadata` (follows symlinks).
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn probe(&self, path: &Path) -> io::Result<PathKind> {
        let meta = std::fs::metadata(path)?;
        Ok(if meta.is_file() {
            PathKind::File
        } else {
            PathKind::Other
        })
    }
}

/// Validate an input against the real filesystem.
pub fn validate(input: DocumentInput) -> Result<DocumentRef, ExtractError> {
    validate_with(input, &FsProbe)
}

/// Validate an input using the given probe for path checks.
///
/// Byte buffers never reach the probe.
pub fn validate_with(
    input: DocumentInput,
    probe: &dyn PathProbe,
) -> Result<DocumentRef, ExtractError> {
    match input {
        DocumentInput::Bytes(bytes) => {
            tracing::trace!(len = bytes.len(), "accepted in-memory document");
            Ok(DocumentRef::Bytes(bytes))
        }
        DocumentInput::Path(path) => {
            if path.as_os_str().is_empty() {
                return Err(ExtractError::EmptyPath);
            }
            let full = std::path::absolute(&path)
                .map_err(|_| ExtractError::FileNotFound { path: path.clone() })?;
            match probe.probe(&full) {
                Ok(PathKind::File) => {
                    tracing::trace!(path = %full.display(), "accepted document path");
                    Ok(DocumentRef::Path(full))
                }
                Ok(PathKind::Other) => Err(ExtractError::NotARegularFile { path: full }),
                Err(_) => Err(ExtractError::FileNotFound { path: full }),
            }
        }
    }
}
