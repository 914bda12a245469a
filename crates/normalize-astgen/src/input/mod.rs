//! Source reading and fragment scanning.
//!
//! A [`SourceUnit`] is one input (a file or stdin). Scanning a unit yields its
//! declarations as [`FragmentRecord`](crate::ir::FragmentRecord)s in source
//! order; the pipeline merges units in the order they are given.

mod lexer;
mod scanner;

pub use lexer::{Lexer, Span, Token, TokenKind};
pub use scanner::{ScanError, ScanOptions, scan};

use crate::ir::FragmentRecord;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
#[error("failed to read {}: {source}", path.display())]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// One named input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Shown in scan errors, e.g. a file path or `<stdin>`.
    pub origin: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ReadError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), text))
    }

    pub fn from_reader(origin: impl Into<String>, mut reader: impl Read) -> Result<Self, ReadError> {
        let origin = origin.into();
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| ReadError {
                path: PathBuf::from(&origin),
                source,
            })?;
        Ok(Self::new(origin, text))
    }

    /// Scan this unit's declarations.
    pub fn scan(&self, opts: &ScanOptions) -> Result<Vec<FragmentRecord>, ScanError> {
        scan(&self.origin, &self.text, opts)
    }
}
