//! Record sources.
//!
//! A [`RecordSource`] yields the raw CSL-JSON records for one run. The
//! pipeline does not care whether they come from the Zotero web API
//! ([`crate::zotero::ZoteroClient`]) or from an exported file
//! ([`FileSource`]).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while fetching records. All of them are fatal to a run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Zotero rejected the API key (HTTP {0})")]
    Unauthorized(u16),

    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Zotero API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Unexpected response body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    File(#[from] SourceFileError),
}

/// Errors that can occur when loading records from a file.
#[derive(Error, Debug)]
pub enum SourceFileError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid JSONL at line {line}: {message}")]
    JsonlError { line: usize, message: String },

    #[error("Records must be a JSON array")]
    NotAnArray,
}

/// Something that can produce the raw records for a run.
pub trait RecordSource {
    /// Short human-readable description for logs.
    fn describe(&self) -> String;

    /// Retrieves every record as one logical sequence.
    fn fetch(&self) -> Result<Vec<Value>, FetchError>;
}

/// Reads records from a CSL-JSON export on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn fetch(&self) -> Result<Vec<Value>, FetchError> {
        Ok(load_records(&self.path)?)
    }
}

/// Loads records from a CSL-JSON or JSONL file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains invalid JSON.
pub fn load_records(path: &Path) -> Result<Vec<Value>, SourceFileError> {
    let content = fs::read_to_string(path)?;
    parse_records(&content)
}

/// Parses record content in either of two formats:
/// - JSON array: `[{"id": "1", ...}, {"id": "2", ...}]`
/// - JSONL: `{"id": "1", ...}\n{"id": "2", ...}`
pub fn parse_records(content: &str) -> Result<Vec<Value>, SourceFileError> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(trimmed)? {
            Value::Array(items) => Ok(items),
            _ => Err(SourceFileError::NotAnArray),
        };
    }

    let mut records = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value) => records.push(value),
            Err(e) => {
                return Err(SourceFileError::JsonlError {
                    line: line_num + 1,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(records)
}
