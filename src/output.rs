//! Output document generation.
//!
//! Merges the preserved stats block with freshly classified entries and
//! renders the result as TOML.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::CanonicalEntry;
use crate::stats::StatsBlock;

/// Errors that can occur when writing the output document.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write file: {0}")]
    Io(#[from] io::Error),
}

/// The persisted publications document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub stats: StatsBlock,
    #[serde(default)]
    pub papers: Vec<CanonicalEntry>,
    #[serde(default)]
    pub datasets: Vec<CanonicalEntry>,
}

impl OutputDocument {
    pub fn to_toml_string(&self) -> Result<String, OutputError> {
        Ok(toml::to_string(self)?)
    }
}

/// Sort key for a year string.
///
/// Purely numeric years sort by value. Anything else, including `"N.D."`,
/// maps to 0 so it lands after every dated entry.
pub fn year_sort_key(year: &str) -> u32 {
    if !year.is_empty() && year.bytes().all(|b| b.is_ascii_digit()) {
        year.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Sorts entries newest first. Entries with equal keys keep their input order.
pub fn sort_by_year_desc(entries: &mut [CanonicalEntry]) {
    entries.sort_by(|a, b| year_sort_key(&b.year).cmp(&year_sort_key(&a.year)));
}

/// Builds the output document for one run.
///
/// # Arguments
///
/// * `stats` - The preserved (or default) stats block, copied verbatim
/// * `papers` - Entries classified as papers, in source order
/// * `datasets` - Entries classified as datasets, in source order
///
/// # Returns
///
/// A document with both lists sorted independently by descending year.
pub fn merge(
    stats: StatsBlock,
    mut papers: Vec<CanonicalEntry>,
    mut datasets: Vec<CanonicalEntry>,
) -> OutputDocument {
    sort_by_year_desc(&mut papers);
    sort_by_year_desc(&mut datasets);
    OutputDocument {
        stats,
        papers,
        datasets,
    }
}

/// Writes the document as TOML, creating the parent directory if needed.
pub fn write_document(path: &Path, document: &OutputDocument) -> Result<(), OutputError> {
    let content = document.to_toml_string()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}
