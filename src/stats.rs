//! Preservation of the hand-edited `[stats]` section.
//!
//! The stats block is never generated from the reference manager. It is read
//! back from the previous output and carried over verbatim, including any
//! keys added by hand.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::{Table, Value};

/// Placeholder used when no Google Scholar id is configured.
pub const DEFAULT_SCHOLAR_ID: &str = "YOUR_ID_HERE";

/// Errors that can occur when reading stats from a previous output.
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Failed to read file: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid TOML: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("No [stats] section found")]
    MissingSection,

    #[error("'stats' is not a table")]
    NotATable,
}

/// The opaque stats table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsBlock(Table);

impl StatsBlock {
    /// Builds the block written on a first run.
    pub fn with_defaults(scholar_id: &str) -> Self {
        let mut table = Table::new();
        table.insert(
            "scholar_link".to_string(),
            Value::String(scholar_link(scholar_id)),
        );
        table.insert("citations".to_string(), Value::Integer(0));
        table.insert("h_index".to_string(), Value::Integer(0));
        StatsBlock(table)
    }

    pub fn from_table(table: Table) -> Self {
        StatsBlock(table)
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn citations(&self) -> i64 {
        self.integer("citations")
    }

    pub fn h_index(&self) -> i64 {
        self.integer("h_index")
    }

    /// True once someone has filled in real numbers.
    pub fn is_populated(&self) -> bool {
        self.citations() > 0 || self.h_index() > 0
    }

    fn integer(&self, key: &str) -> i64 {
        self.0.get(key).and_then(Value::as_integer).unwrap_or(0)
    }
}

/// Google Scholar profile URL for an author id.
pub fn scholar_link(scholar_id: &str) -> String {
    format!(
        "https://scholar.google.com/citations?user={}&hl=en&oi=ao",
        scholar_id
    )
}

/// Where the stats block in a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsOrigin {
    Existing,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreservedStats {
    pub stats: StatsBlock,
    pub origin: StatsOrigin,
}

/// Extracts the `stats` table from the text of a previous output.
pub fn stats_from_document(content: &str) -> Result<StatsBlock, StatsError> {
    let document: Table = toml::from_str(content)?;
    match document.get("stats") {
        Some(Value::Table(stats)) => Ok(StatsBlock(stats.clone())),
        Some(_) => Err(StatsError::NotATable),
        None => Err(StatsError::MissingSection),
    }
}

/// Reads the stats block from a previous output file.
pub fn read_stats(path: &Path) -> Result<StatsBlock, StatsError> {
    let content = fs::read_to_string(path)?;
    stats_from_document(&content)
}

/// Loads the stats to carry into the next output.
///
/// Never fails: a missing, unreadable, or malformed file, or one without a
/// stats table, falls back to `default`.
pub fn load_stats(path: &Path, default: StatsBlock) -> PreservedStats {
    if !path.is_file() {
        tracing::info!(
            path = %path.display(),
            "output file not found, using default stats"
        );
        return PreservedStats {
            stats: default,
            origin: StatsOrigin::Default,
        };
    }

    tracing::info!(path = %path.display(), "reading existing stats");
    match read_stats(path) {
        Ok(stats) => {
            tracing::info!("loaded existing stats");
            PreservedStats {
                stats,
                origin: StatsOrigin::Existing,
            }
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not reuse existing stats, using defaults"
            );
            PreservedStats {
                stats: default,
                origin: StatsOrigin::Default,
            }
        }
    }
}
