//! pubs-sync: regenerate a publications TOML file from a Zotero collection.
//!
//! This library provides functionality to:
//! - Fetch CSL-JSON records from the Zotero web API or an exported file
//! - Normalize authors, dates, and types into canonical entries
//! - Split entries into papers and datasets
//! - Preserve the hand-edited `[stats]` section of the previous output
//! - Write a deterministic, year-sorted TOML document

pub mod authors;
pub mod classify;
pub mod config;
pub mod dates;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod stats;
pub mod zotero;

pub use authors::{format_authors, AuthorDescriptor};
pub use classify::{classify, CanonicalEntry, Category, Classification, RawRecord, Rejection, Taxonomy};
pub use config::{ConfigError, SourceConfig, SyncConfig, ZoteroCredentials};
pub use dates::{extract_year, YearExtraction};
pub use output::{merge, write_document, OutputDocument};
pub use pipeline::{build_document, classify_records, sync, SyncError, SyncReport};
pub use source::{FetchError, FileSource, RecordSource};
pub use stats::{load_stats, StatsBlock, StatsOrigin};
pub use zotero::ZoteroClient;
