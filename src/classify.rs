//! Record classification and normalization.
//!
//! Turns one loosely-typed CSL-JSON record into a [`CanonicalEntry`] and
//! decides whether it belongs with the papers or the datasets.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::authors::{authors_from_value, format_authors};
use crate::dates::{extract_year, YearExtraction};

/// Taxonomy assumed when a record has no `type`.
pub const DEFAULT_TYPE: &str = "article-journal";

/// Title placeholder for records without one. Never emitted.
pub const UNTITLED: &str = "Untitled";

pub const UNKNOWN_JOURNAL: &str = "Unknown Journal/Venue";
pub const UNKNOWN_REPOSITORY: &str = "Unknown Repository";

const DEFAULT_PAPER_TYPES: &[&str] = &[
    "article-journal",
    "paper-conference",
    "chapter",
    "report",
    "thesis",
];

const DEFAULT_DATASET_TYPES: &[&str] = &["dataset", "webpage", "article"];

/// Output category of an accepted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Paper,
    Dataset,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Paper => f.write_str("paper"),
            Category::Dataset => f.write_str("dataset"),
        }
    }
}

/// Mapping from CSL type strings to output categories.
///
/// Matching is exact and case-insensitive. A type listed in both tables is
/// treated as a paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    paper_types: Vec<String>,
    dataset_types: Vec<String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Taxonomy::new(DEFAULT_PAPER_TYPES, DEFAULT_DATASET_TYPES)
    }
}

impl Taxonomy {
    pub fn new<P, D>(paper_types: P, dataset_types: D) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Taxonomy {
            paper_types: normalize_types(paper_types),
            dataset_types: normalize_types(dataset_types),
        }
    }

    /// Returns the category for a type string, or `None` if it is unclassified.
    pub fn category_of(&self, entry_type: &str) -> Option<Category> {
        let entry_type = entry_type.to_lowercase();
        if self.paper_types.contains(&entry_type) {
            Some(Category::Paper)
        } else if self.dataset_types.contains(&entry_type) {
            Some(Category::Dataset)
        } else {
            None
        }
    }

    pub fn paper_types(&self) -> &[String] {
        &self.paper_types
    }

    pub fn dataset_types(&self) -> &[String] {
        &self.dataset_types
    }
}

fn normalize_types<I>(types: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    types
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A record as delivered by the reference manager: a schema-less JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        RawRecord(fields)
    }

    /// Wraps a JSON value, or returns `None` if it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(RawRecord(fields)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The record's `id` (or `key`), for log messages.
    pub fn label(&self) -> &str {
        ["id", "key"]
            .iter()
            .find_map(|k| self.str_field(k))
            .unwrap_or(UNLABELED)
    }

    /// A string field. `null` and non-string values count as absent.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Label used for records that carry no identifier.
pub const UNLABELED: &str = "N/A";



/// The normalized form of a publication or dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    pub title: String,
    pub authors: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
}

/// Why a record was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The source value was not a JSON object
    NotAnObject,
    /// No usable author names
    MissingAuthors,
    /// Title absent, empty, or the placeholder
    MissingTitle,
    /// Type string not present in the taxonomy
    UnclassifiedType(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotAnObject => f.write_str("record is not a JSON object"),
            Rejection::MissingAuthors => f.write_str("missing authors"),
            Rejection::MissingTitle => f.write_str("missing title"),
            Rejection::UnclassifiedType(t) => write!(f, "unclassified type '{}'", t),
        }
    }
}

/// Result of classifying a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Paper(CanonicalEntry),
    Dataset(CanonicalEntry),
    Rejected(Rejection),
}

/// Classifies an arbitrary JSON value from the source, taking ownership of it.
pub fn classify_value(value: Value, taxonomy: &Taxonomy) -> Classification {
    match RawRecord::from_value(value) {
        Some(record) => classify(&record, taxonomy),
        None => Classification::Rejected(Rejection::NotAnObject),
    }
}

/// Normalizes one record and assigns it a category.
///
/// # Arguments
///
/// * `record` - The raw CSL-JSON record
/// * `taxonomy` - Type-to-category mapping
///
/// # Returns
///
/// The entry tagged with its category, or the reason it was rejected.
pub fn classify(record: &RawRecord, taxonomy: &Taxonomy) -> Classification {
    let entry_type = record
        .str_field("type")
        .unwrap_or(DEFAULT_TYPE)
        .to_lowercase();

    let title = record.str_field("title").unwrap_or(UNTITLED);
    let authors = record
        .get("author")
        .map(|a| format_authors(&authors_from_value(a)))
        .unwrap_or_default();
    let year = record
        .get("issued")
        .map(extract_year)
        .unwrap_or(YearExtraction::Undated);

    if authors.is_empty() {
        return Classification::Rejected(Rejection::MissingAuthors);
    }
    if title.is_empty() || title == UNTITLED {
        return Classification::Rejected(Rejection::MissingTitle);
    }

    let mut entry = CanonicalEntry {
        title: title.to_string(),
        authors,
        year: year.year().to_string(),
        link: record.str_field("URL").map(str::to_string),
        doi: record.str_field("DOI").map(str::to_string),
        journal: None,
        venue: None,
    };

    match taxonomy.category_of(&entry_type) {
        Some(Category::Paper) => {
            let journal = record
                .str_field("container-title")
                .or_else(|| record.str_field("publisher"))
                .unwrap_or(UNKNOWN_JOURNAL);
            entry.journal = Some(journal.to_string());
            Classification::Paper(entry)
        }
        Some(Category::Dataset) => {
            let venue = record
                .str_field("publisher")
                .or_else(|| record.str_field("archive"))
                .unwrap_or(UNKNOWN_REPOSITORY);
            entry.venue = Some(venue.to_string());
            Classification::Dataset(entry)
        }
        None => Classification::Rejected(Rejection::UnclassifiedType(entry_type)),
    }
}
