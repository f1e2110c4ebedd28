//! One synchronization run.
//!
//! Orchestrates the stages: read the previous stats, fetch records, classify
//! them, merge, and write the new document. Nothing is written unless every
//! earlier stage succeeded.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::classify::{
    classify, CanonicalEntry, Classification, RawRecord, Rejection, Taxonomy, UNLABELED,
};
use crate::config::{SourceConfig, SyncConfig};
use crate::output::{merge, write_document, OutputDocument, OutputError};
use crate::source::{FetchError, FileSource, RecordSource};
use crate::stats::{load_stats, StatsBlock, StatsOrigin};
use crate::zotero::ZoteroClient;

/// Fatal errors of a run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to fetch records: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to write output: {0}")]
    Output(#[from] OutputError),
}

/// A record left out of the output, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub label: String,
    pub reason: Rejection,
}

/// Records split by category, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedRecords {
    pub papers: Vec<CanonicalEntry>,
    pub datasets: Vec<CanonicalEntry>,
    pub skipped: Vec<SkippedRecord>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub output: PathBuf,
    pub fetched: usize,
    pub papers: usize,
    pub datasets: usize,
    pub skipped: Vec<SkippedRecord>,
    pub stats_origin: StatsOrigin,
    pub stats_populated: bool,
}

/// Classifies every record, logging the ones that are skipped.
///
/// Records are consumed so their fields move into the entries without copying.
pub fn classify_records(records: Vec<Value>, taxonomy: &Taxonomy) -> ClassifiedRecords {
    let mut classified = ClassifiedRecords::default();

    for value in records {
        let Some(record) = RawRecord::from_value(value) else {
            classified.skip(UNLABELED, Rejection::NotAnObject);
            continue;
        };

        match classify(&record, taxonomy) {
            Classification::Paper(entry) => {
                tracing::debug!(title = %entry.title, "paper");
                classified.papers.push(entry);
            }
            Classification::Dataset(entry) => {
                tracing::debug!(title = %entry.title, "dataset");
                classified.datasets.push(entry);
            }
            Classification::Rejected(reason) => classified.skip(record.label(), reason),
        }
    }

    classified
}

impl ClassifiedRecords {
    fn skip(&mut self, label: &str, reason: Rejection) {
        tracing::info!(item = %label, %reason, "skipping item");
        self.skipped.push(SkippedRecord {
            label: label.to_string(),
            reason,
        });
    }
}

/// Builds the output document from already-fetched records.
pub fn build_document(
    records: Vec<Value>,
    stats: StatsBlock,
    taxonomy: &Taxonomy,
) -> (OutputDocument, Vec<SkippedRecord>) {
    let classified = classify_records(records, taxonomy);
    let document = merge(stats, classified.papers, classified.datasets);
    (document, classified.skipped)
}

/// Creates the record source described by the configuration.
pub fn source_for(config: &SyncConfig) -> Result<Box<dyn RecordSource>, FetchError> {
    match &config.source {
        SourceConfig::Zotero(credentials) => {
            Ok(Box::new(ZoteroClient::new(credentials.clone())?))
        }
        SourceConfig::File(path) => Ok(Box::new(FileSource::new(path))),
    }
}

/// Runs one full synchronization against `source`.
///
/// # Errors
///
/// Returns [`SyncError::Fetch`] if the records cannot be retrieved (no file
/// is written) and [`SyncError::Output`] if the document cannot be written.
pub fn sync(config: &SyncConfig, source: &dyn RecordSource) -> Result<SyncReport, SyncError> {
    let preserved = load_stats(
        &config.output,
        StatsBlock::with_defaults(&config.scholar_id),
    );

    tracing::info!(source = %source.describe(), "fetching records");
    let records = source.fetch()?;
    if records.is_empty() {
        tracing::warn!(source = %source.describe(), "no items found");
    }

    let fetched = records.len();
    tracing::info!(count = fetched, "processing items");
    let (document, skipped) = build_document(records, preserved.stats, &config.taxonomy);

    tracing::info!(path = %config.output.display(), "writing output");
    write_document(&config.output, &document)?;

    Ok(SyncReport {
        output: config.output.clone(),
        fetched,
        papers: document.papers.len(),
        datasets: document.datasets.len(),
        skipped,
        stats_origin: preserved.origin,
        stats_populated: document.stats.is_populated(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_records_splits_and_counts() {
        // Given: a paper, a dataset, and two unusable records
        let records = vec![
            json!({"id": "p", "type": "article-journal", "title": "P", "author": [{"family": "A"}]}),
            json!({"id": "d", "type": "dataset", "title": "D", "author": [{"family": "B"}]}),
            json!({"id": "x", "type": "unknown-type", "title": "X", "author": [{"family": "C"}]}),
            json!({"id": "y", "type": "dataset", "title": "Y", "author": []}),
        ];

        // When: we classify them
        let classified = classify_records(records, &Taxonomy::default());

        // Then: each lands in the right bucket
        assert_eq!(classified.papers.len(), 1);
        assert_eq!(classified.datasets.len(), 1);
        assert_eq!(
            classified.skipped,
            vec![
                SkippedRecord {
                    label: "x".to_string(),
                    reason: Rejection::UnclassifiedType("unknown-type".to_string()),
                },
                SkippedRecord {
                    label: "y".to_string(),
                    reason: Rejection::MissingAuthors,
                },
            ]
        );
    }

    #[test]
    fn test_classify_records_preserves_source_order() {
        let records = vec![
            json!({"type": "report", "title": "First", "author": [{"family": "A"}]}),
            json!({"type": "thesis", "title": "Second", "author": [{"family": "A"}]}),
        ];

        let classified = classify_records(records, &Taxonomy::default());

        let titles: Vec<&str> = classified.papers.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_classify_records_non_object_label() {
        let classified = classify_records(vec![json!(42)], &Taxonomy::default());
        assert_eq!(classified.skipped[0].label, "N/A");
        assert_eq!(classified.skipped[0].reason, Rejection::NotAnObject);
    }

    #[test]
    fn test_build_document_end_to_end() {
        // Given: one journal article and one dataset
        let records = vec![
            json!({
                "type": "article-journal",
                "title": "X",
                "author": [{"family": "Lovelace", "given": "Ada"}],
                "issued": {"date-parts": [[2021]]}
            }),
            json!({
                "type": "dataset",
                "title": "Y",
                "author": [{"literal": "A"}, {"literal": "B"}],
                "issued": {"date-parts": [[2019]]}
            }),
        ];

        // When: we build the document
        let (doc, skipped) =
            build_document(records, StatsBlock::with_defaults("x"), &Taxonomy::default());

        // Then: both entries carry their fallback venue fields
        assert!(skipped.is_empty());
        assert_eq!(
            doc.papers,
            vec![CanonicalEntry {
                title: "X".to_string(),
                authors: "Ada Lovelace".to_string(),
                year: "2021".to_string(),
                link: None,
                doi: None,
                journal: Some("Unknown Journal/Venue".to_string()),
                venue: None,
            }]
        );
        assert_eq!(
            doc.datasets,
            vec![CanonicalEntry {
                title: "Y".to_string(),
                authors: "A and B".to_string(),
                year: "2019".to_string(),
                link: None,
                doi: None,
                journal: None,
                venue: Some("Unknown Repository".to_string()),
            }]
        );
    }

    #[test]
    fn test_source_for_file() {
        let config = SyncConfig::new(SourceConfig::File(PathBuf::from("items.json")));
        let source = source_for(&config).unwrap();
        assert_eq!(source.describe(), "file items.json");
    }
}
