//! Shared test records and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// A journal article with one author, dated 2021.
pub fn paper_x() -> Value {
    json!({
        "id": "1/X",
        "type": "article-journal",
        "title": "X",
        "author": [{"family": "Lovelace", "given": "Ada"}],
        "issued": {"date-parts": [[2021]]}
    })
}

/// A dataset with two organizational authors, dated 2019.
pub fn dataset_y() -> Value {
    json!({
        "id": "1/Y",
        "type": "dataset",
        "title": "Y",
        "author": [{"literal": "A"}, {"literal": "B"}],
        "issued": {"date-parts": [[2019]]}
    })
}

/// Build a journal article record with a given title and year.
pub fn paper(title: &str, year: u32) -> Value {
    json!({
        "id": format!("1/{}", title),
        "type": "article-journal",
        "title": title,
        "author": [{"family": "Author", "given": "A."}],
        "issued": {"date-parts": [[year]]},
        "container-title": "Journal of Tests"
    })
}

/// Write `content` to `name` inside `dir`, returning the full path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Serialize records as a CSL-JSON array.
pub fn records_json(records: &[Value]) -> String {
    serde_json::to_string_pretty(records).unwrap()
}

/// A previous output with hand-maintained stats.
pub const PRIOR_OUTPUT: &str = r#"[stats]
scholar_link = "https://scholar.google.com/citations?user=abc&hl=en&oi=ao"
citations = 42
h_index = 5
last_updated = "2024-01-15"

[[papers]]
title = "Stale Paper"
authors = "Someone"
year = "1990"
journal = "Old Journal"
"#;
