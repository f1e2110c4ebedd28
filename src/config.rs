//! Run configuration.
//!
//! Everything the pipeline needs is collected into a [`SyncConfig`] once, at
//! startup. Library code never reads the environment itself.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::classify::Taxonomy;
use crate::stats::DEFAULT_SCHOLAR_ID;

pub const DEFAULT_OUTPUT: &str = "data/publications.toml";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required Zotero setting(s): {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

/// Identifiers needed to read one Zotero collection.
#[derive(Clone, PartialEq, Eq)]
pub struct ZoteroCredentials {
    pub user_id: String,
    pub api_key: String,
    pub collection_key: String,
}

impl ZoteroCredentials {
    /// Validates that all three identifiers are present and non-blank.
    ///
    /// The error lists every missing setting, not just the first.
    pub fn new(
        user_id: Option<&str>,
        api_key: Option<&str>,
        collection_key: Option<&str>,
    ) -> Result<Self, ConfigError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        let user_id = present(user_id);
        let api_key = present(api_key);
        let collection_key = present(collection_key);

        let mut missing = Vec::new();
        if user_id.is_none() {
            missing.push("user id");
        }
        if api_key.is_none() {
            missing.push("API key");
        }
        if collection_key.is_none() {
            missing.push("collection key");
        }

        match (user_id, api_key, collection_key) {
            (Some(user_id), Some(api_key), Some(collection_key)) => Ok(ZoteroCredentials {
                user_id: user_id.to_string(),
                api_key: api_key.to_string(),
                collection_key: collection_key.to_string(),
            }),
            _ => Err(ConfigError::MissingCredentials(missing)),
        }
    }
}

impl fmt::Debug for ZoteroCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoteroCredentials")
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .field("collection_key", &self.collection_key)
            .finish()
    }
}

/// Where records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Zotero(ZoteroCredentials),
    /// A local CSL-JSON export
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub output: PathBuf,
    pub scholar_id: String,
    pub taxonomy: Taxonomy,
    pub source: SourceConfig,
}

impl SyncConfig {
    /// Defaults for everything except the record source.
    pub fn new(source: SourceConfig) -> Self {
        SyncConfig {
            output: PathBuf::from(DEFAULT_OUTPUT),
            scholar_id: DEFAULT_SCHOLAR_ID.to_string(),
            taxonomy: Taxonomy::default(),
            source,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_scholar_id(mut self, scholar_id: impl Into<String>) -> Self {
        self.scholar_id = scholar_id.into();
        self
    }

    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }
}
