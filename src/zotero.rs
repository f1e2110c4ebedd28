//! Zotero web API client.
//!
//! Fetches the items of one collection in CSL-JSON form, excluding
//! attachments, following pagination until the collection is exhausted.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::ZoteroCredentials;
use crate::source::{FetchError, RecordSource};

pub const DEFAULT_BASE_URL: &str = "https://api.zotero.org";

/// Items per request (the API maximum).
pub const PAGE_SIZE: usize = 100;

const API_VERSION: &str = "3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TOTAL_RESULTS_HEADER: &str = "Total-Results";

/// Blocking client for a single Zotero user collection.
pub struct ZoteroClient {
    client: Client,
    base_url: String,
    credentials: ZoteroCredentials,
}

impl fmt::Debug for ZoteroClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoteroClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl ZoteroClient {
    pub fn new(credentials: ZoteroCredentials) -> Result<Self, FetchError> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Creates a client against a different API root (used by tests).
    pub fn with_base_url(
        credentials: ZoteroCredentials,
        base_url: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(ZoteroClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// URL of the collection's items endpoint.
    pub fn items_url(&self) -> String {
        format!(
            "{}/users/{}/collections/{}/items",
            self.base_url, self.credentials.user_id, self.credentials.collection_key
        )
    }

    fn fetch_page(&self, start: usize) -> Result<(Vec<Value>, Option<usize>), FetchError> {
        let url = self.items_url();
        tracing::debug!(%url, start, "requesting page");

        let response = self
            .client
            .get(&url)
            .header("Zotero-API-Key", &self.credentials.api_key)
            .header("Zotero-API-Version", API_VERSION)
            .query(&[("format", "csljson"), ("itemType", "-attachment")])
            .query(&[("limit", PAGE_SIZE), ("start", start)])
            .send()?;

        let response = self.check_status(response, &url)?;

        let total = response
            .headers()
            .get(TOTAL_RESULTS_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<usize>().ok());

        let body: Value = response
            .json()
            .map_err(|e| FetchError::InvalidBody(e.to_string()))?;

        Ok((items_from_body(body)?, total))
    }

    fn check_status(&self, response: Response, url: &str) -> Result<Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(FetchError::Unauthorized(status.as_u16()))
            }
            StatusCode::NOT_FOUND => Err(FetchError::CollectionNotFound(
                self.credentials.collection_key.clone(),
            )),
            _ => Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

impl RecordSource for ZoteroClient {
    fn describe(&self) -> String {
        format!(
            "Zotero user {}, collection {}",
            self.credentials.user_id, self.credentials.collection_key
        )
    }

    fn fetch(&self) -> Result<Vec<Value>, FetchError> {
        let mut records = Vec::new();
        // Offset in API items, which can differ from the number of CSL
        // objects a page decodes to.
        let mut start = 0;

        loop {
            let (page, total) = self.fetch_page(start)?;
            let page_len = page.len();
            records.extend(page);
            start += PAGE_SIZE;

            let exhausted = match total {
                Some(total) => start >= total,
                None => page_len < PAGE_SIZE,
            };
            if page_len == 0 || exhausted {
                break;
            }
        }

        tracing::info!(count = records.len(), "retrieved items from Zotero");
        Ok(records)
    }
}

/// Extracts the item list from a csljson response.
///
/// The API wraps items as `{"items": [...]}`; a bare array is accepted too.
pub fn items_from_body(body: Value) -> Result<Vec<Value>, FetchError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(FetchError::InvalidBody(
                "expected an 'items' array".to_string(),
            )),
        },
        _ => Err(FetchError::InvalidBody(
            "expected a JSON object or array".to_string(),
        )),
    }
}
