//! Keyword search and id lookup over the record store
//!
//! Both operations are pure: they only read the store and build owned result values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    errors::AppError,
    store::{Record, RecordStore},
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchResultPage {
    pub results: Vec<SearchResult>,
}

/// Full projection of a record. Absent `url`/`metadata` serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FetchResult {
    pub id: String,
    pub title: String,
    pub text: String,
    pub url: Option<String>,
    pub metadata: Option<IndexMap<String, String>>,
}

impl From<&Record> for SearchResult {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            text: record.text.clone(),
        }
    }
}

impl From<&Record> for FetchResult {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            text: record.text.clone(),
            url: record.url.clone(),
            metadata: record.metadata.clone(),
        }
    }
}

pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn haystack(record: &Record) -> String {
    let metadata = record
        .metadata
        .as_ref()
        .map(|values| values.values().map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    [record.title.as_str(), record.text.as_str(), metadata.as_str()]
        .join(" ")
        .to_lowercase()
}

/// Returns every record containing any query token, in store order. An empty query
/// matches nothing.
pub fn search(store: &RecordStore, query: &str) -> SearchResultPage {
    let tokens = tokenize(query);
    let results = store
        .records()
        .iter()
        .filter(|record| {
            let hay = haystack(record);
            tokens.iter().any(|token| hay.contains(token.as_str()))
        })
        .map(SearchResult::from)
        .collect();

    SearchResultPage { results }
}

pub fn fetch(store: &RecordStore, id: &str) -> Result<FetchResult, AppError> {
    store.get(id).map(FetchResult::from).ok_or_else(|| {
        AppError::not_found("unknown_id", "unknown id", json!({ "id": id }))
    })
}
