//! Read-only record store
//!
//! Loads the order records once at startup and serves scans and id lookups for the
//! lifetime of the process.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Keys keep their file order.
    #[serde(default)]
    pub metadata: Option<IndexMap<String, String>>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read records file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed records file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("duplicate record id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    lookup: HashMap<String, usize>,
}

impl RecordStore {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<Record> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::from_records(records)?;
        info!(path = %path.display(), records = store.len(), "record store loaded");
        Ok(store)
    }

    pub fn from_records(records: Vec<Record>) -> Result<Self, StoreError> {
        let mut lookup = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if lookup.insert(record.id.clone(), index).is_some() {
                return Err(StoreError::DuplicateId(record.id.clone()));
            }
        }

        Ok(Self { records, lookup })
    }

    /// All records in file order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.lookup.get(id).map(|&index| &self.records[index])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn loads_records_and_defaults_optional_fields() {
        let file = write_temp(
            r#"[
                {"id": "1", "title": "Box", "text": "Six cupcakes", "url": "https://x.test/1"},
                {"id": "2"}
            ]"#,
        );

        let store = RecordStore::load(file.path()).expect("store should load");
        assert_eq!(store.len(), 2);

        let bare = store.get("2").expect("record 2");
        assert_eq!(bare.title, "");
        assert_eq!(bare.text, "");
        assert_eq!(bare.url, None);
        assert_eq!(bare.metadata, None);
        assert_eq!(store.records()[0].url.as_deref(), Some("https://x.test/1"));
    }

    #[test]
    fn metadata_keeps_file_key_order() {
        let file = write_temp(
            r#"[{"id": "1", "metadata": {"status": "baking", "flavor": "lemon", "box": "six"}}]"#,
        );

        let store = RecordStore::load(file.path()).expect("store should load");
        let metadata = store.get("1").and_then(|record| record.metadata.as_ref());
        assert_eq!(
            metadata.map(|values| values.keys().map(String::as_str).collect::<Vec<_>>()),
            Some(vec!["status", "flavor", "box"])
        );
    }

    #[test]
    fn missing_file_fails() {
        let err = RecordStore::load(Path::new("/nonexistent/records.json"))
            .expect_err("expected read error");
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[test]
    fn malformed_file_fails() {
        let file = write_temp("{not json");
        let err = RecordStore::load(file.path()).expect_err("expected parse error");
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn record_without_id_fails() {
        let file = write_temp(r#"[{"title": "No id"}]"#);
        let err = RecordStore::load(file.path()).expect_err("expected parse error");
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let record = Record {
            id: "7".to_string(),
            title: String::new(),
            text: String::new(),
            url: None,
            metadata: None,
        };

        let err = RecordStore::from_records(vec![record.clone(), record])
            .expect_err("expected duplicate id error");
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "7"));
    }

    #[test]
    fn bundled_data_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/records.json");
        let store = RecordStore::load(&path).expect("bundled records should load");
        assert!(store.get("47").is_some());
    }
}
