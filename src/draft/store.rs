//! Saved Draft Persistence
//!
//! Keeps incomplete jobs in a local keyed collection so they can be
//! resumed later. The file-backed store reads the whole list, mutates
//! it and writes it back; there is no locking, so two sessions sharing
//! a file can overwrite each other's changes.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::ConnectorPayload;

/// Environment variable overriding the saved-draft file location.
pub const DRAFTS_PATH_ENV: &str = "JOBFLOW_DRAFTS";

/// Lazily-resolved default location of the saved-draft file.
pub static DEFAULT_DRAFTS_PATH: Lazy<PathBuf> = Lazy::new(|| {
    if let Ok(path) = env::var(DRAFTS_PATH_ENV) {
        if !path.trim().is_empty() {
            info!("Using saved drafts from ${}: {}", DRAFTS_PATH_ENV, path);
            return PathBuf::from(path);
        }
    }
    PathBuf::from(".jobflow").join("saved_jobs.json")
});

/// Errors from the local draft store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access draft store {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("draft store is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A draft as persisted in the local store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SavedDraft {
    pub id: String,
    pub name: String,
    pub source: ConnectorPayload,
    pub destination: ConnectorPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_catalog: Option<String>,
    /// Serialized stream selection
    pub streams_config: String,
    /// Cron schedule
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Whether an upsert replaced an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Keyed collection of saved drafts.
pub trait DraftStore: Send + Sync {
    /// All saved drafts in insertion order.
    fn list(&self) -> Result<Vec<SavedDraft>, StoreError>;

    /// Looks up one draft by id.
    fn get(&self, id: &str) -> Result<Option<SavedDraft>, StoreError> {
        Ok(self.list()?.into_iter().find(|d| d.id == id))
    }

    /// Replaces the record with the same id in place, or appends it.
    fn upsert(&self, record: SavedDraft) -> Result<UpsertOutcome, StoreError>;

    /// Removes a record. Returns false if it did not exist.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

fn upsert_into(drafts: &mut Vec<SavedDraft>, record: SavedDraft) -> UpsertOutcome {
    match drafts.iter_mut().find(|d| d.id == record.id) {
        Some(existing) => {
            *existing = record;
            UpsertOutcome::Updated
        }
        None => {
            drafts.push(record);
            UpsertOutcome::Inserted
        }
    }
}

fn remove_from(drafts: &mut Vec<SavedDraft>, id: &str) -> bool {
    let before = drafts.len();
    drafts.retain(|d| d.id != id);
    drafts.len() != before
}

/// Draft store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileDraftStore {
    path: PathBuf,
}

impl JsonFileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`DEFAULT_DRAFTS_PATH`].
    pub fn at_default_location() -> Self {
        Self::new(DEFAULT_DRAFTS_PATH.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_all(&self) -> Result<Vec<SavedDraft>, StoreError> {
        if !self.path.exists() {
            debug!("No draft store at {} yet", self.path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, drafts: &[SavedDraft]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_string_pretty(drafts)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        debug!("Wrote {} saved drafts to {}", drafts.len(), self.path.display());
        Ok(())
    }
}

impl DraftStore for JsonFileDraftStore {
    fn list(&self) -> Result<Vec<SavedDraft>, StoreError> {
        self.read_all()
    }

    fn upsert(&self, record: SavedDraft) -> Result<UpsertOutcome, StoreError> {
        let mut drafts = self.read_all()?;
        let id = record.id.clone();
        let outcome = upsert_into(&mut drafts, record);
        self.write_all(&drafts)?;

        info!("Saved draft '{}' ({:?})", id, outcome);
        Ok(outcome)
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut drafts = self.read_all()?;
        if !remove_from(&mut drafts, id) {
            return Ok(false);
        }
        self.write_all(&drafts)?;

        info!("Deleted saved draft '{}'", id);
        Ok(true)
    }
}

/// In-process draft store.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: Mutex<Vec<SavedDraft>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn drafts(&self) -> std::sync::MutexGuard<'_, Vec<SavedDraft>> {
        self.drafts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DraftStore for MemoryDraftStore {
    fn list(&self) -> Result<Vec<SavedDraft>, StoreError> {
        Ok(self.drafts().clone())
    }

    fn upsert(&self, record: SavedDraft) -> Result<UpsertOutcome, StoreError> {
        Ok(upsert_into(&mut self.drafts(), record))
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(remove_from(&mut self.drafts(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_with(records: Vec<SavedDraft>) -> MemoryDraftStore {
        let store = MemoryDraftStore::new();
        for record in records {
            store.upsert(record).unwrap();
        }
        store
    }

    fn record(id: &str, name: &str) -> SavedDraft {
        let connector = ConnectorPayload {
            name: String::new(),
            connector_type: "mongodb".to_string(),
            version: String::new(),
            config: "{}".to_string(),
        };
        SavedDraft {
            id: id.to_string(),
            name: name.to_string(),
            source: connector.clone(),
            destination: connector,
            destination_catalog: None,
            streams_config: "{}".to_string(),
            frequency: "* * * * *".to_string(),
            saved_at: None,
        }
    }

    #[test]
    fn test_upsert_existing_id_keeps_length() {
        let store = store_with(vec![record("a", "one"), record("b", "two")]);

        let outcome = store.upsert(record("a", "renamed")).unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        let drafts = store.list().unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].name, "renamed");
    }

    #[test]
    fn test_upsert_new_id_appends() {
        let store = store_with(vec![record("a", "one")]);

        let outcome = store.upsert(record("c", "three")).unwrap();

        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_missing_is_false() {
        let store = MemoryDraftStore::new();
        assert!(!store.delete("ghost").unwrap());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        let store = JsonFileDraftStore::new(temp_dir.path().join("none.json"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_creates_parent_dir() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("saved_jobs.json");
        let store = JsonFileDraftStore::new(&path);

        store.upsert(record("a", "one")).unwrap();

        assert!(path.exists());
        assert_eq!(store.get("a").unwrap().unwrap().name, "one");
    }

    #[test]
    fn test_file_store_upsert_is_idempotent() {
        let temp_dir = tempdir().unwrap();
        let store = JsonFileDraftStore::new(temp_dir.path().join("saved_jobs.json"));

        store.upsert(record("a", "one")).unwrap();
        store.upsert(record("a", "one")).unwrap();
        store.upsert(record("a", "one")).unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_file_store_delete() {
        let temp_dir = tempdir().unwrap();
        let store = JsonFileDraftStore::new(temp_dir.path().join("saved_jobs.json"));
        store.upsert(record("a", "one")).unwrap();
        store.upsert(record("b", "two")).unwrap();

        assert!(store.delete("a").unwrap());

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_file_store_last_writer_wins() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("saved_jobs.json");
        let first = JsonFileDraftStore::new(&path);
        let second = JsonFileDraftStore::new(&path);

        first.upsert(record("a", "from first")).unwrap();
        second.upsert(record("a", "from second")).unwrap();

        assert_eq!(first.get("a").unwrap().unwrap().name, "from second");
    }

    #[test]
    fn test_file_store_corrupt_content() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("saved_jobs.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileDraftStore::new(&path);
        assert!(matches!(store.list(), Err(StoreError::Serde(_))));
    }
}
