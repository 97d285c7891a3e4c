//! Persisted collection of matrices.
//!
//! The collection is one JSON array saved under a single key in a
//! [`KeyValueStore`]. Loading never fails: a missing, unreadable, corrupt or
//! empty snapshot falls back to the built-in samples. Every mutation saves
//! the full collection.

use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{matrix_from_value, BitmapMatrix, MatrixError};
use crate::samples::default_collection;

/// Key the collection is saved under unless configured otherwise.
pub const DEFAULT_KEY: &str = "pixelWallArt";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid store key '{0}'")]
    InvalidKey(String),
}

/// Minimal string key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<dir>/<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$XDG_DATA_HOME/pixeldrop`, or `~/.local/share/pixeldrop`, or
    /// `./.pixeldrop` when neither variable is set.
    pub fn default_dir() -> PathBuf {
        env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
            .map(|base| base.join("pixeldrop"))
            .unwrap_or_else(|_| PathBuf::from(".pixeldrop"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file, then renames over the target so a
    /// crash mid-write never leaves a truncated snapshot.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory store for tests and the browser host.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Why a snapshot was rejected.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of matrices")]
    NotAnArray,
    #[error("collection is empty")]
    Empty,
    #[error("item {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: MatrixError,
    },
}

/// Decode a persisted snapshot. Entries without a name are called
/// `Untitled Art {n}` (1-based). Any malformed entry rejects the whole
/// snapshot.
pub fn decode_snapshot(json: &str) -> Result<Vec<BitmapMatrix>, SnapshotError> {
    let Value::Array(items) = serde_json::from_str(json)? else {
        return Err(SnapshotError::NotAnArray);
    };
    if items.is_empty() {
        return Err(SnapshotError::Empty);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            matrix_from_value(item, &format!("Untitled Art {}", index + 1))
                .map_err(|source| SnapshotError::Item { index, source })
        })
        .collect()
}

/// Ordered, persisted list of matrices.
pub struct Collection<S: KeyValueStore> {
    store: S,
    key: String,
    items: Vec<BitmapMatrix>,
}

impl<S: KeyValueStore> Collection<S> {
    /// Load the collection saved under `key`, falling back to the samples.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = match store.get(&key) {
            Ok(Some(json)) => match decode_snapshot(&json) {
                Ok(items) => {
                    log::debug!("loaded {} matrices from '{}'", items.len(), key);
                    items
                }
                Err(e) => {
                    log::warn!("ignoring saved collection '{}': {}", key, e);
                    default_collection()
                }
            },
            Ok(None) => default_collection(),
            Err(e) => {
                log::warn!("could not read saved collection '{}': {}", key, e);
                default_collection()
            }
        };
        Self { store, key, items }
    }

    pub fn items(&self) -> &[BitmapMatrix] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BitmapMatrix> {
        self.items.get(index)
    }

    /// Whether [`remove`](Self::remove) would do anything at all.
    pub fn can_remove(&self) -> bool {
        self.items.len() > 1
    }

    /// Append a matrix and save.
    pub fn add(&mut self, matrix: BitmapMatrix) -> Result<(), StoreError> {
        log::info!("adding '{}' to the collection", matrix.name());
        self.items.push(matrix);
        self.save()
    }

    /// Remove the item at `index` and save.
    ///
    /// Removing the last remaining item, or an index out of range, is a
    /// no-op returning `Ok(None)`.
    pub fn remove(&mut self, index: usize) -> Result<Option<BitmapMatrix>, StoreError> {
        if !self.can_remove() || index >= self.items.len() {
            return Ok(None);
        }
        let removed = self.items.remove(index);
        log::info!("removed '{}' from the collection", removed.name());
        self.save()?;
        Ok(Some(removed))
    }

    /// Write the full collection under its key.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.items)?;
        self.store.set(&self.key, &json)
    }

    pub fn into_items(self) -> Vec<BitmapMatrix> {
        self.items
    }
}
