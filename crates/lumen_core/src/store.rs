//! Preference stores
//!
//! Small string key-value persistence used for user preferences such as the
//! `theme` key. Two backends are provided:
//!
//! - [`MemoryStore`]: process-local, for tests and embedding
//! - [`JsonFileStore`]: a flat JSON object on disk, written through on every
//!   change
//!
//! # Example
//!
//! ```rust
//! use lumen_core::store::{MemoryStore, PreferenceStore};
//!
//! let store = MemoryStore::new();
//! store.set("theme", "dark").unwrap();
//! assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
//! ```

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Errors from persistent stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("preference file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preference file {path} is not a JSON object of strings: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// String key-value persistence
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<FxHashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object file
///
/// The file is read once on open. A missing file is treated as empty and is
/// created, along with its parent directories, on the first write.
/// Changes only become visible once written; a failed write leaves the
/// previous values in place.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let file = fs::File::open(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "preference store opened");

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let file = fs::File::create(&self.path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, values).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        writer.flush().map_err(io_err)
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        if values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        let mut updated = values.clone();
        updated.insert(key.to_string(), value.to_string());
        self.persist(&updated)?;
        *values = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut updated = values.clone();
        updated.remove(key);
        self.persist(&updated)?;
        *values = updated;
        Ok(())
    }
}
