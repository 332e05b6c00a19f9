//! Key-value persistence for the expiry timestamp

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by a [`KeyValueStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read store file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write store file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse store file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Narrow integer key-value capability the reducer persists through
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError>;
    fn set(&self, key: &str, value: i64) -> Result<(), StoreError>;
}

/// In-memory store, used when nothing should outlive the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, i64>>,
    writes: Mutex<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one value
    pub fn with_value(key: &str, value: i64) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value);
        }
        store
    }

    /// Number of `set` calls served so far
    pub fn write_count(&self) -> u64 {
        self.writes.lock().map(|writes| *writes).unwrap_or(0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).copied())
    }

    fn set(&self, key: &str, value: i64) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value);
        drop(values);

        let mut writes = self.writes.lock().map_err(|_| StoreError::Poisoned)?;
        *writes += 1;
        Ok(())
    }
}

/// Store backed by a single JSON object of integers on disk.
///
/// A missing file reads as empty. Every `set` rewrites the whole file through
/// a temporary sibling that is renamed into place; a file that no longer
/// parses is rebuilt from scratch on the next `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories as needed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: path.clone(),
                source: e,
            })?;
        }
        info!("Using store file {}", path.display());
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn load(&self) -> Result<BTreeMap<String, i64>, StoreError> {
        if !self.path.exists() {
            debug!("Store file {} does not exist yet", self.path.display());
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| StoreError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.load()?.get(key).copied())
    }

    fn set(&self, key: &str, value: i64) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut values = match self.load() {
            Ok(values) => values,
            Err(e @ StoreError::Parse { .. }) => {
                warn!("Rebuilding unreadable store: {}", e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value);

        let json = serde_json::to_string_pretty(&values).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            source: e,
        })?;

        // Written beside the target and renamed, so the store file is never torn
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json).map_err(|e| StoreError::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        debug!("Stored {}={} in {}", key, value, self.path.display());
        Ok(())
    }
}
