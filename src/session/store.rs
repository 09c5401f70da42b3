//! DashMap-backed session store with optional JSON persistence.
//!
//! Saves are serialized behind a write lock and go through a temp file that
//! is renamed over the target, so the file on disk is always a complete
//! snapshot. The snapshot is taken while holding the lock, so the last save
//! to finish always carries the newest contents.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Errors persisting or restoring the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shared handle to the session's key/value pairs. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<String, String>>,
    persistence_path: Option<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl SessionStore {
    /// Create an empty store, optionally persisted to `persistence_path`.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a store persisted at `path`, restoring its contents if the file exists.
    pub fn load_from_file(path: &Path) -> Result<Self, SessionError> {
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: BTreeMap<String, String> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                store.inner.insert(k, v);
            }
            tracing::info!(path = ?path, entries = store.inner.len(), "Restored session");
        }
        Ok(store)
    }

    /// Write the current contents to the persistence path, if any.
    pub fn save(&self) -> Result<(), SessionError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let map: BTreeMap<String, String> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        let tmp = temp_path(path);
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &map)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    /// Store `value` under `key` and flush.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.stage(key, value);
        self.flush();
    }

    /// Store `value` under `key` in memory only. A later [`SessionStore::flush`] persists it.
    pub fn stage(&self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        let removed = self.inner.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.flush();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Persist the current contents, logging instead of failing.
    pub fn flush(&self) {
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "Failed to persist session");
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
