//! Local key-value storage.
//!
//! The list is kept as a single string value under one key. `FileStore`
//! maps each key to a JSON file in the data directory, named after the
//! sanitized key (`@todos` becomes `todos.json`).

#[cfg(test)]
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::error::StorageError;

/// String-valued key-value store.
pub trait KeyValueStore {
    /// Read the value under `key`. A missing key is `Ok(None)`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any prior value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Convert a storage key into a safe file stem.
/// Lowercases, maps anything non-alphanumeric to underscores and collapses runs.
pub fn sanitize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Directory-backed store, one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(FileStore { dir })
    }

    /// File holding the value for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let stem = sanitize_key(key);
        let stem = if stem.is_empty() { "default".to_string() } else { stem };
        self.dir.join(format!("{stem}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(buf) => Ok(Some(buf)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Atomic-ish write via temp + rename.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let io_err = |source: std::io::Error| StorageError::Io {
            path: tmp.clone(),
            source,
        };
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(value.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = value.len(), "wrote store item");
        Ok(())
    }
}

/// In-process store for tests.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Shared-state store whose reads and writes can be made to fail on demand.
/// Clones share the same backing map and switches.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct FlakyStore {
    inner: std::rc::Rc<std::cell::RefCell<MemoryStore>>,
    pub fail_reads: std::rc::Rc<std::cell::Cell<bool>>,
    pub fail_writes: std::rc::Rc<std::cell::Cell<bool>>,
}

#[cfg(test)]
impl FlakyStore {
    fn unavailable() -> StorageError {
        StorageError::Io {
            path: PathBuf::from("<flaky>"),
            source: std::io::Error::new(ErrorKind::Other, "store unavailable"),
        }
    }
}

#[cfg(test)]
impl KeyValueStore for FlakyStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.get() {
            return Err(Self::unavailable());
        }
        self.inner.borrow().get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(Self::unavailable());
        }
        self.inner.borrow_mut().set_item(key, value)
    }
}
