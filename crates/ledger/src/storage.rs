//! Key-value slots the [`EntryStore`](crate::EntryStore) is mirrored into.
//!
//! A slot holds one serialized document and every write replaces it whole;
//! there is no partial update.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::ResultLedger;

/// Durable key-value backend.
pub trait Storage {
    /// Returns the value stored under `key`, or `None` when the slot was never
    /// written.
    fn read(&self, key: &str) -> ResultLedger<Option<String>>;

    /// Replaces the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> ResultLedger<()>;
}

/// One JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> ResultLedger<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> ResultLedger<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.slot_path(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        match fs::rename(&tmp, &path) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::debug!(path = %path.display(), "rename failed, copying instead: {err}");
                fs::copy(&tmp, &path)?;
                remove_tmp(&tmp);
                Ok(())
            }
        }
    }
}

/// Deletes a leftover temporary file. A failure only leaves a stale `.tmp`
/// next to the slot, so it is logged rather than returned.
fn remove_tmp(tmp: &Path) -> bool {
    match fs::remove_file(tmp) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(path = %tmp.display(), "stale temporary file left behind: {err}");
            false
        }
    }
}

/// Slots kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with a single slot.
    pub fn with_slot(key: &str, value: impl Into<String>) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.to_string(), value.into());
        Self { slots }
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> ResultLedger<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> ResultLedger<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
