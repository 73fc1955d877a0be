//! Store persistence with file locking.
//!
//! The entity store is saved as a single JSON snapshot. Saves are atomic:
//! the snapshot is written to a temp file in the same directory under an
//! exclusive lock, synced, then renamed over the original.

use crate::{EntityStore, Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Destination for store checkpoints
pub trait StoreSink {
    fn save(&mut self, store: &EntityStore) -> Result<()>;
}

/// Sink that keeps nothing; for purely in-memory stores
#[derive(Debug, Default)]
pub struct NullSink;

impl StoreSink for NullSink {
    fn save(&mut self, _store: &EntityStore) -> Result<()> {
        Ok(())
    }
}

/// JSON snapshot file with locking
#[derive(Clone, Debug)]
pub struct StoreFile {
    path: PathBuf,
}

impl StoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store with a shared lock
    ///
    /// Returns an empty store if the file doesn't exist. A file that exists
    /// but cannot be parsed is an error: silently starting empty would let
    /// the next save overwrite the user's data.
    pub fn load(&self) -> Result<EntityStore> {
        if !self.path.exists() {
            tracing::info!("No store file at {:?}, starting empty", self.path);
            return Ok(EntityStore::default());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let store: EntityStore = serde_json::from_str(&contents).map_err(|e| {
            Error::Store(format!("Failed to parse store file {:?}: {}", self.path, e))
        })?;

        let violations = store.integrity_violations();
        if !violations.is_empty() {
            tracing::warn!(
                "Store file {:?} has {} integrity violations; run `check` to repair",
                self.path,
                violations.len()
            );
        }

        tracing::debug!("Loaded store from {:?}: {:?}", self.path, store.counts());
        Ok(store)
    }

    /// Load, modify and save back
    pub fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut EntityStore) -> Result<T>,
    {
        let mut store = self.load()?;
        let value = f(&mut store)?;
        self.write(&store)?;
        Ok(value)
    }

    fn write(&self, store: &EntityStore) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, store)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved store to {:?}", self.path);
        Ok(())
    }
}

impl StoreSink for StoreFile {
    fn save(&mut self, store: &EntityStore) -> Result<()> {
        self.write(store)
    }
}
