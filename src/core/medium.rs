//! Durable string-keyed media backing the chapter and content tables
//!
//! A medium only knows how to read and replace whole entries. Everything the
//! store persists is a complete JSON document written under a fixed entry name,
//! so a medium never sees partial updates.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised by a storage medium
#[derive(Debug, Error)]
pub enum MediumError {
    #[error("invalid entry name: {0:?}")]
    InvalidEntry(String),
    #[error("failed to read entry {entry}")]
    Read {
        entry: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write entry {entry}")]
    Write {
        entry: String,
        #[source]
        source: io::Error,
    },
}

/// Whole-entry get/set contract
pub trait StorageMedium {
    /// Read an entry, `None` if it was never written
    fn get(&self, entry: &str) -> Result<Option<String>, MediumError>;

    /// Replace an entry with `value`
    fn set(&mut self, entry: &str, value: &str) -> Result<(), MediumError>;

    /// Short human-readable location, used in logs and the status bar
    fn describe(&self) -> String;
}

impl<M: StorageMedium + ?Sized> StorageMedium for Box<M> {
    fn get(&self, entry: &str) -> Result<Option<String>, MediumError> {
        (**self).get(entry)
    }

    fn set(&mut self, entry: &str, value: &str) -> Result<(), MediumError> {
        (**self).set(entry, value)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Volatile medium for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    entries: HashMap<String, String>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry, bypassing any store logic
    pub fn with_entry(mut self, entry: &str, value: &str) -> Self {
        self.entries.insert(entry.to_string(), value.to_string());
        self
    }
}

impl StorageMedium for MemoryMedium {
    fn get(&self, entry: &str) -> Result<Option<String>, MediumError> {
        Ok(self.entries.get(entry).cloned())
    }

    fn set(&mut self, entry: &str, value: &str) -> Result<(), MediumError> {
        self.entries.insert(entry.to_string(), value.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

/// Directory of JSON files, one file per entry
#[derive(Debug, Clone)]
pub struct FileMedium {
    root: PathBuf,
}

impl FileMedium {
    /// Create a medium rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, entry: &str) -> Result<PathBuf, MediumError> {
        let valid = !entry.is_empty()
            && !entry.starts_with('.')
            && !entry.contains(['/', '\\', ':']);
        if !valid {
            return Err(MediumError::InvalidEntry(entry.to_string()));
        }
        Ok(self.root.join(format!("{entry}.json")))
    }
}

impl StorageMedium for FileMedium {
    fn get(&self, entry: &str) -> Result<Option<String>, MediumError> {
        let path = self.entry_path(entry)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(MediumError::Read {
                entry: entry.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, entry: &str, value: &str) -> Result<(), MediumError> {
        let path = self.entry_path(entry)?;
        let write_err = |source| MediumError::Write {
            entry: entry.to_string(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(write_err)?;

        // Write next to the target, then rename over it
        let tmp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path).map_err(write_err)?;
        file.write_all(value.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);
        fs::rename(&tmp_path, &path).map_err(write_err)?;

        tracing::debug!("Wrote entry {} to {}", entry, path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
