//! JSON file persistence for the snapshot contract.
//!
//! The store writes the serialized snapshot to a temporary sibling file and
//! renames it over the target, so a crash mid-write never leaves a truncated
//! data file behind.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::snapshot::Snapshot;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Handle on the snapshot data file.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot, or `None` when no data file exists yet.
    pub fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Writes the snapshot atomically (temp file + rename).
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let encoded = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &encoded)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
