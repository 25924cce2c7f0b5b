//! Key-value persistence for favorite station ids.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::domain::StationId;

use super::error::PersistError;

/// Somewhere the favorites set survives a restart.
pub trait FavoritesStore: Send + Sync {
    /// Load the stored set. A store that has never been written is empty.
    fn load(&self) -> Result<BTreeSet<StationId>, PersistError>;

    /// Replace the stored set.
    fn save(&self, ids: &BTreeSet<StationId>) -> Result<(), PersistError>;
}

/// On-disk layout of the favorites file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredFavorites {
    favorites: BTreeSet<StationId>,
}

/// Favorites kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        // Default to a file in the current directory
        Self::new("favorites.json")
    }
}

impl FavoritesStore for JsonFileStore {
    fn load(&self) -> Result<BTreeSet<StationId>, PersistError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let stored: StoredFavorites = serde_json::from_str(&contents)?;
        Ok(stored.favorites)
    }

    /// Creates parent directories if they don't exist.
    fn save(&self, ids: &BTreeSet<StationId>) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(&StoredFavorites {
            favorites: ids.clone(),
        })?;

        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

/// Favorites kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ids: Mutex<BTreeSet<StationId>>,
}

impl MemoryStore {
    pub fn new(ids: BTreeSet<StationId>) -> Self {
        Self {
            ids: Mutex::new(ids),
        }
    }
}

impl FavoritesStore for MemoryStore {
    fn load(&self) -> Result<BTreeSet<StationId>, PersistError> {
        Ok(self.ids.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, ids: &BTreeSet<StationId>) -> Result<(), PersistError> {
        *self.ids.lock().unwrap_or_else(PoisonError::into_inner) = ids.clone();
        Ok(())
    }
}
