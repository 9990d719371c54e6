//! On-disk persistence for the clip library and connection settings
//!
//! Everything lives in a single JSON state file: one settings blob plus the
//! clip array. Saves go through a sibling temp file and a rename so a crash
//! mid-write never leaves a truncated store behind.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::models::{Clip, ConnectionSettings};
use crate::Result;

/// Persisted application state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub settings: ConnectionSettings,
    pub clips: Vec<Clip>,
}

/// Single-file JSON store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted state. A missing file is an empty library with
    /// default settings; a corrupt file is an error for the caller.
    pub fn load(&self) -> Result<PersistedState> {
        if !self.path.exists() {
            return Ok(PersistedState::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory state shared by the library and settings services, mirrored
/// to the store on every mutation.
pub struct SharedState {
    pub(crate) file: JsonStore,
    pub(crate) state: RwLock<PersistedState>,
}

impl SharedState {
    /// Open the store and hydrate the in-memory state from it.
    pub fn open(file: JsonStore) -> Result<Arc<Self>> {
        let state = file.load()?;
        Ok(Arc::new(Self {
            file,
            state: RwLock::new(state),
        }))
    }

    pub(crate) fn persist(&self, state: &PersistedState) -> Result<()> {
        self.file.save(state)
    }
}
