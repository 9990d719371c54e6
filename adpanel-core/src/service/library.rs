//! Clip library management
//!
//! CRUD over the ad clip collection. Filenames are normalized to carry the
//! playlist extension and deduplicated case-insensitively: single adds
//! reject duplicates outright, bulk adds skip them and report the count.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{Clip, ClipId, Priority};
use crate::store::SharedState;
use crate::{Error, Result};

const PLAYLIST_EXTENSION: &str = ".mp4";

/// Outcome of a bulk add: entries that landed and entries skipped as
/// case-insensitive duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub added: usize,
    pub skipped: usize,
}

/// Library CRUD service over the shared store.
#[derive(Clone)]
pub struct LibraryService {
    shared: Arc<SharedState>,
}

impl LibraryService {
    pub fn new(shared: Arc<SharedState>) -> Self {
        Self { shared }
    }

    /// Add a single clip. The filename is trimmed and given the playlist
    /// extension when missing; a case-insensitive duplicate is rejected.
    pub fn add(&self, filename: &str, priority: Priority) -> Result<Clip> {
        let filename = normalize_filename(filename)
            .ok_or_else(|| Error::InvalidInput("filename must not be empty".to_string()))?;

        let mut state = self.shared.state.write();
        if contains_filename(&state.clips, &filename) {
            return Err(Error::AlreadyExists(format!(
                "\"{filename}\" is already in the library"
            )));
        }

        let clip = Clip::new(filename, priority);
        state.clips.push(clip.clone());
        self.shared.persist(&state)?;
        info!(filename = %clip.filename, priority = clip.priority.label(), "clip added");
        Ok(clip)
    }

    /// Add newline-separated filenames at the fixed medium priority.
    /// Duplicates are counted, never fatal.
    pub fn add_bulk(&self, text: &str) -> Result<BulkOutcome> {
        let names = text.lines().map(str::trim).filter(|l| !l.is_empty());
        self.add_all(names, Priority::Medium)
    }

    /// Add a list of filenames (file-browser import) at one priority.
    pub fn add_names<I, S>(&self, names: I, priority: Priority) -> Result<BulkOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        self.add_all(names.iter().map(AsRef::as_ref), priority)
    }

    fn add_all<'a>(
        &self,
        names: impl Iterator<Item = &'a str>,
        priority: Priority,
    ) -> Result<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        let mut state = self.shared.state.write();

        for name in names {
            let Some(filename) = normalize_filename(name) else {
                continue;
            };
            if contains_filename(&state.clips, &filename) {
                outcome.skipped += 1;
                continue;
            }
            state.clips.push(Clip::new(filename, priority));
            outcome.added += 1;
        }

        if outcome.added > 0 {
            self.shared.persist(&state)?;
        }
        info!(added = outcome.added, skipped = outcome.skipped, "bulk add complete");
        Ok(outcome)
    }

    /// Remove a clip by id.
    pub fn remove(&self, id: &ClipId) -> Result<Clip> {
        let mut state = self.shared.state.write();
        let position = state
            .clips
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| Error::NotFound(format!("clip {id} not found")))?;
        let clip = state.clips.remove(position);
        self.shared.persist(&state)?;
        info!(filename = %clip.filename, "clip removed");
        Ok(clip)
    }

    /// Update the priority of an existing clip.
    pub fn set_priority(&self, id: &ClipId, priority: Priority) -> Result<Clip> {
        let mut state = self.shared.state.write();
        let clip = state
            .clips
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| Error::NotFound(format!("clip {id} not found")))?;
        clip.priority = priority;
        let updated = clip.clone();
        self.shared.persist(&state)?;
        info!(filename = %updated.filename, priority = priority.label(), "priority updated");
        Ok(updated)
    }

    /// Remove every clip, returning how many were dropped.
    pub fn clear(&self) -> Result<usize> {
        let mut state = self.shared.state.write();
        let removed = state.clips.len();
        state.clips.clear();
        self.shared.persist(&state)?;
        info!(removed, "library cleared");
        Ok(removed)
    }

    /// Read-only snapshot for the generator and the API.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Clip> {
        self.shared.state.read().clips.clone()
    }

    /// Resolve an identifier that may be a clip id or a filename
    /// (case-insensitive).
    #[must_use]
    pub fn find(&self, id_or_filename: &str) -> Option<Clip> {
        let state = self.shared.state.read();
        state
            .clips
            .iter()
            .find(|c| c.id.as_str() == id_or_filename)
            .or_else(|| {
                state
                    .clips
                    .iter()
                    .find(|c| c.filename.eq_ignore_ascii_case(id_or_filename))
            })
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.state.read().clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn contains_filename(clips: &[Clip], filename: &str) -> bool {
    clips.iter().any(|c| c.filename.eq_ignore_ascii_case(filename))
}

/// Trim and guarantee the playlist extension. Empty input yields `None`.
fn normalize_filename(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.to_lowercase().ends_with(PLAYLIST_EXTENSION) {
        Some(trimmed.to_string())
    } else {
        Some(format!("{trimmed}{PLAYLIST_EXTENSION}"))
    }
}
