//! Bounded linear undo/redo history of surface snapshots.
//!
//! DESIGN
//! ======
//! Each checkpoint serializes the surface's full object sequence to JSON. The
//! camera is view state and never enters a snapshot. A checkpoint made after
//! one or more undos drops every snapshot past the cursor before appending,
//! and the oldest snapshot is evicted once the capacity is exceeded.
//!
//! ERROR HANDLING
//! ==============
//! A snapshot that fails to parse is reported as `CorruptSnapshot`; the
//! surface and the cursor are left exactly as they were before the call.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use tracing::debug;

use crate::consts::HISTORY_CAPACITY;
use crate::doc::{Drawable, Surface};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("snapshot {index} is corrupt: {source}")]
    CorruptSnapshot {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Snapshot ring with a cursor; `cursor` is `None` only while empty.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<String>,
    cursor: Option<usize>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Empty history with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Empty history retaining at most `capacity` snapshots (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { snapshots: Vec::with_capacity(capacity), cursor: None, capacity }
    }

    /// Record the surface's current objects as the newest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Serialize`] if the objects cannot be encoded;
    /// the history is unchanged in that case.
    pub fn checkpoint(&mut self, surface: &Surface) -> Result<(), HistoryError> {
        let snapshot = serde_json::to_string(surface.objects()).map_err(HistoryError::Serialize)?;

        if let Some(cursor) = self.cursor {
            self.snapshots.truncate(cursor + 1);
        }
        self.snapshots.push(snapshot);

        if self.snapshots.len() > self.capacity {
            self.snapshots.remove(0);
            debug!(capacity = self.capacity, "history full; evicted oldest snapshot");
        }
        self.cursor = Some(self.snapshots.len() - 1);

        debug!(len = self.snapshots.len(), objects = surface.len(), "checkpoint");
        Ok(())
    }

    /// Step back one snapshot and restore it into `surface`.
    ///
    /// Returns `Ok(false)` without touching anything when already at the
    /// oldest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::CorruptSnapshot`] if the target snapshot does
    /// not parse; surface and cursor keep their previous state.
    pub fn undo(&mut self, surface: &mut Surface) -> Result<bool, HistoryError> {
        match self.cursor {
            Some(cursor) if cursor > 0 => self.restore(cursor - 1, surface).map(|()| true),
            _ => Ok(false),
        }
    }

    /// Step forward one snapshot and restore it into `surface`.
    ///
    /// Returns `Ok(false)` when already at the newest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::CorruptSnapshot`] if the target snapshot does
    /// not parse; surface and cursor keep their previous state.
    pub fn redo(&mut self, surface: &mut Surface) -> Result<bool, HistoryError> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.snapshots.len() => self.restore(cursor + 1, surface).map(|()| true),
            _ => Ok(false),
        }
    }

    fn restore(&mut self, index: usize, surface: &mut Surface) -> Result<(), HistoryError> {
        let raw = self.snapshots.get(index).map_or("", String::as_str);
        let objects: Vec<Drawable> =
            serde_json::from_str(raw).map_err(|source| HistoryError::CorruptSnapshot { index, source })?;
        surface.replace_objects(objects);
        self.cursor = Some(index);
        Ok(())
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the current snapshot; `None` while empty.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.snapshots.len())
    }
}
