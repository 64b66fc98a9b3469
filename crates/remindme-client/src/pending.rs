//! Reminders waiting for a login.
//!
//! When the gate refuses a calendar action, the reminder is queued here and
//! replayed once by the callback handler after a successful login. The queue
//! can be backed by a JSON file so that a later process completing the login
//! picks up what an earlier one deferred.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use remindme_core::Reminder;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// A deduplicated queue of deferred reminders.
#[derive(Debug, Default)]
pub struct PendingRequests {
    path: Option<PathBuf>,
    items: Mutex<Vec<Reminder>>,
}

impl PendingRequests {
    /// Creates a queue that lives only as long as this process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a file-backed queue, loading anything already stored.
    ///
    /// A missing file is an empty queue. An unreadable file is logged and
    /// treated as empty; it is overwritten on the next change.
    pub fn persisted(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match Self::read_file(&path) {
            Ok(items) => items,
            Err(e) => {
                warn!("discarding unreadable pending queue {}: {}", path.display(), e);
                Vec::new()
            }
        };
        Self {
            path: Some(path),
            items: Mutex::new(items),
        }
    }

    fn read_file(path: &Path) -> ClientResult<Vec<Reminder>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ClientError::Storage(format!("failed to parse pending queue: {}", e)))
    }

    fn write_file(&self, items: &[Reminder]) -> ClientResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if items.is_empty() {
            if path.exists() {
                fs::remove_file(path)?;
            }
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(items)
            .map_err(|e| ClientError::Storage(format!("failed to serialize pending queue: {}", e)))?;
        fs::write(path, content)?;
        debug!("wrote {} pending reminder(s) to {}", items.len(), path.display());
        Ok(())
    }

    /// Adds a reminder. Returns false if an identical one is already queued.
    ///
    /// The queue is unchanged if the file cannot be written.
    pub fn push(&self, reminder: Reminder) -> ClientResult<bool> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if items.contains(&reminder) {
            return Ok(false);
        }
        let mut staged = items.clone();
        staged.push(reminder);
        self.write_file(&staged)?;
        *items = staged;
        Ok(true)
    }

    /// Removes and returns everything queued, oldest first.
    ///
    /// Nothing is removed if the file cannot be cleared.
    pub fn take_all(&self) -> ClientResult<Vec<Reminder>> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_file(&[])?;
        Ok(std::mem::take(&mut *items))
    }

    /// Drops everything queued.
    pub fn clear(&self) -> ClientResult<()> {
        self.take_all().map(|_| ())
    }

    /// Returns a copy of the queue.
    pub fn snapshot(&self) -> Vec<Reminder> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
