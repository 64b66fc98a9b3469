//! Sends calendar reminders to the backend.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use remindme_api::RemindBackend;
use remindme_core::Reminder;
use tracing::{error, info};

use crate::error::ClientResult;

/// Result of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend accepted the reminder.
    Submitted,
    /// An identical reminder is still being sent; nothing was sent this time.
    AlreadyInFlight,
}

/// Issues `POST /api/reminder`, once per call, never retrying.
pub struct ReminderSubmitter {
    backend: Arc<dyn RemindBackend>,
    in_flight: Mutex<HashSet<Reminder>>,
}

impl ReminderSubmitter {
    pub fn new(backend: Arc<dyn RemindBackend>) -> Self {
        Self {
            backend,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Registers `reminder` in the user's calendar.
    pub async fn submit(&self, reminder: Reminder) -> ClientResult<SubmitOutcome> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &reminder) else {
            info!("reminder {} is already being submitted", reminder);
            return Ok(SubmitOutcome::AlreadyInFlight);
        };

        match self.backend.submit_reminder(reminder.clone()).await {
            Ok(()) => {
                info!("calendar reminder set for {}", reminder);
                Ok(SubmitOutcome::Submitted)
            }
            Err(e) => {
                error!("failed to set calendar reminder for {}: {}", reminder, e);
                Err(e.into())
            }
        }
    }

    /// Number of submissions currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Marks a reminder as outstanding until dropped.
///
/// Reminders are compared by title and instant, so the same moment written
/// with another UTC offset is the same reminder.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<Reminder>>,
    key: Reminder,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<Reminder>>, reminder: &Reminder) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reminder.clone());
        inserted.then(|| Self {
            set,
            key: reminder.clone(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
