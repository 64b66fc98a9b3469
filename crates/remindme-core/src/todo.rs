//! Todo and reminder types shared by the backend client and the workflow.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::time::ReminderTime;

/// Identifier assigned to a todo by the backend.
///
/// The backend treats it as an opaque string (it may contain spaces), so it
/// must be percent-encoded before being placed in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps a backend identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A user-entered title plus the time it is scheduled for.
///
/// This is both the body of `POST /api/todos` and of `POST /api/reminder`.
/// Once built it is never mutated; edits go through [`TodoPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reminder {
    title: String,
    #[serde(rename = "reminder")]
    scheduled_at: ReminderTime,
}

impl Reminder {
    /// Builds a reminder, rejecting blank titles.
    pub fn new(title: impl Into<String>, scheduled_at: ReminderTime) -> CoreResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CoreError::EmptyTitle);
        }
        Ok(Self {
            title,
            scheduled_at,
        })
    }

    /// The reminder title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// When the reminder is scheduled.
    pub fn scheduled_at(&self) -> ReminderTime {
        self.scheduled_at
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}", self.title, self.scheduled_at)
    }
}

/// A todo as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_reminder_time")]
    pub reminder: Option<ReminderTime>,
}

impl Todo {
    /// Returns the calendar reminder this todo describes.
    pub fn to_reminder(&self) -> CoreResult<Reminder> {
        let at = self
            .reminder
            .ok_or_else(|| CoreError::MissingReminderTime(self.id.to_string()))?;
        Reminder::new(self.title.clone(), at)
    }
}

/// Field updates for `PUT /api/todos/{id}`. Absent fields are left out of
/// the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<ReminderTime>,
}

impl TodoPatch {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_reminder(mut self, reminder: ReminderTime) -> Self {
        self.reminder = Some(reminder);
        self
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.reminder.is_none()
    }

    /// Rejects a patch that would blank the title.
    pub fn validate(&self) -> CoreResult<()> {
        match self.title {
            Some(ref title) if title.trim().is_empty() => Err(CoreError::EmptyTitle),
            _ => Ok(()),
        }
    }

    /// Applies the patch to a todo in place.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(ref title) = self.title {
            todo.title = title.clone();
        }
        if let Some(reminder) = self.reminder {
            todo.reminder = Some(reminder);
        }
    }
}

impl From<&Todo> for TodoPatch {
    fn from(todo: &Todo) -> Self {
        Self {
            title: Some(todo.title.clone()),
            reminder: todo.reminder,
        }
    }
}

/// Treats a missing, null, empty or unparseable reminder as "no reminder".
fn lenient_reminder_time<'de, D>(deserializer: D) -> Result<Option<ReminderTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => match ReminderTime::parse(value) {
            Ok(time) => Some(time),
            Err(e) => {
                warn!("ignoring unreadable reminder time from backend: {}", e);
                None
            }
        },
    })
}
