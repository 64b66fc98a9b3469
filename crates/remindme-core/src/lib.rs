//! Core types: todos, reminders, reminder times, tracing

pub mod error;
pub mod time;
pub mod todo;
pub mod tracing;

pub use error::{CoreError, CoreResult};
pub use time::ReminderTime;
pub use todo::{Reminder, Todo, TodoId, TodoPatch};
pub use tracing::{LogFormat, TracingConfig, TracingError, init_tracing};
