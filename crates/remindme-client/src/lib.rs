//! Login-gated calendar reminders, the todo board, and the `remindme` CLI.
//!
//! ```text
//!  request ──▶ LoginGate ──(token)──▶ ReminderSubmitter ──▶ POST /api/reminder
//!                 │
//!             (no token)
//!                 ▼
//!      prompt Shown + PendingRequests
//!                 │ accept_relogin → consent URL → ?code=
//!                 ▼
//!      OAuthCallbackHandler ──▶ TokenStore ──▶ replay queue once
//! ```

pub mod app;
pub mod auth;
pub mod board;
pub mod callback;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gate;
pub mod pending;
pub mod prompt;
pub mod secret;
pub mod submitter;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{RemindApp, ViewModel};
pub use auth::AuthState;
pub use board::TodoBoard;
pub use callback::{CallbackOutcome, OAuthCallbackHandler};
pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use gate::{GateOutcome, LoginGate};
pub use pending::PendingRequests;
pub use prompt::{PromptEvent, PromptState};
pub use submitter::{ReminderSubmitter, SubmitOutcome};
