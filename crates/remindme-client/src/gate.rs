//! Login gate for calendar actions.
//!
//! Every "set calendar reminder" request passes through [`LoginGate`]. With a
//! usable token it goes straight to the [`ReminderSubmitter`]; without one the
//! login prompt is shown, the reminder is queued for replay after the login,
//! and nothing is sent.

use std::sync::{Arc, Mutex, PoisonError};

use remindme_api::AuthorizationRequest;
use remindme_core::Reminder;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::AuthState;
use crate::error::{ClientError, ClientResult};
use crate::pending::PendingRequests;
use crate::prompt::{PromptEvent, PromptState};
use crate::submitter::{ReminderSubmitter, SubmitOutcome};

/// What happened to a gated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The reminder was sent to the calendar.
    Submitted,
    /// An identical reminder is still being sent.
    AlreadyInFlight,
    /// No usable token; the prompt is shown and the reminder queued.
    LoginRequired,
}

pub struct LoginGate {
    auth: AuthState,
    prompt: Mutex<PromptState>,
    pending: Arc<PendingRequests>,
    submitter: Arc<ReminderSubmitter>,
    authorization: Option<AuthorizationRequest>,
}

impl LoginGate {
    pub fn new(
        auth: AuthState,
        pending: Arc<PendingRequests>,
        submitter: Arc<ReminderSubmitter>,
    ) -> Self {
        Self {
            auth,
            prompt: Mutex::new(PromptState::Hidden),
            pending,
            submitter,
            authorization: None,
        }
    }

    /// Sets the consent request used when the user accepts to log in again.
    pub fn with_authorization(mut self, request: AuthorizationRequest) -> Self {
        self.authorization = Some(request);
        self
    }

    /// Submits `reminder` if authorized, otherwise shows the login prompt.
    pub async fn request_calendar_reminder(&self, reminder: Reminder) -> ClientResult<GateOutcome> {
        if self.auth.is_authenticated() {
            return match self.submitter.submit(reminder).await? {
                SubmitOutcome::Submitted => Ok(GateOutcome::Submitted),
                SubmitOutcome::AlreadyInFlight => Ok(GateOutcome::AlreadyInFlight),
            };
        }

        warn!("calendar access required for {}", reminder);
        self.transition(PromptEvent::GateRejected);
        if !self.pending.push(reminder)? {
            debug!("reminder already queued for after login");
        }
        Ok(GateOutcome::LoginRequired)
    }

    /// Current prompt state.
    pub fn prompt_state(&self) -> PromptState {
        *self.prompt.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Closes the prompt without logging in. Queued reminders are dropped.
    pub fn dismiss_prompt(&self) -> ClientResult<()> {
        self.transition(PromptEvent::Dismissed);
        let dropped = self.pending.take_all()?;
        if !dropped.is_empty() {
            info!("dropped {} reminder(s) waiting for login", dropped.len());
        }
        Ok(())
    }

    /// Closes the prompt and returns the consent URL to send the user to.
    ///
    /// Queued reminders stay queued until the callback completes.
    pub fn accept_relogin(&self) -> ClientResult<Url> {
        let request = self.authorization.as_ref().ok_or_else(|| {
            ClientError::Config("Google client_id is not configured".to_string())
        })?;
        let url = request.build_url()?;
        self.transition(PromptEvent::ReloginAccepted);
        Ok(url)
    }

    /// Hides the prompt after a token has been stored.
    pub fn login_completed(&self) {
        self.transition(PromptEvent::LoginCompleted);
    }

    fn transition(&self, event: PromptEvent) {
        let mut state = self.prompt.lock().unwrap_or_else(PoisonError::into_inner);
        let next = state.next(event);
        if next != *state {
            debug!("login prompt {:?} -> {:?} on {:?}", *state, next, event);
        }
        *state = next;
    }
}
