//! Wiring of the workflow components and the serializable view.

use std::sync::Arc;

use remindme_api::{
    AuthorizationRequest, FileTokenStore, HttpBackend, RemindBackend, TokenStore,
};
use remindme_core::{Reminder, Todo, TodoId};
use serde::Serialize;
use tracing::debug;

use crate::auth::AuthState;
use crate::board::TodoBoard;
use crate::callback::{CallbackOutcome, OAuthCallbackHandler};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::gate::{GateOutcome, LoginGate};
use crate::pending::PendingRequests;
use crate::submitter::ReminderSubmitter;

/// Everything a front end renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub todos: Vec<Todo>,
    pub is_authenticated: bool,
    pub show_login_prompt: bool,
    pub pending_reminders: Vec<Reminder>,
}

/// The todo board plus the login-gated calendar workflow, sharing one
/// backend, token store and pending queue.
pub struct RemindApp {
    auth: AuthState,
    pending: Arc<PendingRequests>,
    board: TodoBoard,
    gate: LoginGate,
    callback: OAuthCallbackHandler,
}

impl RemindApp {
    pub fn new(
        backend: Arc<dyn RemindBackend>,
        store: Arc<dyn TokenStore>,
        pending: Arc<PendingRequests>,
        authorization: Option<AuthorizationRequest>,
    ) -> Self {
        let auth = AuthState::new(store);
        let submitter = Arc::new(ReminderSubmitter::new(backend.clone()));

        let mut gate = LoginGate::new(auth.clone(), pending.clone(), submitter.clone());
        if let Some(request) = authorization {
            gate = gate.with_authorization(request);
        }
        let callback =
            OAuthCallbackHandler::new(backend.clone(), auth.clone(), pending.clone(), submitter);

        Self {
            auth,
            pending,
            board: TodoBoard::new(backend),
            gate,
            callback,
        }
    }

    /// Builds the app from configuration: HTTP backend, token file and
    /// persisted pending queue.
    ///
    /// A missing Google client id only disables re-login from the prompt.
    pub fn from_config(config: &ClientConfig, client_id: Option<&str>) -> ClientResult<Self> {
        let backend = HttpBackend::new(config.backend_config()?)?;
        let store = FileTokenStore::new(config.token_path());
        let pending = PendingRequests::persisted(config.pending_path());

        let authorization = match config.authorization_request(client_id) {
            Ok(request) => Some(request),
            Err(e) => {
                debug!("re-login unavailable: {}", e);
                None
            }
        };

        Ok(Self::new(
            Arc::new(backend),
            Arc::new(store),
            Arc::new(pending),
            authorization,
        ))
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    pub fn board(&self) -> &TodoBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut TodoBoard {
        &mut self.board
    }

    pub fn gate(&self) -> &LoginGate {
        &self.gate
    }

    /// Sends the calendar reminder of a todo through the login gate.
    pub async fn remind_todo(&self, id: &TodoId) -> ClientResult<GateOutcome> {
        let reminder = self.board.reminder_for(id)?;
        self.gate.request_calendar_reminder(reminder).await
    }

    /// Completes a login and hides the prompt.
    pub async fn complete_login(&self, code: &str) -> ClientResult<CallbackOutcome> {
        let outcome = self.callback.handle_callback(code).await?;
        self.gate.login_completed();
        Ok(outcome)
    }

    /// Snapshot of the current state.
    pub fn view(&self) -> ViewModel {
        ViewModel {
            todos: self.board.todos().to_vec(),
            is_authenticated: self.auth.is_authenticated(),
            show_login_prompt: self.gate.prompt_state().is_shown(),
            pending_reminders: self.pending.snapshot(),
        }
    }
}
