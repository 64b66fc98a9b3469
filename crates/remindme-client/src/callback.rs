//! Completing the login: code in, token stored, queued reminders replayed.

use std::sync::Arc;

use remindme_api::RemindBackend;
use tracing::{error, info, warn};

use crate::auth::AuthState;
use crate::error::{ClientError, ClientResult};
use crate::pending::PendingRequests;
use crate::submitter::{ReminderSubmitter, SubmitOutcome};

/// Result of a successful callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallbackOutcome {
    /// Queued reminders that were sent.
    pub replayed: usize,
    /// Queued reminders whose submission failed. They are not retried.
    pub failed: usize,
}

pub struct OAuthCallbackHandler {
    backend: Arc<dyn RemindBackend>,
    auth: AuthState,
    pending: Arc<PendingRequests>,
    submitter: Arc<ReminderSubmitter>,
}

impl OAuthCallbackHandler {
    pub fn new(
        backend: Arc<dyn RemindBackend>,
        auth: AuthState,
        pending: Arc<PendingRequests>,
        submitter: Arc<ReminderSubmitter>,
    ) -> Self {
        Self {
            backend,
            auth,
            pending,
            submitter,
        }
    }

    /// Exchanges `code` for an access token, stores it and replays queued
    /// reminders once.
    ///
    /// On failure the stored token and the queue are left untouched.
    pub async fn handle_callback(&self, code: &str) -> ClientResult<CallbackOutcome> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ClientError::Input("authorization code is empty".to_string()));
        }

        let grant = match self.backend.exchange_code(code.to_string()).await {
            Ok(grant) => grant,
            Err(e) => {
                error!("authorization code exchange failed: {}", e);
                return Err(ClientError::Auth(e.to_string()));
            }
        };

        if grant.access_token.trim().is_empty() {
            error!("backend returned an empty access token");
            return Err(ClientError::Auth(
                "backend returned an empty access token".to_string(),
            ));
        }

        self.auth.store().save(&grant)?;
        info!("calendar access granted");

        self.replay_pending().await
    }

    async fn replay_pending(&self) -> ClientResult<CallbackOutcome> {
        let queued = self.pending.take_all()?;
        let mut outcome = CallbackOutcome::default();

        for reminder in queued {
            match self.submitter.submit(reminder).await {
                Ok(SubmitOutcome::Submitted) => outcome.replayed += 1,
                Ok(SubmitOutcome::AlreadyInFlight) => {}
                // Already logged by the submitter.
                Err(_) => outcome.failed += 1,
            }
        }

        if outcome.failed > 0 {
            warn!(
                "{} of {} queued reminder(s) could not be set",
                outcome.failed,
                outcome.replayed + outcome.failed
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, reminder};
    use remindme_api::{MemoryTokenStore, TokenStore};

    struct Fixture {
        backend: Arc<FakeBackend>,
        store: Arc<MemoryTokenStore>,
        pending: Arc<PendingRequests>,
        handler: OAuthCallbackHandler,
    }

    fn fixture() -> Fixture {
        let backend = Arc::new(FakeBackend::new());
        let store = Arc::new(MemoryTokenStore::new());
        let pending = Arc::new(PendingRequests::in_memory());
        let handler = OAuthCallbackHandler::new(
            backend.clone(),
            AuthState::new(store.clone()),
            pending.clone(),
            Arc::new(ReminderSubmitter::new(backend.clone())),
        );
        Fixture {
            backend,
            store,
            pending,
            handler,
        }
    }

    #[tokio::test]
    async fn successful_exchange_stores_token() {
        let f = fixture();
        f.backend.grant_token("tok-xyz");

        let outcome = f.handler.handle_callback("abc123").await.unwrap();

        assert_eq!(outcome, CallbackOutcome::default());
        assert_eq!(f.backend.codes(), vec!["abc123".to_string()]);
        assert_eq!(f.store.load().unwrap().as_deref(), Some("tok-xyz"));
        assert!(AuthState::new(f.store.clone()).is_authenticated());
    }

    #[tokio::test]
    async fn failed_exchange_leaves_user_signed_out() {
        let f = fixture();

        let err = f.handler.handle_callback("abc123").await.unwrap_err();

        assert!(err.is_auth_failure());
        assert_eq!(f.store.load().unwrap(), None);
        assert!(!AuthState::new(f.store.clone()).is_authenticated());
    }

    #[tokio::test]
    async fn empty_code_is_rejected_without_a_request() {
        let f = fixture();
        f.backend.grant_token("tok-xyz");

        let err = f.handler.handle_callback("  ").await.unwrap_err();

        assert!(matches!(err, ClientError::Input(_)));
        assert!(f.backend.codes().is_empty());
    }

    #[tokio::test]
    async fn empty_token_is_an_auth_failure() {
        let f = fixture();
        f.backend.grant_token("");

        let err = f.handler.handle_callback("abc123").await.unwrap_err();

        assert!(err.is_auth_failure());
        assert_eq!(f.store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn queued_reminders_are_replayed_once() {
        let f = fixture();
        f.backend.grant_token("tok-xyz");
        f.pending.push(reminder("Dentist")).unwrap();
        f.pending.push(reminder("Gym")).unwrap();

        let outcome = f.handler.handle_callback("abc123").await.unwrap();

        assert_eq!(outcome.replayed, 2);
        assert_eq!(outcome.failed, 0);
        assert_eq!(
            f.backend.submitted(),
            vec![reminder("Dentist"), reminder("Gym")]
        );
        assert!(f.pending.is_empty());

        // A second login does not send them again.
        f.handler.handle_callback("def456").await.unwrap();
        assert_eq!(f.backend.reminder_calls(), 2);
    }

    #[tokio::test]
    async fn failed_exchange_keeps_queue_and_sends_nothing() {
        let f = fixture();
        f.pending.push(reminder("Dentist")).unwrap();

        f.handler.handle_callback("abc123").await.unwrap_err();

        assert_eq!(f.backend.reminder_calls(), 0);
        assert_eq!(f.pending.len(), 1);
    }

    #[tokio::test]
    async fn replay_failures_are_counted_not_retried() {
        let f = fixture();
        f.backend.grant_token("tok-xyz");
        f.backend.fail_reminders();
        f.pending.push(reminder("Dentist")).unwrap();

        let outcome = f.handler.handle_callback("abc123").await.unwrap();

        assert_eq!(outcome, CallbackOutcome { replayed: 0, failed: 1 });
        assert_eq!(f.backend.reminder_calls(), 1);
        assert!(f.pending.is_empty());
        assert!(AuthState::new(f.store.clone()).is_authenticated());
    }
}
