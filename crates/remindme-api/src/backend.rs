//! The [`RemindBackend`] trait: everything the workflow needs from the server.
//!
//! The production implementation is [`HttpBackend`](crate::HttpBackend);
//! tests substitute in-memory fakes.

use std::future::Future;
use std::pin::Pin;

use remindme_core::{Reminder, Todo, TodoId, TodoPatch};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Token response of `POST /api/oauth2callback`.
///
/// The backend relays the provider's token as-is, so only `access_token` is
/// required; the remaining fields are kept when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenGrant {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            refresh_token: None,
        }
    }
}

/// Operations exposed by the reminder backend.
///
/// Each method is exactly one request; implementations never retry.
pub trait RemindBackend: Send + Sync {
    /// `GET /api/todos`
    fn list_todos(&self) -> BoxFuture<'_, ApiResult<Vec<Todo>>>;

    /// `POST /api/todos`, returning the created todo with its new id.
    fn create_todo(&self, draft: Reminder) -> BoxFuture<'_, ApiResult<Todo>>;

    /// `PUT /api/todos/{id}`
    fn update_todo(&self, id: TodoId, patch: TodoPatch) -> BoxFuture<'_, ApiResult<()>>;

    /// `DELETE /api/todos/{id}`
    fn delete_todo(&self, id: TodoId) -> BoxFuture<'_, ApiResult<()>>;

    /// `POST /api/oauth2callback`: trades an authorization code for a token.
    fn exchange_code(&self, code: String) -> BoxFuture<'_, ApiResult<TokenGrant>>;

    /// `POST /api/reminder`: registers the reminder in the user's calendar.
    fn submit_reminder(&self, reminder: Reminder) -> BoxFuture<'_, ApiResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_grant_reads_relayed_provider_token() {
        let json = r#"{
            "access_token": "tok-xyz",
            "token_type": "Bearer",
            "refresh_token": "ref-1",
            "expiry": "2024-05-01T11:00:00Z"
        }"#;
        let grant: TokenGrant = serde_json::from_str(json).unwrap();
        assert_eq!(grant.access_token, "tok-xyz");
        assert_eq!(grant.token_type.as_deref(), Some("Bearer"));
        assert_eq!(grant.refresh_token.as_deref(), Some("ref-1"));
    }

    #[test]
    fn token_grant_requires_snake_case_field() {
        let json = r#"{"accessToken": "tok-xyz"}"#;
        assert!(serde_json::from_str::<TokenGrant>(json).is_err());
    }
}
