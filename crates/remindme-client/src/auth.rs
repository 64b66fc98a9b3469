//! Whether calendar actions are allowed.

use std::sync::Arc;

use remindme_api::TokenStore;
use tracing::warn;

/// Answers "is there a usable access token?" by asking the token store.
///
/// Nothing is cached: a token saved or removed by another process is seen on
/// the next call.
#[derive(Clone)]
pub struct AuthState {
    store: Arc<dyn TokenStore>,
}

impl AuthState {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Returns true if a non-empty access token is persisted.
    ///
    /// An unreadable store counts as unauthenticated.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Returns the persisted access token, if usable.
    pub fn access_token(&self) -> Option<String> {
        match self.store.load() {
            Ok(Some(token)) if !token.trim().is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                warn!("treating unreadable token store as signed out: {}", e);
                None
            }
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remindme_api::{FileTokenStore, MemoryTokenStore, TokenGrant};

    #[test]
    fn empty_store_is_signed_out() {
        let auth = AuthState::new(Arc::new(MemoryTokenStore::new()));
        assert!(!auth.is_authenticated());
        assert_eq!(auth.access_token(), None);
    }

    #[test]
    fn blank_token_is_signed_out() {
        let auth = AuthState::new(Arc::new(MemoryTokenStore::with_token("  ")));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn is_authenticated_is_idempotent() {
        let auth = AuthState::new(Arc::new(MemoryTokenStore::with_token("tok-xyz")));
        assert!(auth.is_authenticated());
        assert!(auth.is_authenticated());
        assert_eq!(auth.access_token().as_deref(), Some("tok-xyz"));
    }

    #[test]
    fn sees_changes_made_through_the_store() {
        let store = Arc::new(MemoryTokenStore::new());
        let auth = AuthState::new(store.clone());
        assert!(!auth.is_authenticated());

        store.save(&TokenGrant::new("tok-xyz")).unwrap();
        assert!(auth.is_authenticated());

        store.clear().unwrap();
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn corrupt_token_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{ not json").unwrap();

        let auth = AuthState::new(Arc::new(FileTokenStore::new(&path)));
        assert!(!auth.is_authenticated());
    }
}
