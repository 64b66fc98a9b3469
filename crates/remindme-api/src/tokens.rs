//! Access token persistence.
//!
//! The workflow never keeps the token in memory between decisions: every
//! check goes back to the [`TokenStore`], so a token written by another
//! process (or removed by the user) is seen immediately. Concurrent writers
//! are not coordinated; the last write wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::TokenGrant;
use crate::error::{ApiError, ApiResult};

/// Persistent storage for the calendar access token.
pub trait TokenStore: Send + Sync {
    /// Reads the persisted access token, if any.
    fn load(&self) -> ApiResult<Option<String>>;

    /// Persists a freshly obtained token, replacing any previous one.
    fn save(&self, grant: &TokenGrant) -> ApiResult<()>;

    /// Removes the persisted token.
    fn clear(&self) -> ApiResult<()>;
}

/// On-disk representation of a stored token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the token was obtained.
    pub obtained_at: DateTime<Utc>,
}

impl From<&TokenGrant> for StoredToken {
    fn from(grant: &TokenGrant) -> Self {
        Self {
            access_token: grant.access_token.clone(),
            token_type: grant.token_type.clone(),
            refresh_token: grant.refresh_token.clone(),
            obtained_at: Utc::now(),
        }
    }
}

/// Token storage backed by a JSON file.
///
/// Writes go to a temporary file that is renamed over the target, and the
/// file is made readable by the owner only on Unix.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store at the given path. Nothing is read until [`load`](TokenStore::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full stored record.
    pub fn read(&self) -> ApiResult<Option<StoredToken>> {
        if !self.path.exists() {
            debug!("no token file at {:?}", self.path);
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ApiError::storage(format!("failed to read token file: {}", e)).with_source(e)
        })?;

        let stored: StoredToken = serde_json::from_str(&content).map_err(|e| {
            ApiError::storage(format!("failed to parse token file: {}", e)).with_source(e)
        })?;

        Ok(Some(stored))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ApiResult<Option<String>> {
        Ok(self.read()?.map(|stored| stored.access_token))
    }

    fn save(&self, grant: &TokenGrant) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::storage(format!("failed to create token directory: {}", e))
                    .with_source(e)
            })?;
        }

        let content = serde_json::to_string_pretty(&StoredToken::from(grant))
            .map_err(|e| ApiError::internal(format!("failed to serialize token: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| {
            ApiError::storage(format!("failed to write token file: {}", e)).with_source(e)
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ApiError::storage(format!("failed to rename token file: {}", e)).with_source(e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        info!("saved access token to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                ApiError::storage(format!("failed to remove token file: {}", e)).with_source(e)
            })?;
            info!("cleared access token from {:?}", self.path);
        }
        Ok(())
    }
}

/// Token storage held in process memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `access_token`.
    pub fn with_token(access_token: impl Into<String>) -> Self {
        let stored = StoredToken::from(&TokenGrant::new(access_token));
        Self {
            token: RwLock::new(Some(stored)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ApiResult<Option<String>> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.as_ref().map(|stored| stored.access_token.clone()))
    }

    fn save(&self, grant: &TokenGrant) -> ApiResult<()> {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(StoredToken::from(grant));
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        Ok(())
    }
}
