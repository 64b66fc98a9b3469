//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/remindme/config.toml` by default:
//!
//! ```toml
//! debug = false
//! log_format = "compact"  # pretty, compact or json
//!
//! [api]
//! base_url = "http://localhost:8000"
//! timeout = 30
//!
//! [google]
//! client_id = "env::GOOGLE_CLIENT_ID"
//! redirect_uri = "http://localhost:3000"
//!
//! [storage]
//! token_path = "/home/me/.local/share/remindme/token.json"
//! ```
//!
//! `client_id` supports secret references (see [`crate::secret`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use remindme_api::{AuthorizationRequest, BackendConfig, CALENDAR_SCOPE};
use remindme_core::LogFormat;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the remindme client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Layout of log lines on stderr.
    pub log_format: Option<LogFormat>,

    /// Backend connection settings.
    pub api: ApiSettings,

    /// Google authorization settings.
    pub google: GoogleSettings,

    /// Where local state is kept.
    pub storage: StorageSettings,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the reminder backend.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: BackendConfig::DEFAULT_BASE_URL.to_string(),
            timeout: BackendConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Google OAuth settings used to build the consent URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client ID (supports `pass::` and `env::` prefixes).
    pub client_id: Option<String>,

    /// Where Google sends the user back to with `?code=`.
    pub redirect_uri: String,

    /// Requested scope.
    pub scope: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            redirect_uri: "http://localhost:3000".to_string(),
            scope: CALENDAR_SCOPE.to_string(),
        }
    }
}

/// Local state locations. Unset paths fall back to the data directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Access token file.
    pub token_path: Option<PathBuf>,

    /// Queue of reminders waiting for a login.
    pub pending_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("remindme")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("remindme")
    }

    /// Path of the access token file.
    pub fn token_path(&self) -> PathBuf {
        self.storage
            .token_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("token.json"))
    }

    /// Path of the pending reminder queue.
    pub fn pending_path(&self) -> PathBuf {
        self.storage
            .pending_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("pending.json"))
    }

    /// Builds the backend connection settings.
    pub fn backend_config(&self) -> ClientResult<BackendConfig> {
        if self.api.timeout == 0 {
            return Err(ClientError::Config("api.timeout must be at least 1 second".into()));
        }
        Ok(BackendConfig::new(&self.api.base_url)?
            .with_timeout(Duration::from_secs(self.api.timeout)))
    }

    /// Builds the Google consent request.
    ///
    /// `client_id` overrides the configured value; either way it goes through
    /// [`crate::secret::resolve`].
    pub fn authorization_request(
        &self,
        client_id: Option<&str>,
    ) -> ClientResult<AuthorizationRequest> {
        let raw_id = client_id
            .or(self.google.client_id.as_deref())
            .ok_or_else(|| {
                ClientError::Config(format!(
                    "Google client_id not found. Add to {}:\n  \
                     [google]\n  \
                     client_id = \"YOUR_ID.apps.googleusercontent.com\"\n\n  \
                     Or run: remindme auth login --client-id <ID>",
                    Self::default_path().display()
                ))
            })?;

        let resolved = crate::secret::resolve(raw_id)
            .map_err(|e| ClientError::Config(format!("failed to resolve client_id: {}", e)))?;

        let request = AuthorizationRequest::new(resolved, self.google.redirect_uri.clone())
            .with_scope(self.google.scope.clone());
        request.validate()?;
        Ok(request)
    }
}
