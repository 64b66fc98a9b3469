//! Client error types.

use std::fmt;

use remindme_api::{ApiError, ApiErrorCode};
use remindme_core::CoreError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Invalid user input (blank title, bad time, empty code).
    Input(String),
    /// A todo id that the board or backend does not know.
    NotFound(String),
    /// Authorization failed or is required.
    Auth(String),
    /// The backend could not be reached or answered with an error.
    Network(String),
    /// Local token or queue storage failed.
    Storage(String),
    /// IO error.
    Io(std::io::Error),
    /// Action failed (opening the browser, reading the terminal).
    Action(String),
}

impl ClientError {
    /// Returns true for failures of the authorization step.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Returns true for failures talking to the backend.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Input(msg) => write!(f, "invalid input: {}", msg),
            Self::NotFound(msg) => write!(f, "not found: {}", msg),
            Self::Auth(msg) => write!(f, "authentication failed: {}", msg),
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::Storage(msg) => write!(f, "storage error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Action(msg) => write!(f, "action failed: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        Self::Input(err.to_string())
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        let msg = err.to_string();
        match err.code() {
            ApiErrorCode::AuthenticationFailed => Self::Auth(msg),
            ApiErrorCode::NotFound => Self::NotFound(msg),
            ApiErrorCode::BadRequest => Self::Input(msg),
            ApiErrorCode::ConfigurationError => Self::Config(msg),
            ApiErrorCode::StorageError => Self::Storage(msg),
            ApiErrorCode::NetworkError
            | ApiErrorCode::ServerError
            | ApiErrorCode::InvalidResponse
            | ApiErrorCode::InternalError => Self::Network(msg),
        }
    }
}
