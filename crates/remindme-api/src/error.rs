//! Error types for backend, token storage and authorization operations.
//!
//! Every failure is classified by an [`ApiErrorCode`]. The workflow only
//! distinguishes two families: authentication failures (the user must log in
//! again) and everything else, which is treated as a network failure.

use std::fmt;
use thiserror::Error;

/// The category of an API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorCode {
    /// The token exchange or an authenticated call was rejected.
    AuthenticationFailed,
    /// Connection failed, timed out or the response could not be read.
    NetworkError,
    /// The backend answered with a 5xx status.
    ServerError,
    /// The response body did not have the expected shape.
    InvalidResponse,
    /// The addressed todo does not exist (404).
    NotFound,
    /// The backend rejected the request (400).
    BadRequest,
    /// Missing or invalid client configuration.
    ConfigurationError,
    /// Reading or writing local persisted state failed.
    StorageError,
    /// Unexpected internal state.
    InternalError,
}

impl ApiErrorCode {
    /// Returns true if the user has to authorize again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }

    /// Returns true if the failure happened talking to the backend.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            Self::NetworkError
                | Self::ServerError
                | Self::InvalidResponse
                | Self::NotFound
                | Self::BadRequest
        )
    }

    /// Returns a stable snake_case name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
            Self::StorageError => "storage_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while talking to the backend or handling local auth state.
#[derive(Debug, Error)]
pub struct ApiError {
    code: ApiErrorCode,
    message: String,
    /// The endpoint path involved, e.g. `/api/reminder`.
    endpoint: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    /// Creates a new error with the given code and message.
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            endpoint: None,
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::AuthenticationFailed, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NetworkError, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::BadRequest, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ConfigurationError, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::StorageError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InternalError, message)
    }

    /// Records which endpoint produced this error.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ApiErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Returns true if the user has to authorize again.
    pub fn is_auth_failure(&self) -> bool {
        self.code.is_auth_failure()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref endpoint) = self.endpoint {
            write!(f, "[{}] ", endpoint)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_families() {
        assert!(ApiErrorCode::AuthenticationFailed.is_auth_failure());
        assert!(!ApiErrorCode::AuthenticationFailed.is_network_failure());
        assert!(ApiErrorCode::NetworkError.is_network_failure());
        assert!(ApiErrorCode::ServerError.is_network_failure());
        assert!(!ApiErrorCode::StorageError.is_network_failure());
        assert!(!ApiErrorCode::StorageError.is_auth_failure());
    }

    #[test]
    fn error_code_display() {
        assert_eq!(
            ApiErrorCode::AuthenticationFailed.as_str(),
            "authentication_failed"
        );
        assert_eq!(ApiErrorCode::NotFound.to_string(), "not_found");
    }

    #[test]
    fn error_display_includes_endpoint() {
        let err = ApiError::server("boom").with_endpoint("/api/reminder");
        assert_eq!(err.to_string(), "[/api/reminder] server_error: boom");
        assert_eq!(err.endpoint(), Some("/api/reminder"));
    }

    #[test]
    fn error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("disk full");
        let err = ApiError::storage("failed to write token").with_source(io_err);
        assert!(err.source().is_some());
        assert_eq!(err.code(), ApiErrorCode::StorageError);
    }
}
