//! Backend connection configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ApiError, ApiResult};

/// Where the backend lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, always ending with `/`.
    pub base_url: Url,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,
}

impl BackendConfig {
    /// Default backend address.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the given base URL.
    ///
    /// Only `http` and `https` URLs are accepted. A missing trailing slash is
    /// added so that endpoint paths resolve below any path prefix.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let mut url = Url::parse(base_url.trim()).map_err(|e| {
            ApiError::configuration(format!("invalid backend URL {:?}: {}", base_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::configuration(format!(
                "backend URL must use http or https, got {:?}",
                url.scheme()
            )));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self {
            base_url: url,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("remindme/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolves an endpoint path such as `api/todos` against the base URL.
    pub fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::internal(format!("failed to build URL for {}: {}", path, e)))
    }
}
