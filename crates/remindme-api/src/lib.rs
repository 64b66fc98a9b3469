//! Talking to the reminder backend.
//!
//! - [`RemindBackend`] - The operations the workflow needs from the server
//! - [`HttpBackend`] - The reqwest-based implementation
//! - [`TokenStore`] - Where the calendar access token lives between runs
//! - [`AuthorizationRequest`] / [`code_from_redirect`] - Google consent helpers
//! - [`ApiError`] - Error types for all of the above
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────┐  consent URL   ┌──────────────────┐
//!  │ Authorization│ ─────────────▶ │ accounts.google  │
//!  │   Request    │                └────────┬─────────┘
//!  └──────────────┘                         │ ?code=...
//!                                           ▼
//!  ┌──────────────┐  exchange_code ┌──────────────────┐
//!  │  HttpBackend │ ◀───────────── │ code_from_redirect│
//!  └──────┬───────┘                └──────────────────┘
//!         │ TokenGrant
//!         ▼
//!  ┌──────────────┐
//!  │  TokenStore  │
//!  └──────────────┘
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod oauth;
pub mod tokens;

pub use backend::{BoxFuture, RemindBackend, TokenGrant};
pub use client::HttpBackend;
pub use config::BackendConfig;
pub use error::{ApiError, ApiErrorCode, ApiResult};
pub use oauth::{
    AuthorizationRequest, CALENDAR_SCOPE, GOOGLE_AUTH_URL, LoopbackReceiver, code_from_redirect,
};
pub use tokens::{FileTokenStore, MemoryTokenStore, StoredToken, TokenStore};
