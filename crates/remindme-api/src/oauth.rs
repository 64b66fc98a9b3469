//! Google authorization helpers.
//!
//! The backend performs the actual code-for-token exchange; the client only
//! needs to:
//!
//! 1. Build the consent URL the user is sent to ([`AuthorizationRequest`])
//! 2. Pull the authorization code out of whatever comes back: a pasted
//!    redirect URL, a bare code ([`code_from_redirect`]), or a redirect
//!    captured on a loopback address ([`LoopbackReceiver`])

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Google's OAuth consent endpoint.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Scope granting read/write access to the user's calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Parameters of the consent redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl AuthorizationRequest {
    /// Creates a request for the calendar scope.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope: CALENDAR_SCOPE.to_string(),
        }
    }

    /// Overrides the requested scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Checks that the request can be sent to Google.
    pub fn validate(&self) -> ApiResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(ApiError::configuration("Google client_id is required"));
        }
        if self.scope.trim().is_empty() {
            return Err(ApiError::configuration("an OAuth scope is required"));
        }
        let redirect = Url::parse(&self.redirect_uri).map_err(|e| {
            ApiError::configuration(format!(
                "invalid redirect_uri {:?}: {}",
                self.redirect_uri, e
            ))
        })?;
        if !matches!(redirect.scheme(), "http" | "https") {
            return Err(ApiError::configuration(
                "redirect_uri must use http or https",
            ));
        }
        Ok(())
    }

    /// Builds the consent URL.
    pub fn build_url(&self) -> ApiResult<Url> {
        self.validate()?;
        Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", self.scope.as_str()),
            ],
        )
        .map_err(|e| ApiError::internal(format!("failed to build authorization URL: {}", e)))
    }
}

/// Extracts the authorization code from user input.
///
/// Accepts a full `http(s)` redirect URL, a bare query string starting with
/// `?`, or the code itself. An `error` parameter (e.g. `access_denied`) is
/// reported as an authentication failure.
pub fn code_from_redirect(input: &str) -> ApiResult<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ApiError::bad_request("authorization code is empty"));
    }

    if let Some(query) = input.strip_prefix('?') {
        return code_from_query(query);
    }

    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            code_from_query(url.query().unwrap_or_default())
        }
        _ => Ok(input.to_string()),
    }
}

fn code_from_query(query: &str) -> ApiResult<String> {
    let mut code = None;
    let mut error = None;

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(ApiError::authentication(format!(
            "authorization denied: {}",
            error
        )));
    }

    match code {
        Some(code) if !code.trim().is_empty() => Ok(code),
        Some(_) => Err(ApiError::bad_request("authorization code is empty")),
        None => Err(ApiError::bad_request(
            "redirect URL has no code parameter",
        )),
    }
}

/// Waits for Google's redirect on a loopback `redirect_uri`.
///
/// Only usable when the configured redirect URI points at this machine, e.g.
/// `http://127.0.0.1:8085/callback`.
#[derive(Debug)]
pub struct LoopbackReceiver {
    listener: TcpListener,
    path: String,
}

impl LoopbackReceiver {
    /// Binds the address named by `redirect_uri`.
    pub async fn bind(redirect_uri: &str) -> ApiResult<Self> {
        let url = Url::parse(redirect_uri).map_err(|e| {
            ApiError::configuration(format!("invalid redirect_uri {:?}: {}", redirect_uri, e))
        })?;

        if url.scheme() != "http" {
            return Err(ApiError::configuration(
                "loopback redirect_uri must use plain http",
            ));
        }

        let ip = match url.host_str() {
            Some("localhost") => IpAddr::V4(Ipv4Addr::LOCALHOST),
            Some(host) => host
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
                .map_err(|_| {
                    ApiError::configuration(format!("redirect host {:?} is not an IP address", host))
                })?,
            None => return Err(ApiError::configuration("redirect_uri has no host")),
        };
        if !ip.is_loopback() {
            return Err(ApiError::configuration(format!(
                "redirect host {} is not a loopback address",
                ip
            )));
        }

        let port = url.port_or_known_default().unwrap_or(80);
        let listener = TcpListener::bind(SocketAddr::new(ip, port))
            .await
            .map_err(|e| {
                ApiError::configuration(format!("failed to listen on {}:{}: {}", ip, port, e))
                    .with_source(e)
            })?;

        debug!("listening for OAuth redirect on {}:{}", ip, port);
        Ok(Self {
            listener,
            path: url.path().to_string(),
        })
    }

    /// Returns the bound address.
    pub fn local_addr(&self) -> ApiResult<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| ApiError::internal(format!("failed to read listener address: {}", e)))
    }

    /// Accepts connections until one carries the redirect, or `timeout` passes.
    pub async fn wait_for_code(self, timeout: Duration) -> ApiResult<String> {
        match tokio::time::timeout(timeout, self.accept_redirect()).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::authentication(
                "timed out waiting for the OAuth redirect",
            )),
        }
    }

    async fn accept_redirect(&self) -> ApiResult<String> {
        loop {
            let (stream, peer) = self.listener.accept().await.map_err(|e| {
                ApiError::network(format!("failed to accept connection: {}", e))
            })?;
            debug!("redirect connection from {}", peer);

            match Self::handle_request(stream, &self.path).await {
                Some(result) => return result,
                None => continue,
            }
        }
    }

    /// Answers one HTTP request. Returns `None` for requests that are not
    /// the redirect (e.g. the browser asking for `/favicon.ico`).
    async fn handle_request(mut stream: TcpStream, path: &str) -> Option<ApiResult<String>> {
        let (reader, mut writer) = stream.split();
        let mut reader = BufReader::new(reader);

        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await.is_err() {
            return None;
        }

        // Drain headers so closing the socket does not reset the connection.
        let mut header = String::new();
        loop {
            header.clear();
            match reader.read_line(&mut header).await {
                Ok(0) => break,
                Ok(_) if header == "\r\n" || header == "\n" => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }

        // GET /callback?code=...&scope=... HTTP/1.1
        let parts: Vec<&str> = request_line.split_whitespace().collect();
        let target = match parts.as_slice() {
            ["GET", target, ..] => *target,
            _ => {
                let _ = writer.write_all(NOT_FOUND_RESPONSE.as_bytes()).await;
                return None;
            }
        };

        let (request_path, query) = target.split_once('?').unwrap_or((target, ""));
        if request_path != path {
            let _ = writer.write_all(NOT_FOUND_RESPONSE.as_bytes()).await;
            return None;
        }

        let result = code_from_query(query);
        let response = if result.is_ok() {
            SUCCESS_RESPONSE
        } else {
            FAILURE_RESPONSE
        };
        if let Err(e) = writer.write_all(response.as_bytes()).await {
            warn!("failed to answer the browser: {}", e);
        }
        let _ = writer.flush().await;

        if result.is_ok() {
            info!("received authorization code on loopback redirect");
        }
        Some(result)
    }
}

const SUCCESS_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Authorization Successful</h1>\
    <p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_RESPONSE: &str = "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Authorization Failed</h1>\
    <p>You can close this window.</p></body></html>";

const NOT_FOUND_RESPONSE: &str =
    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
