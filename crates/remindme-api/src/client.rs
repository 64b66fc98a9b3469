//! HTTP client for the reminder backend.
//!
//! Handles request building, status mapping and response parsing for the six
//! backend endpoints. Every call is a single request with no retry.

use remindme_core::{Reminder, Todo, TodoId, TodoPatch};
use serde::Serialize;
use tracing::{debug, info};

use crate::backend::{BoxFuture, RemindBackend, TokenGrant};
use crate::config::BackendConfig;
use crate::error::{ApiError, ApiResult};

const TODOS_PATH: &str = "api/todos";
const OAUTH_CALLBACK_PATH: &str = "api/oauth2callback";
const REMINDER_PATH: &str = "api/reminder";

/// [`RemindBackend`] implementation talking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: BackendConfig,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct CodeExchangeBody<'a> {
    code: &'a str,
}

impl HttpBackend {
    /// Creates a backend client from the given configuration.
    pub fn new(config: BackendConfig) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ApiError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn todo_path(id: &TodoId) -> String {
        format!("{}/{}", TODOS_PATH, urlencoding::encode(id.as_str()))
    }

    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> ApiResult<reqwest::Response> {
        request
            .send()
            .await
            .map_err(|e| transport_error(e, endpoint))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> ApiResult<reqwest::Response> {
        let response = self.dispatch(request, endpoint).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = failure_message(response).await;
        let err = match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                ApiError::authentication(message)
            }
            reqwest::StatusCode::NOT_FOUND => ApiError::not_found(message),
            reqwest::StatusCode::BAD_REQUEST => ApiError::bad_request(message),
            _ => ApiError::server(message),
        };
        Err(err.with_endpoint(endpoint))
    }

    async fn read_json<T>(response: reqwest::Response, endpoint: &str) -> ApiResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = response.text().await.map_err(|e| {
            ApiError::network(format!("failed to read response: {}", e)).with_endpoint(endpoint)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            ApiError::invalid_response(format!("failed to parse response: {}", e))
                .with_endpoint(endpoint)
        })
    }

    async fn fetch_todos(&self) -> ApiResult<Vec<Todo>> {
        let url = self.config.endpoint(TODOS_PATH)?;
        let response = self.send(self.http_client.get(url), TODOS_PATH).await?;

        // An empty list is encoded as `null` by the backend.
        let todos: Option<Vec<Todo>> = Self::read_json(response, TODOS_PATH).await?;
        let todos = todos.unwrap_or_default();
        debug!("fetched {} todos", todos.len());
        Ok(todos)
    }

    async fn post_todo(&self, draft: Reminder) -> ApiResult<Todo> {
        let url = self.config.endpoint(TODOS_PATH)?;
        let response = self
            .send(self.http_client.post(url).json(&draft), TODOS_PATH)
            .await?;
        let todo: Todo = Self::read_json(response, TODOS_PATH).await?;
        debug!("created todo {}", todo.id);
        Ok(todo)
    }

    async fn put_todo(&self, id: TodoId, patch: TodoPatch) -> ApiResult<()> {
        let path = Self::todo_path(&id);
        let url = self.config.endpoint(&path)?;
        self.send(self.http_client.put(url).json(&patch), &path)
            .await?;
        debug!("updated todo {}", id);
        Ok(())
    }

    async fn remove_todo(&self, id: TodoId) -> ApiResult<()> {
        let path = Self::todo_path(&id);
        let url = self.config.endpoint(&path)?;
        self.send(self.http_client.delete(url), &path).await?;
        debug!("deleted todo {}", id);
        Ok(())
    }

    async fn post_code(&self, code: String) -> ApiResult<TokenGrant> {
        let url = self.config.endpoint(OAUTH_CALLBACK_PATH)?;
        let request = self
            .http_client
            .post(url)
            .json(&CodeExchangeBody { code: &code });

        let response = self.dispatch(request, OAUTH_CALLBACK_PATH).await?;

        // Any rejection of the exchange, whatever the status, leaves the user
        // unauthenticated.
        if !response.status().is_success() {
            let message = failure_message(response).await;
            return Err(
                ApiError::authentication(format!("token exchange failed: {}", message))
                    .with_endpoint(OAUTH_CALLBACK_PATH),
            );
        }

        let grant: TokenGrant = Self::read_json(response, OAUTH_CALLBACK_PATH)
            .await
            .map_err(|e| {
                ApiError::authentication(format!("invalid token response: {}", e.message()))
                    .with_endpoint(OAUTH_CALLBACK_PATH)
            })?;

        info!("exchanged authorization code for an access token");
        Ok(grant)
    }

    async fn post_reminder(&self, reminder: Reminder) -> ApiResult<()> {
        let url = self.config.endpoint(REMINDER_PATH)?;
        self.send(self.http_client.post(url).json(&reminder), REMINDER_PATH)
            .await?;
        info!("registered calendar reminder {}", reminder);
        Ok(())
    }
}

async fn failure_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("backend returned {}: {}", status, body.trim())
}

fn transport_error(e: reqwest::Error, endpoint: &str) -> ApiError {
    let message = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    };
    ApiError::network(message).with_endpoint(endpoint)
}

impl RemindBackend for HttpBackend {
    fn list_todos(&self) -> BoxFuture<'_, ApiResult<Vec<Todo>>> {
        Box::pin(self.fetch_todos())
    }

    fn create_todo(&self, draft: Reminder) -> BoxFuture<'_, ApiResult<Todo>> {
        Box::pin(self.post_todo(draft))
    }

    fn update_todo(&self, id: TodoId, patch: TodoPatch) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(self.put_todo(id, patch))
    }

    fn delete_todo(&self, id: TodoId) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(self.remove_todo(id))
    }

    fn exchange_code(&self, code: String) -> BoxFuture<'_, ApiResult<TokenGrant>> {
        Box::pin(self.post_code(code))
    }

    fn submit_reminder(&self, reminder: Reminder) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(self.post_reminder(reminder))
    }
}
