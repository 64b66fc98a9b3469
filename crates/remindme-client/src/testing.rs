//! In-memory backend for workflow tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use remindme_api::{ApiError, ApiResult, BoxFuture, RemindBackend, TokenGrant};
use remindme_core::{Reminder, ReminderTime, Todo, TodoId, TodoPatch};

/// Builds a reminder at a fixed time.
pub fn reminder(title: &str) -> Reminder {
    let at: ReminderTime = "2024-05-01T10:00:00-07:00".parse().unwrap();
    Reminder::new(title, at).unwrap()
}

/// Builds a todo as the backend would return it.
pub fn todo(id: &str, title: &str, at: Option<&str>) -> Todo {
    Todo {
        id: TodoId::new(id),
        title: title.to_string(),
        reminder: at.map(|s| s.parse().unwrap()),
    }
}

/// A [`RemindBackend`] that records every call.
#[derive(Default)]
pub struct FakeBackend {
    todos: Mutex<Vec<Todo>>,
    next_id: AtomicUsize,
    token: Mutex<Option<String>>,
    fail_todos: AtomicBool,
    fail_reminders: AtomicBool,

    submitted: Mutex<Vec<Reminder>>,
    codes: Mutex<Vec<String>>,
    updates: Mutex<Vec<(TodoId, TodoPatch)>>,
    list_calls: AtomicUsize,
    todo_calls: AtomicUsize,
    reminder_calls: AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let backend = Self::new();
        *lock(&backend.todos) = todos;
        backend
    }

    /// Makes `exchange_code` succeed with `token`.
    pub fn grant_token(&self, token: &str) {
        *lock(&self.token) = Some(token.to_string());
    }

    pub fn fail_todos(&self) {
        self.fail_todos.store(true, Ordering::SeqCst);
    }

    pub fn fail_reminders(&self) {
        self.fail_reminders.store(true, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<Reminder> {
        lock(&self.submitted).clone()
    }

    pub fn codes(&self) -> Vec<String> {
        lock(&self.codes).clone()
    }

    pub fn updates(&self) -> Vec<(TodoId, TodoPatch)> {
        lock(&self.updates).clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Create, update and delete calls.
    pub fn todo_calls(&self) -> usize {
        self.todo_calls.load(Ordering::SeqCst)
    }

    pub fn reminder_calls(&self) -> usize {
        self.reminder_calls.load(Ordering::SeqCst)
    }

    fn todos_unavailable(&self) -> Option<ApiError> {
        self.fail_todos
            .load(Ordering::SeqCst)
            .then(|| ApiError::network("connection refused").with_endpoint("api/todos"))
    }
}

impl RemindBackend for FakeBackend {
    fn list_todos(&self) -> BoxFuture<'_, ApiResult<Vec<Todo>>> {
        Box::pin(async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.todos_unavailable() {
                return Err(err);
            }
            Ok(lock(&self.todos).clone())
        })
    }

    fn create_todo(&self, draft: Reminder) -> BoxFuture<'_, ApiResult<Todo>> {
        Box::pin(async move {
            self.todo_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.todos_unavailable() {
                return Err(err);
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let created = Todo {
                id: TodoId::new(format!("new-{}", id)),
                title: draft.title().to_string(),
                reminder: Some(draft.scheduled_at()),
            };
            lock(&self.todos).push(created.clone());
            Ok(created)
        })
    }

    fn update_todo(&self, id: TodoId, patch: TodoPatch) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            self.todo_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.todos_unavailable() {
                return Err(err);
            }
            let mut todos = lock(&self.todos);
            let todo = todos
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ApiError::not_found("no such todo"))?;
            patch.apply_to(todo);
            lock(&self.updates).push((id, patch));
            Ok(())
        })
    }

    fn delete_todo(&self, id: TodoId) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            self.todo_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.todos_unavailable() {
                return Err(err);
            }
            lock(&self.todos).retain(|t| t.id != id);
            Ok(())
        })
    }

    fn exchange_code(&self, code: String) -> BoxFuture<'_, ApiResult<TokenGrant>> {
        Box::pin(async move {
            lock(&self.codes).push(code);
            match lock(&self.token).clone() {
                Some(token) => Ok(TokenGrant::new(token)),
                None => Err(ApiError::authentication("invalid_grant")
                    .with_endpoint("api/oauth2callback")),
            }
        })
    }

    fn submit_reminder(&self, reminder: Reminder) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            self.reminder_calls.fetch_add(1, Ordering::SeqCst);
            // Lets a concurrent caller run while this request is outstanding.
            tokio::task::yield_now().await;
            if self.fail_reminders.load(Ordering::SeqCst) {
                return Err(ApiError::server("backend returned 500 Internal Server Error")
                    .with_endpoint("api/reminder"));
            }
            lock(&self.submitted).push(reminder);
            Ok(())
        })
    }
}
