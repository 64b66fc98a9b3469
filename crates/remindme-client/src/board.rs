//! The todo list and its CRUD operations.
//!
//! Failed backend calls are logged and returned; the local list only changes
//! after the backend confirmed the change.

use std::sync::Arc;

use remindme_api::RemindBackend;
use remindme_core::{Reminder, ReminderTime, Todo, TodoId, TodoPatch};
use tracing::{debug, error, info};

use crate::error::{ClientError, ClientResult};

pub struct TodoBoard {
    backend: Arc<dyn RemindBackend>,
    todos: Vec<Todo>,
}

impl TodoBoard {
    pub fn new(backend: Arc<dyn RemindBackend>) -> Self {
        Self {
            backend,
            todos: Vec::new(),
        }
    }

    /// The todos as last seen.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| &t.id == id)
    }

    /// Reloads the list from the backend. On failure the previous list is kept.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        match self.backend.list_todos().await {
            Ok(todos) => {
                debug!("fetched {} todo(s)", todos.len());
                self.todos = todos;
                Ok(())
            }
            Err(e) => {
                error!("failed to fetch todos: {}", e);
                Err(e.into())
            }
        }
    }

    /// Creates a todo. Both a non-blank title and a time are required.
    pub async fn add(&mut self, title: &str, at: Option<ReminderTime>) -> ClientResult<&Todo> {
        let at = at.ok_or_else(|| ClientError::Input("a reminder time is required".into()))?;
        let draft = Reminder::new(title, at)?;

        let created = self.backend.create_todo(draft).await.map_err(|e| {
            error!("failed to add todo: {}", e);
            ClientError::from(e)
        })?;
        info!("added todo {}", created.id);

        self.todos.push(created);
        let index = self.todos.len() - 1;
        Ok(&self.todos[index])
    }

    /// Updates a known todo.
    ///
    /// The request carries the merged title and time so a backend that
    /// replaces the whole record keeps the untouched field.
    pub async fn edit(&mut self, id: &TodoId, patch: TodoPatch) -> ClientResult<&Todo> {
        if patch.is_empty() {
            return Err(ClientError::Input("nothing to change".into()));
        }
        patch.validate()?;

        let index = self.index_of(id)?;
        let mut merged = self.todos[index].clone();
        patch.apply_to(&mut merged);

        self.backend
            .update_todo(id.clone(), TodoPatch::from(&merged))
            .await
            .map_err(|e| {
                error!("failed to update todo {}: {}", id, e);
                ClientError::from(e)
            })?;
        info!("updated todo {}", id);

        self.todos[index] = merged;
        Ok(&self.todos[index])
    }

    /// Deletes a known todo.
    pub async fn delete(&mut self, id: &TodoId) -> ClientResult<Todo> {
        let index = self.index_of(id)?;

        self.backend.delete_todo(id.clone()).await.map_err(|e| {
            error!("failed to delete todo {}: {}", id, e);
            ClientError::from(e)
        })?;
        info!("deleted todo {}", id);

        Ok(self.todos.remove(index))
    }

    /// The calendar reminder for a todo.
    pub fn reminder_for(&self, id: &TodoId) -> ClientResult<Reminder> {
        let index = self.index_of(id)?;
        Ok(self.todos[index].to_reminder()?)
    }

    fn index_of(&self, id: &TodoId) -> ClientResult<usize> {
        self.todos
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("no todo with id {:?}", id.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, todo};

    async fn loaded_board(backend: &Arc<FakeBackend>) -> TodoBoard {
        let mut board = TodoBoard::new(backend.clone());
        board.refresh().await.unwrap();
        board
    }

    fn sample() -> Vec<Todo> {
        vec![
            todo("1", "Dentist", Some("2024-05-01T10:00:00-07:00")),
            todo("2", "Buy milk", None),
        ]
    }

    #[tokio::test]
    async fn refresh_replaces_list() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let board = loaded_board(&backend).await;
        assert_eq!(board.todos(), sample().as_slice());
        assert_eq!(backend.list_calls(), 1);
        assert_eq!(backend.todo_calls(), 0);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let mut board = loaded_board(&backend).await;

        backend.fail_todos();
        let err = board.refresh().await.unwrap_err();

        assert!(err.is_network_failure());
        assert_eq!(board.todos().len(), 2);
        assert_eq!(backend.list_calls(), 2);
    }

    #[tokio::test]
    async fn add_appends_created_todo() {
        let backend = Arc::new(FakeBackend::new());
        let mut board = TodoBoard::new(backend.clone());

        let at: ReminderTime = "2024-05-02T09:30:00+02:00".parse().unwrap();
        let created = board.add("Call mom", Some(at)).await.unwrap().clone();

        assert_eq!(created.title, "Call mom");
        assert_eq!(created.reminder, Some(at));
        assert_eq!(board.todos(), &[created]);
    }

    #[tokio::test]
    async fn add_validates_before_sending() {
        let backend = Arc::new(FakeBackend::new());
        let mut board = TodoBoard::new(backend.clone());
        let at: ReminderTime = "2024-05-02T09:30:00+02:00".parse().unwrap();

        assert!(matches!(
            board.add("   ", Some(at)).await.unwrap_err(),
            ClientError::Input(_)
        ));
        assert!(matches!(
            board.add("Call mom", None).await.unwrap_err(),
            ClientError::Input(_)
        ));
        assert_eq!(backend.todo_calls(), 0);
        assert!(board.todos().is_empty());
    }

    #[tokio::test]
    async fn failed_add_leaves_list_unchanged() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let mut board = loaded_board(&backend).await;
        backend.fail_todos();

        let at: ReminderTime = "2024-05-02T09:30:00+02:00".parse().unwrap();
        assert!(board.add("Call mom", Some(at)).await.is_err());
        assert_eq!(board.todos(), sample().as_slice());
    }

    #[tokio::test]
    async fn edit_sends_merged_fields() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let mut board = loaded_board(&backend).await;

        let edited = board
            .edit(&TodoId::new("1"), TodoPatch::default().with_title("Orthodontist"))
            .await
            .unwrap()
            .clone();

        assert_eq!(edited.title, "Orthodontist");
        assert_eq!(edited.reminder, sample()[0].reminder);

        let updates = backend.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, TodoId::new("1"));
        assert_eq!(updates[0].1.title.as_deref(), Some("Orthodontist"));
        assert_eq!(updates[0].1.reminder, sample()[0].reminder);
    }

    #[tokio::test]
    async fn edit_unknown_id_makes_no_request() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let mut board = loaded_board(&backend).await;

        let err = board
            .edit(&TodoId::new("missing"), TodoPatch::default().with_title("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(backend.todo_calls(), 0);
    }

    #[tokio::test]
    async fn edit_rejects_empty_and_blank_patches() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let mut board = loaded_board(&backend).await;
        let id = TodoId::new("1");

        assert!(board.edit(&id, TodoPatch::default()).await.is_err());
        assert!(
            board
                .edit(&id, TodoPatch::default().with_title(" "))
                .await
                .is_err()
        );
        assert_eq!(backend.todo_calls(), 0);
        assert_eq!(board.todos(), sample().as_slice());
    }

    #[tokio::test]
    async fn failed_edit_leaves_list_unchanged() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let mut board = loaded_board(&backend).await;
        backend.fail_todos();

        let err = board
            .edit(&TodoId::new("1"), TodoPatch::default().with_title("Orthodontist"))
            .await
            .unwrap_err();

        assert!(err.is_network_failure());
        assert_eq!(board.todos(), sample().as_slice());
    }

    #[tokio::test]
    async fn delete_removes_locally() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let mut board = loaded_board(&backend).await;

        let removed = board.delete(&TodoId::new("1")).await.unwrap();

        assert_eq!(removed.title, "Dentist");
        assert_eq!(board.todos(), &sample()[1..]);
        assert!(board.get(&TodoId::new("1")).is_none());
    }

    #[tokio::test]
    async fn failed_delete_keeps_todo() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let mut board = loaded_board(&backend).await;
        backend.fail_todos();

        assert!(board.delete(&TodoId::new("1")).await.is_err());
        assert_eq!(board.todos().len(), 2);
    }

    #[tokio::test]
    async fn reminder_for_requires_a_time() {
        let backend = Arc::new(FakeBackend::with_todos(sample()));
        let board = loaded_board(&backend).await;

        let reminder = board.reminder_for(&TodoId::new("1")).unwrap();
        assert_eq!(reminder.title(), "Dentist");

        assert!(matches!(
            board.reminder_for(&TodoId::new("2")).unwrap_err(),
            ClientError::Input(_)
        ));
        assert!(matches!(
            board.reminder_for(&TodoId::new("9")).unwrap_err(),
            ClientError::NotFound(_)
        ));
    }
}
