//! Todo list commands.

use chrono::{Local, Utc};
use remindme_core::{ReminderTime, Todo, TodoId, TodoPatch};

use crate::app::{RemindApp, ViewModel};
use crate::error::{ClientError, ClientResult};

/// Prints the todo list.
pub async fn list(app: &mut RemindApp, json: bool) -> ClientResult<()> {
    app.board_mut().refresh().await?;
    print_view(&app.view(), json)
}

/// Adds a todo.
pub async fn add(app: &mut RemindApp, title: &str, at: &str, json: bool) -> ClientResult<()> {
    let at = ReminderTime::parse(at)?;
    let created = app.board_mut().add(title, Some(at)).await?.clone();
    if json {
        return print_json(&created);
    }
    println!("Added {}", render_todo(&created));
    Ok(())
}

/// Changes the title and/or time of a todo.
pub async fn edit(
    app: &mut RemindApp,
    id: &str,
    title: Option<String>,
    at: Option<&str>,
    json: bool,
) -> ClientResult<()> {
    let mut patch = TodoPatch::default();
    if let Some(title) = title {
        patch = patch.with_title(title);
    }
    if let Some(at) = at {
        patch = patch.with_reminder(ReminderTime::parse(at)?);
    }
    if patch.is_empty() {
        return Err(ClientError::Input("pass --title and/or --at".into()));
    }

    let board = app.board_mut();
    board.refresh().await?;
    let edited = board.edit(&TodoId::new(id), patch).await?.clone();
    if json {
        return print_json(&edited);
    }
    println!("Updated {}", render_todo(&edited));
    Ok(())
}

/// Deletes a todo.
pub async fn delete(app: &mut RemindApp, id: &str) -> ClientResult<()> {
    let board = app.board_mut();
    board.refresh().await?;
    let removed = board.delete(&TodoId::new(id)).await?;
    println!("Deleted {}", render_todo(&removed));
    Ok(())
}

pub(crate) fn print_view(view: &ViewModel, json: bool) -> ClientResult<()> {
    if json {
        return print_json(view);
    }

    if view.todos.is_empty() {
        println!("No todos.");
    }
    for todo in &view.todos {
        println!("{}", render_todo(todo));
    }

    if view.show_login_prompt {
        println!();
        println!("Google Calendar access is required. Run `remindme auth login`.");
    }
    if !view.pending_reminders.is_empty() {
        println!();
        println!(
            "{} reminder(s) will be sent to your calendar after login.",
            view.pending_reminders.len()
        );
    }
    Ok(())
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> ClientResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::Action(format!("failed to serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

/// One line per todo: `id  when  title`.
pub(crate) fn render_todo(todo: &Todo) -> String {
    let when = match todo.reminder {
        Some(at) if at.is_past(Utc::now()) => format!("{} (past)", at.display_in(&Local)),
        Some(at) => at.display_in(&Local),
        None => "-".to_string(),
    };
    format!("{}  {}  {}", todo.id, when, todo.title)
}
