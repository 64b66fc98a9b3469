//! Putting a reminder in the calendar.

use chrono::Local;
use remindme_api::code_from_redirect;
use remindme_core::{Reminder, ReminderTime, TodoId};

use crate::app::RemindApp;
use crate::commands::{ask, confirm, interactive, open_consent_page};
use crate::error::{ClientError, ClientResult};
use crate::gate::GateOutcome;

/// Either a todo id or an ad-hoc title and time.
#[derive(Debug, Clone)]
pub enum ReminderSource {
    Todo(String),
    AdHoc { title: String, at: String },
}

/// Sends a reminder through the login gate. Without calendar access the
/// user is asked to log in now, or the reminder stays queued.
pub async fn run(app: &mut RemindApp, source: ReminderSource) -> ClientResult<()> {
    let reminder = match source {
        ReminderSource::Todo(id) => {
            app.board_mut().refresh().await?;
            app.board().reminder_for(&TodoId::new(id))?
        }
        ReminderSource::AdHoc { title, at } => Reminder::new(title, ReminderTime::parse(&at)?)?,
    };

    let outcome = app
        .gate()
        .request_calendar_reminder(reminder.clone())
        .await?;

    match outcome {
        GateOutcome::Submitted => {
            println!("{}", describe(&reminder, "Calendar reminder set"));
            Ok(())
        }
        GateOutcome::AlreadyInFlight => {
            println!("{}", describe(&reminder, "Already being sent"));
            Ok(())
        }
        GateOutcome::LoginRequired => login_prompt(app).await,
    }
}

fn describe(reminder: &Reminder, what: &str) -> String {
    format!(
        "{}: {} at {}",
        what,
        reminder.title(),
        reminder.scheduled_at().display_in(&Local)
    )
}

/// The command-line rendition of the login prompt.
async fn login_prompt(app: &RemindApp) -> ClientResult<()> {
    println!("Google Calendar access is required to set this reminder.");

    if !interactive() {
        println!("The reminder is queued; run `remindme auth login` to send it.");
        return Ok(());
    }

    if !confirm("Log in to Google now?")? {
        app.gate().dismiss_prompt()?;
        println!("Reminder discarded.");
        return Ok(());
    }

    let url = app.gate().accept_relogin()?;
    open_consent_page(&url, false);

    let input = ask("Paste the redirect URL or the code: ")?;
    let code = code_from_redirect(&input).map_err(ClientError::from)?;
    let outcome = app.complete_login(&code).await?;

    println!("Calendar access granted.");
    if outcome.replayed > 0 {
        println!("{} queued reminder(s) sent.", outcome.replayed);
    }
    if outcome.failed > 0 {
        return Err(ClientError::Network(format!(
            "{} queued reminder(s) could not be set",
            outcome.failed
        )));
    }
    Ok(())
}
