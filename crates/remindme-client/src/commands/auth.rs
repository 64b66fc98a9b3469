//! Authorization commands.

use std::path::Path;
use std::time::Duration;

use remindme_api::{LoopbackReceiver, code_from_redirect};
use serde::Serialize;
use tracing::info;

use crate::app::RemindApp;
use crate::callback::CallbackOutcome;
use crate::commands::todos::print_json;
use crate::commands::{ask, open_consent_page};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// How long `auth login --listen` waits for the browser.
const LISTEN_TIMEOUT: Duration = Duration::from_secs(300);

/// Options of `remindme auth login`.
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    pub client_id: Option<String>,
    pub listen: bool,
    pub no_browser: bool,
    pub force: bool,
}

/// Runs the Google consent flow and stores the resulting token.
///
/// A `--client-id` given on the command line is saved to `config_path`
/// so later runs find it.
pub async fn login(
    app: &RemindApp,
    config: &ClientConfig,
    config_path: &Path,
    options: LoginOptions,
) -> ClientResult<()> {
    if app.auth().is_authenticated() && !options.force {
        println!("Already authorized for Google Calendar.");
        println!("Use --force to authorize again.");
        return Ok(());
    }

    let url = app.gate().accept_relogin()?;

    if let Some(ref client_id) = options.client_id
        && config.google.client_id.as_deref() != Some(client_id.as_str())
    {
        save_client_id(config_path, client_id)?;
        println!("Client id saved to {}", config_path.display());
    }

    let code = if options.listen {
        let receiver = LoopbackReceiver::bind(&config.google.redirect_uri).await?;
        open_consent_page(&url, options.no_browser);
        println!("Waiting for Google to redirect to {} ...", config.google.redirect_uri);
        receiver.wait_for_code(LISTEN_TIMEOUT).await?
    } else {
        open_consent_page(&url, options.no_browser);
        let input = ask("Paste the redirect URL or the code: ")?;
        code_from_redirect(&input)?
    };

    let outcome = app.complete_login(&code).await?;
    report(&outcome)
}

/// Finishes a login started elsewhere, e.g. from a browser redirect.
pub async fn callback(app: &RemindApp, input: &str) -> ClientResult<()> {
    let code = code_from_redirect(input)?;
    let outcome = app.complete_login(&code).await?;
    report(&outcome)
}

fn report(outcome: &CallbackOutcome) -> ClientResult<()> {
    info!(
        replayed = outcome.replayed,
        failed = outcome.failed,
        "login completed"
    );
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    is_authenticated: bool,
    token_path: String,
    pending_reminders: usize,
}

/// Shows whether calendar access is authorized.
pub fn status(app: &RemindApp, config: &ClientConfig, json: bool) -> ClientResult<()> {
    let status = Status {
        is_authenticated: app.auth().is_authenticated(),
        token_path: config.token_path().display().to_string(),
        pending_reminders: app.pending().len(),
    };
    if json {
        return print_json(&status);
    }

    if status.is_authenticated {
        println!("Google Calendar: authorized");
    } else {
        println!("Google Calendar: not authorized (run `remindme auth login`)");
    }
    println!("Token file: {}", status.token_path);
    if status.pending_reminders > 0 {
        println!("Waiting for login: {} reminder(s)", status.pending_reminders);
    }
    Ok(())
}

/// Forgets the stored token.
pub fn logout(app: &RemindApp) -> ClientResult<()> {
    app.auth().store().clear()?;
    println!("Signed out of Google Calendar.");
    Ok(())
}

/// Writes `[google] client_id` into `config.toml`, keeping everything else.
fn save_client_id(config_path: &Path, client_id: &str) -> ClientResult<()> {
    let content = if config_path.exists() {
        std::fs::read_to_string(config_path)?
    } else {
        String::new()
    };

    let mut doc = content.parse::<toml_edit::DocumentMut>().map_err(|e| {
        ClientError::Config(format!("could not parse {}: {}", config_path.display(), e))
    })?;

    if !doc.contains_key("google") {
        doc["google"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let google = doc["google"].as_table_mut().ok_or_else(|| {
        ClientError::Config(format!("`google` in {} is not a table", config_path.display()))
    })?;
    google["client_id"] = toml_edit::value(client_id);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, doc.to_string())?;
    info!("client id saved to {}", config_path.display());
    Ok(())
}
