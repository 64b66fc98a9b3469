//! remindme CLI entry point.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use remindme_client::app::RemindApp;
use remindme_client::cli::{AuthAction, Cli, Command, ConfigAction};
use remindme_client::commands::{self, auth::LoginOptions, remind::ReminderSource};
use remindme_client::config::ClientConfig;
use remindme_client::error::ClientResult;
use remindme_core::tracing::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let loaded = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)
    } else {
        ClientConfig::load()
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(ref url) = cli.api_url {
        config.api.base_url = url.clone();
    }
    config.debug |= cli.debug;
    if cli.log_format.is_some() {
        config.log_format = cli.log_format;
    }

    let mut tracing_config = if config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Some(format) = config.log_format {
        tracing_config = tracing_config.with_format(format);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli, config, &config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: ClientConfig, config_path: &Path) -> ClientResult<()> {
    let json = cli.json;
    let command = cli.command.unwrap_or(Command::List);

    // Config commands must work even when the backend settings are broken.
    let command = match command {
        Command::Config { action } => {
            return match action {
                ConfigAction::Dump => commands::config::dump(&config, config_path),
                ConfigAction::Validate => commands::config::validate(&config),
                ConfigAction::Path => commands::config::path(&config, config_path),
            };
        }
        other => other,
    };

    let client_id = match command {
        Command::Auth {
            action: AuthAction::Login { ref client_id, .. },
        } => client_id.clone(),
        _ => None,
    };
    let mut app = RemindApp::from_config(&config, client_id.as_deref())?;

    match command {
        Command::List => commands::todos::list(&mut app, json).await,
        Command::Add { title, at } => commands::todos::add(&mut app, &title, &at, json).await,
        Command::Edit { id, title, at } => {
            commands::todos::edit(&mut app, &id, title, at.as_deref(), json).await
        }
        Command::Delete { id } => commands::todos::delete(&mut app, &id).await,
        Command::Remind { id, title, at } => {
            let source = match (id, title, at) {
                (Some(id), _, _) => ReminderSource::Todo(id),
                (None, Some(title), Some(at)) => ReminderSource::AdHoc { title, at },
                _ => {
                    return Err(remindme_client::ClientError::Input(
                        "pass a todo id, or --title and --at".into(),
                    ));
                }
            };
            commands::remind::run(&mut app, source).await
        }
        Command::Auth { action } => match action {
            AuthAction::Login {
                client_id,
                listen,
                no_browser,
                force,
            } => {
                let options = LoginOptions {
                    client_id,
                    listen,
                    no_browser,
                    force,
                };
                commands::auth::login(&app, &config, config_path, options).await
            }
            AuthAction::Callback { code } => commands::auth::callback(&app, &code).await,
            AuthAction::Status => commands::auth::status(&app, &config, json),
            AuthAction::Logout => commands::auth::logout(&app),
        },
        Command::Config { .. } => Ok(()),
    }
}
