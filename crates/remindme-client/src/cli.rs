//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use remindme_core::LogFormat;

/// remindme - Todos with Google Calendar reminders
#[derive(Debug, Parser)]
#[command(name = "remindme")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "REMINDME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log layout on stderr: pretty, compact or json (overrides log_format)
    #[arg(long, env = "REMINDME_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Backend base URL (overrides [api] base_url)
    #[arg(long, env = "REMINDME_API_URL")]
    pub api_url: Option<String>,

    /// Print the view model as JSON instead of text
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List todos (default)
    List,

    /// Add a todo
    Add {
        /// Title of the todo
        title: String,

        /// When to be reminded (RFC 3339, or local `YYYY-MM-DDTHH:MM`)
        #[arg(long, short)]
        at: String,
    },

    /// Change the title or time of a todo
    Edit {
        /// Todo id
        id: String,

        /// New title
        #[arg(long, short)]
        title: Option<String>,

        /// New reminder time
        #[arg(long, short)]
        at: Option<String>,
    },

    /// Delete a todo
    Delete {
        /// Todo id
        id: String,
    },

    /// Put a reminder in your Google Calendar
    Remind {
        /// Todo id whose title and time are used
        #[arg(required_unless_present = "title")]
        id: Option<String>,

        /// Title of an ad-hoc reminder
        #[arg(long, conflicts_with = "id", requires = "at")]
        title: Option<String>,

        /// Time of an ad-hoc reminder
        #[arg(long, requires = "title")]
        at: Option<String>,
    },

    /// Authorization commands
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Authorization actions.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Authorize calendar access with Google
    Login {
        /// OAuth client ID (saved to config.toml)
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// Capture the redirect on the loopback redirect_uri instead of
        /// asking for the code
        #[arg(long)]
        listen: bool,

        /// Print the consent URL without opening a browser
        #[arg(long)]
        no_browser: bool,

        /// Authorize again even if a token is stored
        #[arg(long, short)]
        force: bool,
    },

    /// Finish a login with the code or the full redirect URL
    Callback {
        /// Authorization code, or the URL Google redirected to
        code: String,
    },

    /// Show whether calendar access is authorized
    Status,

    /// Forget the stored access token
    Logout,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_list() {
        let cli = Cli::try_parse_from(["remindme"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn remind_by_id_or_ad_hoc() {
        let cli = Cli::try_parse_from(["remindme", "remind", "42"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Remind { id: Some(ref id), title: None, at: None }) if id == "42"
        ));

        let cli = Cli::try_parse_from([
            "remindme",
            "remind",
            "--title",
            "Dentist",
            "--at",
            "2024-05-01T10:00",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Remind { id: None, title: Some(_), at: Some(_) })
        ));

        assert!(Cli::try_parse_from(["remindme", "remind"]).is_err());
        assert!(Cli::try_parse_from(["remindme", "remind", "--title", "Dentist"]).is_err());
        assert!(
            Cli::try_parse_from(["remindme", "remind", "42", "--title", "x", "--at", "y"])
                .is_err()
        );
    }

    #[test]
    fn log_format_flag() {
        let cli = Cli::try_parse_from(["remindme", "--log-format", "json", "list"]).unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));

        assert!(Cli::try_parse_from(["remindme", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn auth_callback_takes_code() {
        let cli = Cli::try_parse_from(["remindme", "auth", "callback", "abc123"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Auth { action: AuthAction::Callback { ref code } }) if code == "abc123"
        ));
    }
}
