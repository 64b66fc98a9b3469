//! Command implementations.

pub mod auth;
pub mod config;
pub mod remind;
pub mod todos;

use std::io::{BufRead, IsTerminal, Write};

use tracing::info;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Returns true if the user can be asked questions.
pub(crate) fn interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Asks a yes/no question. Anything but `y`/`yes` is no.
pub(crate) fn confirm(question: &str) -> ClientResult<bool> {
    let answer = ask(&format!("{} [y/N] ", question))?;
    Ok(parse_yes(&answer))
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prints `prompt` and reads one line from stdin.
pub(crate) fn ask(prompt: &str) -> ClientResult<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()?;

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(ClientError::Action("no input on stdin".into()));
    }
    Ok(line.trim().to_string())
}

/// Sends the user to the consent page, falling back to printing the URL.
pub(crate) fn open_consent_page(url: &Url, no_browser: bool) {
    println!("Open this URL to authorize calendar access:");
    println!();
    println!("  {}", url);
    println!();

    if no_browser {
        return;
    }
    info!("opening consent page in browser");
    if let Err(e) = open::that(url.as_str()) {
        println!("Could not open a browser ({}); copy the URL above.", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_answers() {
        assert!(parse_yes("y"));
        assert!(parse_yes(" YES\n"));
        assert!(!parse_yes(""));
        assert!(!parse_yes("n"));
        assert!(!parse_yes("yep"));
    }
}
