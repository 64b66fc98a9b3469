//! The login prompt shown when a calendar action needs authorization.

use serde::{Deserialize, Serialize};

/// Visibility of the login prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptState {
    #[default]
    Hidden,
    Shown,
}

/// Things that move the prompt between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptEvent {
    /// The gate refused a calendar action.
    GateRejected,
    /// The user closed the prompt without logging in.
    Dismissed,
    /// The user chose to log in and is being sent to the consent page.
    ReloginAccepted,
    /// A callback stored a fresh token.
    LoginCompleted,
}

impl PromptState {
    /// Returns the state after `event`.
    pub fn next(self, event: PromptEvent) -> Self {
        match event {
            PromptEvent::GateRejected => Self::Shown,
            PromptEvent::Dismissed | PromptEvent::ReloginAccepted | PromptEvent::LoginCompleted => {
                Self::Hidden
            }
        }
    }

    pub fn is_shown(self) -> bool {
        self == Self::Shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_hidden() {
        assert_eq!(PromptState::default(), PromptState::Hidden);
    }

    #[test]
    fn transitions() {
        let shown = PromptState::Hidden.next(PromptEvent::GateRejected);
        assert!(shown.is_shown());
        assert_eq!(shown.next(PromptEvent::GateRejected), PromptState::Shown);
        assert_eq!(shown.next(PromptEvent::Dismissed), PromptState::Hidden);
        assert_eq!(shown.next(PromptEvent::ReloginAccepted), PromptState::Hidden);
        assert_eq!(shown.next(PromptEvent::LoginCompleted), PromptState::Hidden);
        assert_eq!(
            PromptState::Hidden.next(PromptEvent::Dismissed),
            PromptState::Hidden
        );
    }
}
