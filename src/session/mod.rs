//! Interactive session state machine.
//!
//! The interactive mode is driven by [`SessionState::next`], a pure
//! transition function. The console driver in [`console`] only reads
//! input, turns it into [`SessionEvent`]s and renders the current state.

pub mod console;

use crate::models::{SearchQuery, SentimentLabel};
use thiserror::Error;

/// Where the user is in the interactive flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for subreddit, keyword and limit.
    AwaitParameters,
    /// A batch has been analysed and its report is shown.
    Report { query: SearchQuery },
    /// Paging through the items of one label.
    Browsing {
        query: SearchQuery,
        label: SentimentLabel,
    },
    Done,
}

/// Inputs that move the session along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Submit(SearchQuery),
    Browse(SentimentLabel),
    Back,
    NewSearch,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot handle {event} while {state}")]
    InvalidTransition { state: String, event: String },
}

impl SessionState {
    /// Compute the next state. Does no I/O.
    pub fn next(self, event: SessionEvent) -> Result<SessionState, SessionError> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Done, event) => Err(invalid("done", &event)),
            (_, E::Quit) => Ok(S::Done),

            (S::AwaitParameters, E::Submit(query)) => Ok(S::Report { query }),
            (S::AwaitParameters, event) => Err(invalid("awaiting parameters", &event)),

            (S::Report { query }, E::Browse(label)) => Ok(S::Browsing { query, label }),
            (S::Report { .. }, E::NewSearch) => Ok(S::AwaitParameters),
            (S::Report { .. }, event) => Err(invalid("showing the report", &event)),

            (S::Browsing { query, .. }, E::Browse(label)) => Ok(S::Browsing { query, label }),
            (S::Browsing { query, .. }, E::Back) => Ok(S::Report { query }),
            (S::Browsing { .. }, E::NewSearch) => Ok(S::AwaitParameters),
            (S::Browsing { .. }, event) => Err(invalid("browsing", &event)),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, SessionState::Done)
    }
}

fn invalid(state: &str, event: &SessionEvent) -> SessionError {
    let event = match event {
        SessionEvent::Submit(_) => "a new search",
        SessionEvent::Browse(_) => "browse",
        SessionEvent::Back => "back",
        SessionEvent::NewSearch => "new search",
        SessionEvent::Quit => "quit",
    };
    SessionError::InvalidTransition {
        state: state.to_string(),
        event: event.to_string(),
    }
}

/// Map a line of menu input to an event.
///
/// `1`-`7` or a label name browse that label, `b` goes back, `n` starts a
/// new search and `q` quits. Anything else is `None`.
pub fn parse_menu_input(input: &str) -> Option<SessionEvent> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "" => None,
        "b" | "back" => Some(SessionEvent::Back),
        "n" | "new" => Some(SessionEvent::NewSearch),
        "q" | "quit" | "exit" => Some(SessionEvent::Quit),
        _ => input.parse::<SentimentLabel>().ok().map(SessionEvent::Browse),
    }
}
