//! State machine of one search text field.
//!
//! ```text
//! idle -> debouncing -> querying -> suggestions-shown -> selected -> idle
//!                          ^                          \-> freeform-fallback -> querying
//!                          |                           \-> (new input) -> debouncing
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Debouncing,
    Querying,
    SuggestionsShown,
    Selected,
    FreeformFallback,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Debouncing => "debouncing",
            SessionState::Querying => "querying",
            SessionState::SuggestionsShown => "suggestions-shown",
            SessionState::Selected => "selected",
            SessionState::FreeformFallback => "freeform-fallback",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A raw keystroke; always (re)starts the quiet period.
    Input,
    /// The debouncer committed a query and a search went out.
    QueryIssued,
    SuggestionsReady,
    /// The committed text matched a suggestion label exactly.
    Select,
    /// The committed text matched no suggestion.
    Freeform,
    /// The selection reached the views.
    Synced,
    /// The freeform search found nothing.
    NoMatch,
}

impl SessionState {
    /// Next state after `event`. Events that make no sense in the current
    /// state leave it unchanged.
    #[must_use]
    pub fn on(self, event: SessionEvent) -> SessionState {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (_, E::Input) => S::Debouncing,
            (
                S::Idle | S::Debouncing | S::SuggestionsShown | S::FreeformFallback,
                E::QueryIssued,
            ) => S::Querying,
            (S::Querying, E::SuggestionsReady) => S::SuggestionsShown,
            (S::SuggestionsShown | S::Idle | S::Debouncing | S::Querying, E::Select) => {
                S::Selected
            }
            (S::SuggestionsShown | S::Idle | S::Debouncing | S::Querying, E::Freeform) => {
                S::FreeformFallback
            }
            (S::FreeformFallback | S::Querying, E::NoMatch) => S::Idle,
            (S::Selected | S::FreeformFallback | S::Querying, E::Synced) => S::Idle,
            (state, _) => state,
        }
    }
}

/// Tracks one text field's [`SessionState`].
#[derive(Debug, Default)]
pub struct SearchSession {
    state: SessionState,
}

impl SearchSession {
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Applies `event` and returns the new state.
    pub fn advance(&mut self, event: SessionEvent) -> SessionState {
        let next = self.state.on(event);
        if next != self.state {
            tracing::trace!(from = %self.state, to = %next, ?event, "search session transition");
        }
        self.state = next;
        next
    }
}
