//! Debounced free-text input
//!
//! Keystrokes update a local draft and push a deadline out. The draft is
//! committed once the deadline has passed without further keystrokes, and
//! only if it differs from the last value the owner accepted.

use chrono::{DateTime, Duration, Utc};

/// Observable state of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// The draft matches what was last committed or accepted.
    Committed,
    /// The user typed; the draft settles at `deadline`.
    Pending {
        /// When the draft may be committed.
        deadline: DateTime<Utc>,
    },
}

/// Free-text input with a quiescence window.
#[derive(Debug, Clone)]
pub struct DebouncedInput {
    draft: String,
    committed: String,
    state: DebounceState,
    window: Duration,
}

impl DebouncedInput {
    /// Creates an input showing `initial`, already committed.
    #[must_use]
    pub fn new(initial: impl Into<String>, window: Duration) -> Self {
        let initial = initial.into();
        Self {
            draft: initial.clone(),
            committed: initial,
            state: DebounceState::Committed,
            window,
        }
    }

    /// Returns the text currently shown in the input.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> DebounceState {
        self.state
    }

    /// Returns true while a draft is waiting to settle.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// Records a keystroke and restarts the window.
    pub fn on_keystroke(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.draft = text.into();
        self.state = DebounceState::Pending {
            deadline: now + self.window,
        };
    }

    /// Records a value accepted by the owner out of band.
    ///
    /// A pending draft is discarded in favor of the new value.
    pub fn on_external_change(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value == self.committed {
            return;
        }
        self.draft.clone_from(&value);
        self.committed = value;
        self.state = DebounceState::Committed;
    }

    /// Settles the draft if its window has elapsed.
    ///
    /// Returns the draft when it must be committed, i.e. when it settled
    /// and differs from the last accepted value.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<String> {
        let DebounceState::Pending { deadline } = self.state else {
            return None;
        };
        if now < deadline {
            return None;
        }

        self.state = DebounceState::Committed;
        if self.draft == self.committed {
            return None;
        }
        self.committed.clone_from(&self.draft);
        Some(self.draft.clone())
    }
}
