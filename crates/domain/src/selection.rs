//! Selection gestures and transitions.
//!
//! A gesture is what the user did in the list box or text input. A
//! transition is what the owner of the variable has to apply in response.

use serde::{Deserialize, Serialize};

use crate::value::{SelectedValue, VariableValue};

/// Raw value the UI uses for the ALL choice.
pub const ALL_SENTINEL: &str = "__ALL__";

/// Label shown in place of the selection when every option is selected.
pub const ALL_DISPLAY: &str = "ALL";

/// A user selection gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    /// Several values were picked.
    Multiple(Vec<VariableValue>),
    /// One value was picked (or committed from free text).
    Single(VariableValue),
    /// The ALL choice was picked.
    All,
}

impl Gesture {
    /// Returns true if this gesture means "every current option".
    ///
    /// That is the case for the explicit ALL choice, for the raw sentinel
    /// either alone or inside a list, and for an empty list.
    #[must_use]
    pub fn is_all(&self) -> bool {
        match self {
            Self::All => true,
            Self::Single(value) => is_sentinel(value),
            Self::Multiple(values) => values.is_empty() || values.iter().any(is_sentinel),
        }
    }

    /// Converts a concrete gesture into the selection it stands for.
    /// Returns `None` for ALL-like gestures.
    #[must_use]
    pub fn into_selection(self) -> Option<SelectedValue> {
        if self.is_all() {
            return None;
        }
        match self {
            Self::Single(value) => Some(SelectedValue::Single(value)),
            Self::Multiple(values) => Some(SelectedValue::Multiple(values)),
            Self::All => None,
        }
    }
}

fn is_sentinel(value: &VariableValue) -> bool {
    matches!(value, VariableValue::Text(s) if s == ALL_SENTINEL)
}

/// Changes the owner must apply after a gesture.
///
/// Each field is `Some` only when that field actually changes, so owners
/// are never notified redundantly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTransition {
    /// New selected value, if it changed.
    pub selected_value: Option<Option<SelectedValue>>,
    /// New all-selected flag, if it changed.
    pub all_selected: Option<bool>,
}

impl SelectionTransition {
    /// Returns true if nothing changes.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.selected_value.is_none() && self.all_selected.is_none()
    }
}

/// How the list box should behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Free-text input.
    Text,
    /// Pick exactly one option.
    Single,
    /// Pick any number of options.
    Multiple,
}
