//! Render state exposed to the UI.

use serde::{Deserialize, Serialize};

use crate::selection::{ALL_DISPLAY, SelectionMode};
use crate::value::{SelectedValue, VariableValue};

/// What the list box or text input currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DisplayValue {
    /// Every option is selected; shown as "ALL".
    All,
    /// A single value (or free text).
    Text(String),
    /// Several values.
    List(Vec<String>),
}

impl DisplayValue {
    /// Derives the display value of a selection.
    #[must_use]
    pub fn from_selection(selected: Option<&SelectedValue>, all_selected: bool) -> Self {
        if all_selected {
            return Self::All;
        }
        match selected {
            Some(SelectedValue::Multiple(values)) => {
                Self::List(values.iter().map(ToString::to_string).collect())
            }
            Some(SelectedValue::Single(value)) => Self::Text(value.to_string()),
            None => Self::Text(String::new()),
        }
    }

    /// Returns the text rendered for this value.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::All => ALL_DISPLAY.to_string(),
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

/// Everything the UI needs to render one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableView {
    /// Variable name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Current display value.
    pub display_value: DisplayValue,
    /// Current option list (empty for text variables).
    pub options: Vec<VariableValue>,
    /// Whether an option fetch is in flight.
    pub loading: bool,
    /// Inline error message, if the last fetch failed.
    pub error: Option<String>,
    /// Selection mode of the input.
    pub mode: SelectionMode,
    /// Whether the ALL choice should be offered.
    pub show_all_affordance: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_selected_wins() {
        let selected = SelectedValue::Multiple(vec!["a".into()]);
        assert_eq!(
            DisplayValue::from_selection(Some(&selected), true),
            DisplayValue::All
        );
        assert_eq!(DisplayValue::All.label(), "ALL");
    }

    #[test]
    fn test_shapes() {
        let multi = SelectedValue::Multiple(vec!["a".into(), 2.0.into()]);
        assert_eq!(
            DisplayValue::from_selection(Some(&multi), false),
            DisplayValue::List(vec!["a".to_string(), "2".to_string()])
        );
        assert_eq!(
            DisplayValue::from_selection(None, false),
            DisplayValue::Text(String::new())
        );
    }
}
