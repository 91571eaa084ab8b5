//! Owner notification port

use dashvar_domain::SelectedValue;
use serde::Serialize;

/// Receives selection changes the owner of a variable must apply.
///
/// Each callback fires at most once per logical transition.
pub trait VariableObserver {
    /// The selected value of `name` changed.
    fn on_value_updated(&mut self, name: &str, value: Option<&SelectedValue>);

    /// The all-selected flag of `name` changed.
    fn on_all_selected_updated(&mut self, name: &str, all_selected: bool);
}

/// A notification recorded by the `Vec` observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObserverEvent {
    /// See [`VariableObserver::on_value_updated`].
    ValueUpdated {
        /// Variable name.
        name: String,
        /// New selection.
        value: Option<SelectedValue>,
    },
    /// See [`VariableObserver::on_all_selected_updated`].
    AllSelectedUpdated {
        /// Variable name.
        name: String,
        /// New flag.
        all_selected: bool,
    },
}

impl VariableObserver for Vec<ObserverEvent> {
    fn on_value_updated(&mut self, name: &str, value: Option<&SelectedValue>) {
        self.push(ObserverEvent::ValueUpdated {
            name: name.to_string(),
            value: value.cloned(),
        });
    }

    fn on_all_selected_updated(&mut self, name: &str, all_selected: bool) {
        self.push(ObserverEvent::AllSelectedUpdated {
            name: name.to_string(),
            all_selected,
        });
    }
}
