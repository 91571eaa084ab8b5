//! Selection state machine
//!
//! The state of a variable's selection is the pair
//! `(selected_value, all_selected)`. Gestures move it; only fields that
//! actually change end up in the transition.

use dashvar_domain::{DashboardVariable, Gesture, SelectedValue, SelectionTransition, VariableValue};

/// Computes the transition caused by a gesture.
///
/// An ALL-like gesture selects every current option and sets the
/// all-selected flag. Any other gesture selects exactly what was picked and
/// clears the flag.
#[must_use]
pub fn next_selection(
    variable: &DashboardVariable,
    options: &[VariableValue],
    gesture: Gesture,
) -> SelectionTransition {
    let (selected, all_selected) = match gesture.into_selection() {
        None => (SelectedValue::Multiple(options.to_vec()), true),
        Some(selection) => (selection, false),
    };

    SelectionTransition {
        selected_value: (variable.selected_value.as_ref() != Some(&selected))
            .then_some(Some(selected)),
        all_selected: (variable.all_selected != all_selected).then_some(all_selected),
    }
}

/// Applies a transition to a variable.
pub fn apply_transition(variable: &mut DashboardVariable, transition: &SelectionTransition) {
    if let Some(selected) = &transition.selected_value {
        variable.selected_value.clone_from(selected);
    }
    if let Some(all_selected) = transition.all_selected {
        variable.all_selected = all_selected;
    }
}

/// Re-derives the selection of an all-selected variable after its
/// options changed.
#[must_use]
pub fn rederive_all(variable: &DashboardVariable, options: &[VariableValue]) -> SelectionTransition {
    if !variable.all_selected {
        return SelectionTransition::default();
    }
    next_selection(variable, options, Gesture::All)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashvar_domain::ALL_SENTINEL;
    use pretty_assertions::assert_eq;

    fn abc() -> Vec<VariableValue> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    fn multi() -> DashboardVariable {
        DashboardVariable::custom("svc", "a,b,c").with_multi_select(true)
    }

    #[test]
    fn test_all_gesture_selects_every_option() {
        let transition = next_selection(&multi(), &abc(), Gesture::All);
        assert_eq!(
            transition.selected_value,
            Some(Some(SelectedValue::Multiple(abc())))
        );
        assert_eq!(transition.all_selected, Some(true));
    }

    #[test]
    fn test_sentinel_in_list_and_empty_list_select_all() {
        let with_sentinel = Gesture::Multiple(vec!["a".into(), ALL_SENTINEL.into()]);
        assert_eq!(
            next_selection(&multi(), &abc(), with_sentinel).all_selected,
            Some(true)
        );
        assert_eq!(
            next_selection(&multi(), &abc(), Gesture::Multiple(vec![])).all_selected,
            Some(true)
        );
    }

    #[test]
    fn test_all_flag_not_reasserted() {
        let variable = multi()
            .with_selected(SelectedValue::Multiple(vec!["a".into()]))
            .with_all_selected(true);
        let transition = next_selection(&variable, &abc(), Gesture::All);
        assert_eq!(transition.all_selected, None);
        assert_eq!(
            transition.selected_value,
            Some(Some(SelectedValue::Multiple(abc())))
        );
    }

    #[test]
    fn test_concrete_gesture_clears_all_flag() {
        let variable = multi()
            .with_selected(SelectedValue::Multiple(abc()))
            .with_all_selected(true);
        let transition = next_selection(&variable, &abc(), Gesture::Single("b".into()));
        assert_eq!(
            transition.selected_value,
            Some(Some(SelectedValue::Single("b".into())))
        );
        assert_eq!(transition.all_selected, Some(false));
    }

    #[test]
    fn test_concrete_list_is_verbatim() {
        let gesture = Gesture::Multiple(vec!["c".into(), "a".into()]);
        let transition = next_selection(&multi(), &abc(), gesture);
        assert_eq!(
            transition.selected_value,
            Some(Some(SelectedValue::Multiple(vec!["c".into(), "a".into()])))
        );
        assert_eq!(transition.all_selected, None);
    }

    #[test]
    fn test_same_selection_is_noop() {
        let variable = DashboardVariable::custom("env", "dev,prod")
            .with_selected(SelectedValue::Single("prod".into()));
        let transition = next_selection(&variable, &[], Gesture::Single("prod".into()));
        assert!(transition.is_noop());
    }

    #[test]
    fn test_apply_transition() {
        let mut variable = multi();
        let transition = next_selection(&variable, &abc(), Gesture::All);
        apply_transition(&mut variable, &transition);
        assert!(variable.all_selected);
        assert_eq!(variable.selected_value, Some(SelectedValue::Multiple(abc())));
        assert!(next_selection(&variable, &abc(), Gesture::All).is_noop());
    }

    #[test]
    fn test_rederive_all_tracks_new_options() {
        let variable = multi()
            .with_selected(SelectedValue::Multiple(abc()))
            .with_all_selected(true);
        let new_options: Vec<VariableValue> = vec!["a".into(), "d".into()];
        let transition = rederive_all(&variable, &new_options);
        assert_eq!(
            transition.selected_value,
            Some(Some(SelectedValue::Multiple(new_options)))
        );
        assert_eq!(transition.all_selected, None);
    }

    #[test]
    fn test_rederive_ignores_explicit_selection() {
        let variable = multi().with_selected(SelectedValue::Multiple(vec!["a".into()]));
        assert!(rederive_all(&variable, &abc()).is_noop());
    }
}
