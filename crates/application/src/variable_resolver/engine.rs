//! Variable resolution engine
//!
//! One engine instance owns the transient state of one variable: its option
//! list, inline error, loading flag and free-text draft. The variable
//! definition itself belongs to the caller; the engine only reports
//! selection changes through a [`VariableObserver`].

use std::sync::Arc;

use chrono::Duration;
use dashvar_domain::{
    CacheKey, DashboardVariable, DisplayValue, ExistingVariables, Gesture, ResolverSettings,
    SelectionMode, SelectionTransition, VariableKind, VariableValue, VariableView,
    stringify_selection,
};

use super::cache_key::build_cache_key;
use super::debounce::DebouncedInput;
use super::reconciler::{ErrorUpdate, ReconcileKind, Reconciliation, reconcile};
use super::selection::{apply_transition, next_selection, rederive_all};
use super::sorter::{sort_values, values_equal};
use crate::ApplicationResult;
use crate::ports::{
    Clock, QueryError, QueryExecutor, QueryPayload, QueryRequest, VariableObserver,
};

/// Resolution engine for a single dashboard variable.
pub struct VariableEngine {
    variable: DashboardVariable,
    options: Vec<VariableValue>,
    error: Option<String>,
    last_query_error: Option<QueryError>,
    requested_key: Option<CacheKey>,
    pending_key: Option<CacheKey>,
    text_input: Option<DebouncedInput>,
    settings: ResolverSettings,
    clock: Arc<dyn Clock>,
}

impl VariableEngine {
    /// Creates an engine for `variable`.
    ///
    /// Custom variables get their option list immediately.
    ///
    /// # Errors
    /// Returns an error if the variable definition is invalid.
    pub fn new(
        variable: DashboardVariable,
        settings: ResolverSettings,
        clock: Arc<dyn Clock>,
    ) -> ApplicationResult<Self> {
        variable.validate()?;

        let mut engine = Self {
            variable,
            options: Vec::new(),
            error: None,
            last_query_error: None,
            requested_key: None,
            pending_key: None,
            text_input: None,
            settings,
            clock,
        };
        engine.reset_for_kind();
        engine.refresh_static();
        Ok(engine)
    }

    /// Returns the engine's copy of the variable.
    #[must_use]
    pub const fn variable(&self) -> &DashboardVariable {
        &self.variable
    }

    /// Returns the current option list.
    #[must_use]
    pub fn options(&self) -> &[VariableValue] {
        &self.options
    }

    /// Returns the inline error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the error of the last failed query, for diagnostics.
    #[must_use]
    pub const fn last_query_error(&self) -> Option<&QueryError> {
        self.last_query_error.as_ref()
    }

    /// Returns true while a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending_key.is_some()
    }

    /// Returns the cache key the variable currently resolves to, or `None`
    /// for variables that are not queried.
    #[must_use]
    pub fn cache_key(&self, existing: &ExistingVariables) -> Option<CacheKey> {
        self.variable
            .kind
            .query_value()
            .map(|template| build_cache_key(&self.variable.name, template, existing))
    }

    /// Accepts a new version of the variable from its owner.
    ///
    /// Changing the kind resets all transient state. An edited query is
    /// fetched again on the next [`Self::begin_fetch`] and any in-flight
    /// result for the old query is discarded. A changed sort order reorders
    /// the displayed options. A changed selection overrides any pending
    /// free-text draft.
    pub fn set_variable(
        &mut self,
        variable: DashboardVariable,
        observer: &mut impl VariableObserver,
    ) -> ApplicationResult<()> {
        variable.validate()?;

        let previous = std::mem::replace(&mut self.variable, variable);
        let kind_changed =
            std::mem::discriminant(&previous.kind) != std::mem::discriminant(&self.variable.kind);

        if kind_changed {
            self.options.clear();
            self.error = None;
            self.last_query_error = None;
            self.requested_key = None;
            self.pending_key = None;
            self.reset_for_kind();
        } else {
            if previous.kind.query_value() != self.variable.kind.query_value() {
                tracing::debug!(variable = %self.variable.name, "query changed, refetch required");
                self.requested_key = None;
                self.pending_key = None;
            }
            if let Some(input) = &mut self.text_input {
                input.on_external_change(stringify_selection(self.variable.selected_value.as_ref()));
            }
        }

        match self.refresh_static() {
            Some(reconciliation) => {
                if reconciliation.kind == ReconcileKind::Replaced {
                    let transition = rederive_all(&self.variable, &self.options);
                    self.emit(&transition, observer);
                }
            }
            None if !kind_changed && previous.sort != self.variable.sort => {
                self.resort_options(observer);
            }
            None => {}
        }
        Ok(())
    }

    /// Starts a fetch if the cache key changed since the last one.
    ///
    /// Returns the request to hand to the query executor, or `None` when
    /// nothing needs to run. The snapshot is not retained.
    pub fn begin_fetch(&mut self, existing: &ExistingVariables) -> Option<QueryRequest> {
        let template = self.variable.kind.query_value()?;
        let key = build_cache_key(&self.variable.name, template, existing);

        if self.requested_key.as_ref() == Some(&key) {
            return None;
        }

        tracing::debug!(variable = %self.variable.name, %key, "starting option fetch");
        let request = QueryRequest {
            key: key.clone(),
            query: template.to_string(),
            variables: existing.payload_variables(),
        };
        self.requested_key = Some(key.clone());
        self.pending_key = Some(key);
        Some(request)
    }

    /// Applies the outcome of a fetch started by [`Self::begin_fetch`].
    ///
    /// Outcomes for any key other than the most recently requested one are
    /// stale and discarded; `None` is returned for them.
    pub fn complete_fetch(
        &mut self,
        key: &CacheKey,
        outcome: Result<QueryPayload, QueryError>,
        observer: &mut impl VariableObserver,
    ) -> Option<ReconcileKind> {
        if self.pending_key.as_ref() != Some(key) {
            tracing::debug!(variable = %self.variable.name, %key, "discarding stale fetch result");
            return None;
        }
        self.pending_key = None;

        let reconciliation = reconcile(
            &self.variable,
            &self.options,
            Some(&outcome),
            &self.settings.invalid_query_message,
        );
        self.last_query_error = outcome.err();
        let kind = reconciliation.kind;
        self.apply(reconciliation, observer);
        Some(kind)
    }

    /// Fetches and applies options in one step.
    pub async fn resolve<E>(
        &mut self,
        executor: &E,
        existing: &ExistingVariables,
        observer: &mut impl VariableObserver,
    ) -> Option<ReconcileKind>
    where
        E: QueryExecutor + ?Sized,
    {
        let request = self.begin_fetch(existing)?;
        let outcome = executor.execute(&request).await;
        self.complete_fetch(&request.key, outcome, observer)
    }

    /// Handles a selection gesture from the UI.
    pub fn on_gesture(
        &mut self,
        gesture: Gesture,
        observer: &mut impl VariableObserver,
    ) -> SelectionTransition {
        let transition = next_selection(&self.variable, &self.options, gesture);
        self.emit(&transition, observer);
        transition
    }

    /// Handles a keystroke in a free-text variable. Ignored for other kinds.
    pub fn on_text_input(&mut self, text: impl Into<String>) {
        let now = self.clock.now();
        if let Some(input) = &mut self.text_input {
            input.on_keystroke(text, now);
        }
    }

    /// Commits settled free text. Call whenever time may have passed.
    ///
    /// Returns true if a selection change was emitted.
    pub fn tick(&mut self, observer: &mut impl VariableObserver) -> bool {
        let now = self.clock.now();
        let Some(draft) = self.text_input.as_mut().and_then(|input| input.poll(now)) else {
            return false;
        };
        let transition = self.on_gesture(Gesture::Single(VariableValue::Text(draft)), observer);
        !transition.is_noop()
    }

    /// Returns the render state of the variable.
    #[must_use]
    pub fn view(&self) -> VariableView {
        let variable = &self.variable;
        let (display_value, mode) = match &self.text_input {
            Some(input) => (DisplayValue::Text(input.draft().to_string()), SelectionMode::Text),
            None => {
                let mode = if variable.multi_select && !variable.all_selected {
                    SelectionMode::Multiple
                } else {
                    SelectionMode::Single
                };
                (
                    DisplayValue::from_selection(
                        variable.selected_value.as_ref(),
                        variable.all_selected,
                    ),
                    mode,
                )
            }
        };

        VariableView {
            name: variable.name.clone(),
            description: variable.description.clone(),
            display_value,
            options: self.options.clone(),
            loading: self.is_loading(),
            error: self.error.clone(),
            mode,
            show_all_affordance: variable.multi_select && variable.show_all_option,
        }
    }

    fn reset_for_kind(&mut self) {
        self.text_input = matches!(self.variable.kind, VariableKind::Textbox).then(|| {
            let window = Duration::milliseconds(
                i64::try_from(self.settings.debounce_window_ms).unwrap_or(i64::MAX),
            );
            DebouncedInput::new(
                stringify_selection(self.variable.selected_value.as_ref()),
                window,
            )
        });
    }

    /// Re-parses the option list of a custom variable.
    fn refresh_static(&mut self) -> Option<Reconciliation> {
        if !matches!(self.variable.kind, VariableKind::Custom { .. }) {
            return None;
        }
        let reconciliation = reconcile(
            &self.variable,
            &self.options,
            None,
            &self.settings.invalid_query_message,
        );
        if let Some(options) = &reconciliation.options {
            self.options.clone_from(options);
        }
        Some(reconciliation)
    }

    /// Reorders fetched options after a sort change. The cache key does not
    /// depend on the sort order, so no fetch will do it.
    fn resort_options(&mut self, observer: &mut impl VariableObserver) {
        let sorted = sort_values(&self.options, self.variable.sort);
        if values_equal(&sorted, &self.options) {
            return;
        }
        self.options = sorted;
        let transition = rederive_all(&self.variable, &self.options);
        self.emit(&transition, observer);
    }

    fn apply(&mut self, reconciliation: Reconciliation, observer: &mut impl VariableObserver) {
        match reconciliation.error {
            ErrorUpdate::Keep => {}
            ErrorUpdate::Clear => self.error = None,
            ErrorUpdate::Set(message) => self.error = Some(message),
        }

        if let Some(options) = reconciliation.options {
            tracing::debug!(
                variable = %self.variable.name,
                count = options.len(),
                "option list replaced"
            );
            self.options = options;
            let transition = rederive_all(&self.variable, &self.options);
            self.emit(&transition, observer);
        }
    }

    fn emit(&mut self, transition: &SelectionTransition, observer: &mut impl VariableObserver) {
        apply_transition(&mut self.variable, transition);
        if let Some(selected) = &transition.selected_value {
            observer.on_value_updated(&self.variable.name, selected.as_ref());
        }
        if let Some(all_selected) = transition.all_selected {
            observer.on_all_selected_updated(&self.variable.name, all_selected);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ports::{ManualClock, ObserverEvent};
    use dashvar_domain::{DEFAULT_INVALID_QUERY_MESSAGE, SelectedValue, SortOrder};
    use pretty_assertions::assert_eq;

    fn texts(items: &[&str]) -> Vec<VariableValue> {
        items.iter().map(|s| VariableValue::text(*s)).collect()
    }

    fn payload(items: &[&str]) -> Result<QueryPayload, QueryError> {
        Ok(QueryPayload::with_values(
            items.iter().map(|s| serde_json::json!(s)).collect(),
        ))
    }

    fn engine_with_clock(variable: DashboardVariable) -> (VariableEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let engine =
            VariableEngine::new(variable, ResolverSettings::default(), clock.clone()).unwrap();
        (engine, clock)
    }

    fn engine(variable: DashboardVariable) -> VariableEngine {
        engine_with_clock(variable).0
    }

    fn env_snapshot(env: &str) -> ExistingVariables {
        ExistingVariables::new().with(
            DashboardVariable::custom("env", "dev,prod")
                .with_selected(SelectedValue::Single(env.into())),
        )
    }

    fn host_variable() -> DashboardVariable {
        DashboardVariable::query("host", "SELECT host FROM hosts WHERE env = {{.env}}")
            .with_sort(SortOrder::Ascending)
            .with_multi_select(true)
    }

    #[test]
    fn test_new_rejects_invalid_variable() {
        let result = VariableEngine::new(
            DashboardVariable::textbox(""),
            ResolverSettings::default(),
            Arc::new(ManualClock::default()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_options_available_immediately() {
        let engine = engine(DashboardVariable::custom("env", " a, b ,,c"));
        assert_eq!(engine.options(), texts(&["a", "b", "c"]).as_slice());
        assert!(engine.cache_key(&ExistingVariables::new()).is_none());
    }

    #[test]
    fn test_textbox_has_no_options_and_never_fetches() {
        let mut engine = engine(DashboardVariable::textbox("q"));
        assert!(engine.options().is_empty());
        assert!(engine.begin_fetch(&ExistingVariables::new()).is_none());
        assert_eq!(engine.view().mode, SelectionMode::Text);
    }

    #[test]
    fn test_fetch_only_when_key_changes() {
        let mut engine = engine(host_variable());
        let mut events = Vec::new();

        let request = engine.begin_fetch(&env_snapshot("prod")).unwrap();
        assert!(engine.is_loading());
        assert_eq!(request.query, "SELECT host FROM hosts WHERE env = {{.env}}");
        assert_eq!(request.variables["env"], serde_json::json!("prod"));
        assert!(engine.begin_fetch(&env_snapshot("prod")).is_none());

        engine.complete_fetch(&request.key, payload(&["b", "a"]), &mut events);
        assert!(!engine.is_loading());
        assert!(engine.begin_fetch(&env_snapshot("prod")).is_none());
        assert!(engine.begin_fetch(&env_snapshot("dev")).is_some());
    }

    #[test]
    fn test_unchanged_refetch_is_silent() {
        let mut engine = engine(host_variable().with_all_selected(true));
        let mut events = Vec::new();

        let first = engine.begin_fetch(&env_snapshot("prod")).unwrap();
        engine.complete_fetch(&first.key, payload(&["b", "a", "c"]), &mut events);
        assert_eq!(engine.options(), texts(&["a", "b", "c"]).as_slice());
        events.clear();

        let second = engine.begin_fetch(&env_snapshot("dev")).unwrap();
        let kind = engine.complete_fetch(&second.key, payload(&["c", "b", "a"]), &mut events);
        assert_eq!(kind, Some(ReconcileKind::Unchanged));
        assert!(events.is_empty());
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut engine = engine(host_variable());
        let mut events = Vec::new();

        let old = engine.begin_fetch(&env_snapshot("prod")).unwrap();
        let new = engine.begin_fetch(&env_snapshot("dev")).unwrap();

        assert_eq!(engine.complete_fetch(&old.key, payload(&["old"]), &mut events), None);
        assert!(engine.options().is_empty());
        assert!(engine.is_loading());

        engine.complete_fetch(&new.key, payload(&["new"]), &mut events);
        assert_eq!(engine.options(), texts(&["new"]).as_slice());
    }

    #[test]
    fn test_failure_keeps_options_and_sets_message() {
        let mut engine = engine(host_variable());
        let mut events = Vec::new();

        let first = engine.begin_fetch(&env_snapshot("prod")).unwrap();
        engine.complete_fetch(&first.key, payload(&["a"]), &mut events);
        events.clear();

        let second = engine.begin_fetch(&env_snapshot("dev")).unwrap();
        let kind = engine.complete_fetch(
            &second.key,
            Err(QueryError::Invalid("bad".to_string())),
            &mut events,
        );

        assert_eq!(kind, Some(ReconcileKind::Failed));
        assert_eq!(engine.options(), texts(&["a"]).as_slice());
        assert_eq!(engine.error(), Some(DEFAULT_INVALID_QUERY_MESSAGE));
        assert_eq!(
            engine.last_query_error(),
            Some(&QueryError::Invalid("bad".to_string()))
        );
        assert!(events.is_empty());

        let third = engine.begin_fetch(&env_snapshot("prod")).unwrap();
        engine.complete_fetch(&third.key, payload(&["a"]), &mut events);
        assert_eq!(engine.error(), None);
        assert!(engine.last_query_error().is_none());
    }

    #[test]
    fn test_all_selected_follows_new_options() {
        let mut engine = engine(host_variable().with_all_selected(true));
        let mut events = Vec::new();

        let request = engine.begin_fetch(&env_snapshot("prod")).unwrap();
        engine.complete_fetch(&request.key, payload(&["b", "a"]), &mut events);

        assert_eq!(
            events,
            vec![ObserverEvent::ValueUpdated {
                name: "host".to_string(),
                value: Some(SelectedValue::Multiple(texts(&["a", "b"]))),
            }]
        );
        assert_eq!(engine.view().display_value, DisplayValue::All);
    }

    #[test]
    fn test_gestures_notify_owner_once() {
        let mut engine = engine(DashboardVariable::custom("svc", "a,b,c").with_multi_select(true));
        let mut events = Vec::new();

        engine.on_gesture(Gesture::All, &mut events);
        assert_eq!(
            events,
            vec![
                ObserverEvent::ValueUpdated {
                    name: "svc".to_string(),
                    value: Some(SelectedValue::Multiple(texts(&["a", "b", "c"]))),
                },
                ObserverEvent::AllSelectedUpdated {
                    name: "svc".to_string(),
                    all_selected: true,
                },
            ]
        );

        events.clear();
        engine.on_gesture(Gesture::All, &mut events);
        assert!(events.is_empty());

        engine.on_gesture(Gesture::Single("b".into()), &mut events);
        assert_eq!(
            events,
            vec![
                ObserverEvent::ValueUpdated {
                    name: "svc".to_string(),
                    value: Some(SelectedValue::Single("b".into())),
                },
                ObserverEvent::AllSelectedUpdated {
                    name: "svc".to_string(),
                    all_selected: false,
                },
            ]
        );
    }

    #[test]
    fn test_debounced_text_commits_once() {
        let (mut engine, clock) = engine_with_clock(DashboardVariable::textbox("q"));
        let mut events = Vec::new();

        engine.on_text_input("a");
        clock.advance_ms(100);
        engine.on_text_input("ab");
        clock.advance_ms(100);
        engine.on_text_input("abc");
        assert!(!engine.tick(&mut events));
        assert_eq!(engine.view().display_value, DisplayValue::Text("abc".to_string()));

        clock.advance_ms(499);
        assert!(!engine.tick(&mut events));
        assert!(events.is_empty());

        clock.advance_ms(1);
        assert!(engine.tick(&mut events));
        assert_eq!(
            events,
            vec![ObserverEvent::ValueUpdated {
                name: "q".to_string(),
                value: Some(SelectedValue::Single("abc".into())),
            }]
        );

        clock.advance_ms(1000);
        assert!(!engine.tick(&mut events));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_external_reset_overrides_draft() {
        let (mut engine, clock) = engine_with_clock(DashboardVariable::textbox("q"));
        let mut events = Vec::new();

        engine.on_text_input("local");
        let reset = DashboardVariable::textbox("q")
            .with_selected(SelectedValue::Single("server".into()));
        engine.set_variable(reset, &mut events).unwrap();

        clock.advance_ms(1000);
        assert!(!engine.tick(&mut events));
        assert!(events.is_empty());
        assert_eq!(engine.view().display_value, DisplayValue::Text("server".to_string()));
    }

    #[test]
    fn test_custom_list_change_rederives_all() {
        let mut engine = engine(
            DashboardVariable::custom("svc", "a,b")
                .with_multi_select(true)
                .with_selected(SelectedValue::Multiple(texts(&["a", "b"])))
                .with_all_selected(true),
        );
        let mut events = Vec::new();

        let updated = engine.variable().clone();
        let updated = DashboardVariable {
            kind: VariableKind::Custom {
                custom_value: "a,b,c".to_string(),
            },
            ..updated
        };
        engine.set_variable(updated, &mut events).unwrap();

        assert_eq!(engine.options(), texts(&["a", "b", "c"]).as_slice());
        assert_eq!(
            events,
            vec![ObserverEvent::ValueUpdated {
                name: "svc".to_string(),
                value: Some(SelectedValue::Multiple(texts(&["a", "b", "c"]))),
            }]
        );
    }

    #[test]
    fn test_view_modes() {
        let multi = engine(DashboardVariable::custom("svc", "a").with_multi_select(true));
        let view = multi.view();
        assert_eq!(view.mode, SelectionMode::Multiple);
        assert!(view.show_all_affordance);

        let all = engine(
            DashboardVariable::custom("svc", "a")
                .with_multi_select(true)
                .with_all_selected(true),
        );
        assert_eq!(all.view().mode, SelectionMode::Single);

        let single = engine(DashboardVariable {
            show_all_option: true,
            ..DashboardVariable::custom("env", "a")
        });
        assert!(!single.view().show_all_affordance);
    }

    #[test]
    fn test_sort_change_reorders_custom_options() {
        let mut engine = engine(DashboardVariable::custom("svc", "b,a,c"));
        let mut events = Vec::new();
        assert_eq!(engine.options(), texts(&["b", "a", "c"]).as_slice());

        let sorted = engine.variable().clone().with_sort(SortOrder::Ascending);
        engine.set_variable(sorted, &mut events).unwrap();
        assert_eq!(engine.options(), texts(&["a", "b", "c"]).as_slice());

        let reversed = engine.variable().clone().with_sort(SortOrder::Descending);
        engine.set_variable(reversed, &mut events).unwrap();
        assert_eq!(engine.options(), texts(&["c", "b", "a"]).as_slice());
    }

    #[test]
    fn test_sort_change_reorders_fetched_options() {
        let mut engine = engine(host_variable().with_all_selected(true));
        let mut events = Vec::new();

        let request = engine.begin_fetch(&env_snapshot("prod")).unwrap();
        engine.complete_fetch(&request.key, payload(&["b", "c", "a"]), &mut events);
        assert_eq!(engine.options(), texts(&["a", "b", "c"]).as_slice());
        events.clear();

        let descending = engine.variable().clone().with_sort(SortOrder::Descending);
        engine.set_variable(descending, &mut events).unwrap();

        assert_eq!(engine.options(), texts(&["c", "b", "a"]).as_slice());
        assert!(engine.begin_fetch(&env_snapshot("prod")).is_none());
        assert_eq!(
            events,
            vec![ObserverEvent::ValueUpdated {
                name: "host".to_string(),
                value: Some(SelectedValue::Multiple(texts(&["c", "b", "a"]))),
            }]
        );
    }

    #[test]
    fn test_fixed_query_is_fetched_again() {
        let mut engine = engine(DashboardVariable::query("host", "SELECT hots FROM t"));
        let mut events = Vec::new();
        let snapshot = ExistingVariables::new();

        let broken = engine.begin_fetch(&snapshot).unwrap();
        engine.complete_fetch(
            &broken.key,
            Err(QueryError::Invalid("unknown column hots".to_string())),
            &mut events,
        );
        assert_eq!(engine.error(), Some(DEFAULT_INVALID_QUERY_MESSAGE));
        assert!(engine.begin_fetch(&snapshot).is_none());

        engine
            .set_variable(DashboardVariable::query("host", "SELECT host FROM t"), &mut events)
            .unwrap();
        let fixed = engine.begin_fetch(&snapshot).unwrap();
        assert_eq!(fixed.query, "SELECT host FROM t");

        let kind = engine.complete_fetch(&fixed.key, payload(&["web-1"]), &mut events);
        assert_eq!(kind, Some(ReconcileKind::Replaced));
        assert_eq!(engine.error(), None);
        assert_eq!(engine.options(), texts(&["web-1"]).as_slice());
    }

    #[test]
    fn test_query_edit_discards_in_flight_result() {
        let mut engine = engine(DashboardVariable::query("host", "SELECT a FROM t"));
        let mut events = Vec::new();
        let snapshot = ExistingVariables::new();

        let old = engine.begin_fetch(&snapshot).unwrap();
        engine
            .set_variable(DashboardVariable::query("host", "SELECT b FROM t"), &mut events)
            .unwrap();
        assert!(!engine.is_loading());

        assert_eq!(engine.complete_fetch(&old.key, payload(&["a"]), &mut events), None);
        assert!(engine.options().is_empty());
    }
}
