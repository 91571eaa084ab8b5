//! Resolve variable use case

use std::sync::Arc;

use dashvar_domain::{ExistingVariables, ResolverSettings, VariableView};

use crate::ports::{Clock, ObserverEvent, QueryExecutor};
use crate::variable_resolver::{ReconcileKind, VariableEngine};
use crate::{ApplicationError, ApplicationResult};

/// Input for a one-shot resolution.
#[derive(Debug, Clone)]
pub struct ResolveVariableInput {
    /// Name of the variable to resolve.
    pub name: String,
    /// Snapshot of every variable in the dashboard.
    pub existing: ExistingVariables,
    /// Turn a failed option query into an error instead of an inline message.
    pub strict: bool,
}

/// Output of a one-shot resolution.
#[derive(Debug, Clone)]
pub struct ResolveVariableOutput {
    /// Render state after resolution.
    pub view: VariableView,
    /// Owner notifications emitted during resolution.
    pub events: Vec<ObserverEvent>,
    /// Path taken by the option fetch, if one ran.
    pub reconcile: Option<ReconcileKind>,
}

/// Resolves a single variable of a dashboard snapshot.
pub struct ResolveVariable<E> {
    executor: E,
    settings: ResolverSettings,
    clock: Arc<dyn Clock>,
}

impl<E: QueryExecutor> ResolveVariable<E> {
    /// Creates a new `ResolveVariable` use case.
    pub fn new(executor: E, settings: ResolverSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            executor,
            settings,
            clock,
        }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns an error if the variable is missing or invalid, or, in strict
    /// mode, if its option query failed.
    pub async fn execute(
        &self,
        input: ResolveVariableInput,
    ) -> ApplicationResult<ResolveVariableOutput> {
        let variable = input
            .existing
            .get(&input.name)
            .cloned()
            .ok_or_else(|| ApplicationError::NotFound(input.name.clone()))?;

        let mut engine = VariableEngine::new(variable, self.settings.clone(), self.clock.clone())?;
        let mut events = Vec::new();
        let reconcile = engine
            .resolve(&self.executor, &input.existing, &mut events)
            .await;

        if input.strict
            && let Some(error) = engine.last_query_error()
        {
            return Err(ApplicationError::Query(error.clone()));
        }

        tracing::info!(
            variable = %input.name,
            options = engine.options().len(),
            "variable resolved"
        );

        Ok(ResolveVariableOutput {
            view: engine.view(),
            events,
            reconcile,
        })
    }
}
