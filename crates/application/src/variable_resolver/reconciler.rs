//! Options reconciliation
//!
//! Decides what a variable's option list and inline error become after a
//! static list is parsed or a query completes. Nothing here fails: every
//! problem degrades to keeping the last good options.

use dashvar_domain::{DashboardVariable, VariableKind, VariableValue};

use super::sorter::{normalize_values, parse_custom_values, sort_values, values_equal};
use crate::ports::{QueryError, QueryPayload};

/// What happens to the inline error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorUpdate {
    /// Leave the current message as it is.
    Keep,
    /// Remove the message.
    Clear,
    /// Show this message.
    Set(String),
}

/// Which path a reconciliation took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileKind {
    /// A new, different option list was produced.
    Replaced,
    /// The produced list equals the current one.
    Unchanged,
    /// The query succeeded but its values were missing or not scalars.
    Malformed,
    /// The query failed.
    Failed,
    /// The variable has no option list, or there was nothing to apply.
    NotApplicable,
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The new option list, or `None` to keep the current one.
    pub options: Option<Vec<VariableValue>>,
    /// What happens to the inline error.
    pub error: ErrorUpdate,
    /// Path taken.
    pub kind: ReconcileKind,
}

impl Reconciliation {
    const fn not_applicable() -> Self {
        Self {
            options: None,
            error: ErrorUpdate::Keep,
            kind: ReconcileKind::NotApplicable,
        }
    }

    /// Compares `candidate` against the options exactly as displayed.
    fn from_candidate(candidate: Vec<VariableValue>, current: &[VariableValue]) -> Self {
        if values_equal(&candidate, current) {
            Self {
                options: None,
                error: ErrorUpdate::Clear,
                kind: ReconcileKind::Unchanged,
            }
        } else {
            Self {
                options: Some(candidate),
                error: ErrorUpdate::Clear,
                kind: ReconcileKind::Replaced,
            }
        }
    }
}

/// Reconciles the options of a variable.
///
/// `outcome` is the completed query for query variables; it is ignored
/// for the other kinds. `invalid_query_message` is shown when the query
/// failed.
#[must_use]
pub fn reconcile(
    variable: &DashboardVariable,
    current: &[VariableValue],
    outcome: Option<&Result<QueryPayload, QueryError>>,
    invalid_query_message: &str,
) -> Reconciliation {
    match &variable.kind {
        VariableKind::Textbox => Reconciliation::not_applicable(),
        VariableKind::Custom { custom_value } => {
            let candidate = sort_values(&parse_custom_values(custom_value), variable.sort);
            Reconciliation::from_candidate(candidate, current)
        }
        VariableKind::Query { .. } => match outcome {
            None => Reconciliation::not_applicable(),
            Some(Ok(payload)) => reconcile_payload(variable, current, payload),
            Some(Err(error)) => {
                tracing::debug!(variable = %variable.name, %error, "option query failed");
                Reconciliation {
                    options: None,
                    error: ErrorUpdate::Set(invalid_query_message.to_string()),
                    kind: ReconcileKind::Failed,
                }
            }
        },
    }
}

fn reconcile_payload(
    variable: &DashboardVariable,
    current: &[VariableValue],
    payload: &QueryPayload,
) -> Reconciliation {
    let malformed = Reconciliation {
        options: None,
        error: ErrorUpdate::Clear,
        kind: ReconcileKind::Malformed,
    };

    let Some(serde_json::Value::Array(raw)) = &payload.variable_values else {
        tracing::warn!(
            variable = %variable.name,
            "query response has no value list, keeping previous options"
        );
        return malformed;
    };

    match normalize_values(raw) {
        Ok(values) => {
            let candidate = sort_values(&values, variable.sort);
            Reconciliation::from_candidate(candidate, current)
        }
        Err(error) => {
            tracing::warn!(
                variable = %variable.name,
                %error,
                "could not normalize query response, keeping previous options"
            );
            malformed
        }
    }
}
