//! Query execution port
//!
//! Defines the contract the engine needs from whatever runs option queries.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashvar_domain::CacheKey;
use serde::{Deserialize, Serialize};

/// Errors reported by a query executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The query was rejected (invalid syntax, unresolved variable, ...).
    #[error("Invalid query: {0}")]
    Invalid(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The request could not be delivered.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request did not complete in time.
    #[error("Query timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// One option query, identified by its cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    /// Cache key the result belongs to.
    #[serde(skip)]
    pub key: CacheKey,

    /// Query template as written by the dashboard author.
    pub query: String,

    /// Selected value of every variable in the dashboard, so nested
    /// placeholders can be substituted by the executor.
    pub variables: BTreeMap<String, serde_json::Value>,
}

/// Successful query response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    /// The option values. Anything other than an array of scalars is
    /// treated as a malformed response by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_values: Option<serde_json::Value>,
}

impl QueryPayload {
    /// Creates a payload holding the given values.
    #[must_use]
    pub fn with_values(values: Vec<serde_json::Value>) -> Self {
        Self {
            variable_values: Some(serde_json::Value::Array(values)),
        }
    }
}

/// Port for running option queries.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs the query and returns its option values.
    ///
    /// # Errors
    /// Returns a [`QueryError`] if the query is invalid or cannot be run.
    async fn execute(&self, request: &QueryRequest) -> Result<QueryPayload, QueryError>;
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for Arc<T> {
    async fn execute(&self, request: &QueryRequest) -> Result<QueryPayload, QueryError> {
        (**self).execute(request).await
    }
}
