//! Query executor implementation using reqwest.
//!
//! Posts `{ "query", "variables" }` to the variable query endpoint and
//! decodes the option values from the response.

use std::time::Duration;

use async_trait::async_trait;
use dashvar_application::ports::{QueryError, QueryExecutor, QueryPayload, QueryRequest};
use reqwest::{Client, Url};

use crate::config::{ConfigError, QueryClientConfig};

/// HTTP query executor.
///
/// Wraps `reqwest::Client` and implements the `QueryExecutor` port from
/// the application layer.
pub struct ReqwestQueryExecutor {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    timeout_ms: u64,
}

impl ReqwestQueryExecutor {
    /// Creates an executor from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the client cannot
    /// be created.
    pub fn new(config: &QueryClientConfig) -> Result<Self, QueryError> {
        let endpoint = config
            .endpoint()
            .map_err(|e: ConfigError| QueryError::Invalid(e.to_string()))?;
        let client = Client::builder()
            .user_agent(concat!("dashvar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        Ok(Self::with_client(
            client,
            endpoint,
            config.token.clone(),
            config.timeout_ms,
        ))
    }

    /// Creates an executor with a custom reqwest client.
    #[must_use]
    pub const fn with_client(
        client: Client,
        endpoint: Url,
        token: Option<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            client,
            endpoint,
            token,
            timeout_ms,
        }
    }

    /// Returns the endpoint queries are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Maps reqwest errors to `QueryError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> QueryError {
        if error.is_timeout() {
            return QueryError::Timeout { timeout_ms };
        }
        if error.is_decode() {
            return QueryError::Decode(error.to_string());
        }
        QueryError::Transport(error.to_string())
    }
}

/// Decodes a response body.
///
/// Accepts the payload itself or the `{ "status", "data" }` envelope. An
/// envelope with `"status": "error"` is an invalid query.
pub(crate) fn decode_payload(body: &str) -> Result<QueryPayload, QueryError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| QueryError::Decode(e.to_string()))?;

    if value.get("status").and_then(serde_json::Value::as_str) == Some("error") {
        let message = value
            .get("error")
            .map(|e| e.as_str().map_or_else(|| e.to_string(), str::to_string))
            .unwrap_or_else(|| "query failed".to_string());
        return Err(QueryError::Invalid(message));
    }

    let inner = match value.get("data") {
        Some(data) if value.get("variableValues").is_none() => data.clone(),
        _ => value,
    };
    serde_json::from_value(inner).map_err(|e| QueryError::Decode(e.to_string()))
}

#[async_trait]
impl QueryExecutor for ReqwestQueryExecutor {
    async fn execute(&self, request: &QueryRequest) -> Result<QueryPayload, QueryError> {
        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .timeout(Duration::from_millis(self.timeout_ms))
            .json(request);

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(key = %request.key, endpoint = %self.endpoint, "posting variable query");
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

        if !status.is_success() {
            tracing::debug!(key = %request.key, status = status.as_u16(), "variable query rejected");
            return Err(QueryError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        decode_payload(&body)
    }
}
