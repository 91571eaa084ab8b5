//! dashvar command line
//!
//! Loads a dashboard variable file, resolves one variable against the
//! query service and prints its render state as JSON.
//!
//! The file holds either a bare map of variables keyed by name, or an
//! object with `variables` and optional resolver `settings`:
//!
//! ```json
//! {
//!   "variables": {
//!     "env": { "name": "env", "type": "CUSTOM", "customValue": "dev,prod" }
//!   },
//!   "settings": { "debounce_window_ms": 500 }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use dashvar_application::{
    ApplicationError, ObserverEvent, QueryExecutor, ResolveVariable, ResolveVariableInput,
};
use dashvar_domain::{ExistingVariables, ResolverSettings, VariableView};
use dashvar_infrastructure::config::{ENV_QUERY_TIMEOUT_MS, ENV_QUERY_URL};
use dashvar_infrastructure::{
    ConfigError, MemoizedQueryExecutor, QueryClientConfig, ReqwestQueryExecutor, SystemClock,
};
use serde::{Deserialize, Serialize};

/// Command line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dashvar",
    about = "Resolve a dashboard variable and print its view",
    version
)]
pub struct Cli {
    /// Dashboard variable file (JSON).
    #[arg(short, long)]
    pub file: PathBuf,

    /// Name of the variable to resolve.
    #[arg(short, long)]
    pub variable: String,

    /// Base URL of the query service.
    #[arg(long, env = "DASHVAR_QUERY_URL")]
    pub url: Option<String>,

    /// Request timeout in milliseconds.
    #[arg(long, env = "DASHVAR_QUERY_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Fail instead of reporting a failed option query inline.
    #[arg(long)]
    pub strict: bool,
}

/// Errors raised by the command line.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The dashboard file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The dashboard file is not valid.
    #[error("Invalid dashboard file {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Query client configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Resolution failed.
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

/// Contents of a dashboard variable file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardFile {
    /// Every variable of the dashboard.
    pub variables: ExistingVariables,
    /// Resolver tunables.
    #[serde(default)]
    pub settings: ResolverSettings,
}

impl DashboardFile {
    /// Parses a dashboard file from JSON text.
    ///
    /// A top-level `variables` object that is not itself a variable
    /// definition selects the wrapped shape; its errors are reported as is.
    ///
    /// # Errors
    /// Returns an error if the text is not valid JSON or does not match
    /// the selected shape.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let wrapped = value
            .get("variables")
            .is_some_and(|variables| variables.get("type").is_none());

        if wrapped {
            serde_json::from_str(text)
        } else {
            Ok(Self {
                variables: serde_json::from_str(text)?,
                settings: ResolverSettings::default(),
            })
        }
    }
}

/// Reads and parses a dashboard file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub async fn load_dashboard(path: &Path) -> Result<DashboardFile, CliError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    DashboardFile::from_json(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// What the command prints.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Render state of the variable.
    pub view: VariableView,
    /// Selection changes the owner would apply.
    pub events: Vec<ObserverEvent>,
}

/// Builds the query client configuration: flags win over the environment.
///
/// # Errors
/// Returns an error if a setting is invalid.
pub fn client_config(cli: &Cli) -> Result<QueryClientConfig, ConfigError> {
    client_config_with(cli, |key| std::env::var(key).ok())
}

/// Like [`client_config`], reading the environment through `lookup`.
///
/// # Errors
/// Returns an error if a setting is invalid.
pub fn client_config_with(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<QueryClientConfig, ConfigError> {
    let timeout_ms = cli.timeout_ms.map(|t| t.to_string());
    QueryClientConfig::from_lookup(|key| match key {
        ENV_QUERY_URL if cli.url.is_some() => cli.url.clone(),
        ENV_QUERY_TIMEOUT_MS if timeout_ms.is_some() => timeout_ms.clone(),
        _ => lookup(key),
    })
}

/// Resolves `variable` from `dashboard` with the given executor.
///
/// # Errors
/// Returns an error if the variable is missing or invalid, or, with
/// `strict`, if its option query failed.
pub async fn resolve<E: QueryExecutor>(
    executor: E,
    dashboard: DashboardFile,
    variable: &str,
    strict: bool,
) -> Result<Report, CliError> {
    let use_case = ResolveVariable::new(executor, dashboard.settings, Arc::new(SystemClock::new()));
    let output = use_case
        .execute(ResolveVariableInput {
            name: variable.to_string(),
            existing: dashboard.variables,
            strict,
        })
        .await?;

    Ok(Report {
        view: output.view,
        events: output.events,
    })
}

/// Runs the command.
///
/// # Errors
/// Returns an error if loading, configuration, or resolution fails.
pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let dashboard = load_dashboard(&cli.file).await?;
    let config = client_config(cli)?;
    tracing::info!(
        file = %cli.file.display(),
        variables = dashboard.variables.len(),
        endpoint = %config.base_url,
        "dashboard loaded"
    );

    let executor = ReqwestQueryExecutor::new(&config)
        .map_err(|e| CliError::Application(ApplicationError::Query(e)))?;
    resolve(
        MemoizedQueryExecutor::new(executor),
        dashboard,
        &cli.variable,
        cli.strict,
    )
    .await
}
