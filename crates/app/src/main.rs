//! dashvar binary.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = dashvar::Cli::parse();
    tracing::info!("Starting dashvar v{}", env!("CARGO_PKG_VERSION"));

    let report = dashvar::run(&cli).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
