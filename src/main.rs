use anyhow::{Context, Result};
use clap::Parser;
use jobassist::export_cli::{handle_command, ExportCli};
use jobassist::ConfigManager;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ExportCli::parse();
    let config = ConfigManager::load()?;

    // Initialize logging first
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(&config.environment.log_file)
        .with_context(|| {
            format!(
                "Failed to open log file: {}",
                config.environment.log_file.display()
            )
        })?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        "Environment: {}",
        std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string())
    );
    info!("API: {}", config.service.api_base_url);
    info!("Output: {}", config.environment.output_path.display());

    handle_command(cli, config).await
}
