//! Intake Server - Main entry point

use anyhow::Result;
use intake_common::config::IntakeConfig;
use intake_common::logging::{init_logging, LogConfig};
use intake_server::api;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::builder()
        .log_file_prefix("intake-server".to_string())
        .filter_directives("intake_server=debug,tower_http=debug".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting Intake Server");

    // Load configuration
    let config = IntakeConfig::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );
    info!(
        upload_dir = %config.storage.upload_dir.display(),
        topic = %config.channel.topic,
        "Upload directory and notification topic configured"
    );

    api::serve(config).await?;

    Ok(())
}
