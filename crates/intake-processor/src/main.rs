//! Intake Processor - notification-driven file processing service

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use intake_common::config::IntakeConfig;
use intake_common::logging::{init_logging, LogConfig, LogLevel};
use intake_common::notify::RedisChannel;
use intake_processor::coordinator::IntakeCoordinator;
use intake_processor::pipeline;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "intake-processor")]
#[command(author, version, about = "Intake file processor")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Subscribe to the notification channel and process files until shutdown
    Run,

    /// Push one local file through the pipeline and exit.
    ///
    /// This is the manual resubmission path: failed notifications are not
    /// requeued, so operators re-run the affected file here.
    Process {
        /// Source file to process
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (defaults to processed-<file name> in the processed
        /// directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("intake-processor".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    let config = IntakeConfig::load()?;

    match cli.command {
        Command::Run => {
            let channel = Arc::new(RedisChannel::connect(&config.channel.redis_url).await?);
            let coordinator = IntakeCoordinator::new(channel, &config);

            tokio::select! {
                result = coordinator.run() => result?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down");
                },
            }
        },
        Command::Process { input, output } => {
            let destination = match output {
                Some(path) => path,
                None => {
                    let name = input
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "output".to_string());
                    config.storage.processed_dir.join(format!("processed-{name}"))
                },
            };

            let summary =
                pipeline::process_file(&input, &destination, config.pipeline.timeout()).await?;

            info!(
                source = %input.display(),
                destination = %destination.display(),
                rows = summary.rows,
                "File processed"
            );
        },
    }

    Ok(())
}
