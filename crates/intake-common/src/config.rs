//! Configuration management
//!
//! Both the upload server and the processor load the same configuration
//! from environment variables (a `.env` file is honored in development).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default maximum accepted upload size in bytes (100 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Default directory uploaded files are stored in.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Default directory processed output is written to.
pub const DEFAULT_PROCESSED_DIR: &str = "./processed";

/// Default Redis connection URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default pub/sub topic carrying file-ready events.
pub const DEFAULT_CHANNEL_TOPIC: &str = "file-uploaded";

/// Default file extension the processor recognizes.
pub const DEFAULT_PROCESSED_EXTENSION: &str = "csv";

/// Default CORS allowed origin (all origins, as the upload API is open).
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";

/// Intake configuration shared by server and processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub channel: ChannelConfig,
    pub pipeline: PipelineConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

/// File storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub processed_dir: PathBuf,
}

/// Notification channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub redis_url: String,
    pub topic: String,
}

/// Processor pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Extension of files the processor picks up; others are skipped
    pub recognized_extension: String,
    /// Cap on one file's processing time; absent or 0 means no timeout
    pub timeout_secs: Option<u64>,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl PipelineConfig {
    /// Pipeline timeout as a duration, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            Some(0) | None => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        }
    }
}

impl IntakeConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = IntakeConfig {
            server: ServerConfig {
                host: std::env::var("INTAKE_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("INTAKE_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("INTAKE_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
                max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
            storage: StorageConfig {
                upload_dir: std::env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR)),
                processed_dir: std::env::var("PROCESSED_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROCESSED_DIR)),
            },
            channel: ChannelConfig {
                redis_url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
                topic: std::env::var("REDIS_CHANNEL")
                    .unwrap_or_else(|_| DEFAULT_CHANNEL_TOPIC.to_string()),
            },
            pipeline: PipelineConfig {
                recognized_extension: std::env::var("PROCESSED_EXTENSION")
                    .unwrap_or_else(|_| DEFAULT_PROCESSED_EXTENSION.to_string()),
                timeout_secs: std::env::var("PIPELINE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok()),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: std::env::var("CORS_ALLOW_CREDENTIALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(false),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("Maximum upload size must be greater than 0");
        }

        if self.channel.redis_url.is_empty() {
            anyhow::bail!("Redis URL cannot be empty");
        }

        if self.channel.topic.is_empty() {
            anyhow::bail!("Channel topic cannot be empty");
        }

        if self.storage.upload_dir.as_os_str().is_empty()
            || self.storage.processed_dir.as_os_str().is_empty()
        {
            anyhow::bail!("Storage directories cannot be empty");
        }

        let extension = &self.pipeline.recognized_extension;
        if extension.is_empty() || extension.starts_with('.') {
            anyhow::bail!(
                "Recognized extension must be non-empty and given without a leading dot, got {:?}",
                extension
            );
        }

        Ok(())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
                processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            },
            channel: ChannelConfig {
                redis_url: DEFAULT_REDIS_URL.to_string(),
                topic: DEFAULT_CHANNEL_TOPIC.to_string(),
            },
            pipeline: PipelineConfig {
                recognized_extension: DEFAULT_PROCESSED_EXTENSION.to_string(),
                timeout_secs: None,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
        }
    }
}
