//! Intake Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the Intake project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all Intake workspace
//! members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Configuration**: Environment-based configuration for both processes
//! - **Events**: The file-ready event published after every stored upload
//! - **Notification Channel**: Pub/sub abstraction with Redis and in-memory
//!   backends
//! - **Checksums**: Integrity metadata for stored files
//!
//! # Example
//!
//! ```no_run
//! use intake_common::config::IntakeConfig;
//! use intake_common::notify::{NotificationChannel, RedisChannel};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IntakeConfig::load()?;
//!     let channel = RedisChannel::connect(&config.channel.redis_url).await?;
//!     let mut subscription = channel.subscribe(&config.channel.topic).await?;
//!     while let Some(payload) = subscription.recv().await {
//!         println!("file ready: {payload}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod notify;

// Re-export commonly used types
pub use error::{IntakeError, Result};
pub use event::FileReadyEvent;
