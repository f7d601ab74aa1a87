//! Intake Processor Library
//!
//! The consumer side of the Intake platform: subscribes to file-ready
//! notifications and streams each announced CSV file through a
//! row-normalization pipeline into the processed-files directory.
//!
//! # Architecture
//!
//! - [`pipeline`]: the streaming transform (parse, per-row transform,
//!   serialize, write) with a bounded in-flight window between the parse
//!   and write stages
//! - [`coordinator`]: the notification-driven orchestration around the
//!   pipeline, covering filtering, destination naming, error containment
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use intake_common::config::IntakeConfig;
//! use intake_common::notify::RedisChannel;
//! use intake_processor::coordinator::IntakeCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IntakeConfig::load()?;
//!     let channel = Arc::new(RedisChannel::connect(&config.channel.redis_url).await?);
//!     IntakeCoordinator::new(channel, &config).run().await?;
//!     Ok(())
//! }
//! ```

pub mod coordinator;
pub mod pipeline;
