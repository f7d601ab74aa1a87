//! Intake Server Library
//!
//! HTTP upload API for the Intake platform.
//!
//! # Overview
//!
//! The server accepts multipart file uploads, persists them to local-disk
//! storage, and publishes one file-ready event per stored file on the
//! notification channel. Processing happens elsewhere: the intake-processor
//! binary subscribes to the same channel and transforms the stored files
//! independently of this process.
//!
//! - **API Endpoints**: `POST /upload` (multipart) and `GET /health`
//! - **Storage Backend**: local filesystem under a configured upload root
//! - **Notifications**: Redis pub/sub (or an in-memory channel in tests),
//!   published only after the durable write completes
//! - **Middleware**: CORS, request tracing, upload size limit
//!
//! # Example
//!
//! ```no_run
//! use intake_common::config::IntakeConfig;
//! use intake_server::api;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IntakeConfig::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod features;
pub mod middleware;
pub mod storage;
