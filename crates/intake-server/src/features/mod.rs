//! Feature modules implementing the Intake API
//!
//! Each feature is a vertical slice with its own commands and routes:
//!
//! - **uploads**: multipart file upload, storage, and event publication

pub mod uploads;

use std::sync::Arc;

use axum::Router;
use intake_common::notify::NotificationChannel;

use crate::storage::Storage;

/// Shared state for all feature routes
///
/// Everything in here is constructed at startup and injected; handlers never
/// reach for process-wide singletons.
#[derive(Clone)]
pub struct FeatureState {
    /// Local-disk storage the uploads are written to
    pub storage: Storage,
    /// Channel file-ready events are published on
    pub channel: Arc<dyn NotificationChannel>,
    /// Topic name for file-ready events
    pub topic: String,
}

/// Creates the main API router with all feature routes mounted
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().merge(uploads::upload_routes().with_state(state))
}
