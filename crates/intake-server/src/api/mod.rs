pub mod response;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use intake_common::config::IntakeConfig;
use intake_common::notify::{NotificationChannel, RedisChannel};
use serde_json::json;
use tokio::signal;
use tracing::info;

use crate::features::{self, FeatureState};
use crate::middleware;
use crate::storage::Storage;

/// Run the upload API against the Redis channel from `config`
pub async fn serve(config: IntakeConfig) -> anyhow::Result<()> {
    let channel = Arc::new(RedisChannel::connect(&config.channel.redis_url).await?);
    serve_with_channel(config, channel).await
}

/// Run the upload API against an explicitly constructed channel.
///
/// The channel is injected rather than created internally so tests and
/// single-process setups can pass an in-memory backend.
pub async fn serve_with_channel(
    config: IntakeConfig,
    channel: Arc<dyn NotificationChannel>,
) -> anyhow::Result<()> {
    let storage = Storage::new(config.storage.upload_dir.clone());

    let state = FeatureState {
        storage,
        channel,
        topic: config.channel.topic.clone(),
    };

    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: FeatureState, config: &IntakeConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(features::router(state))
        // Apply layers from innermost to outermost
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing uploads time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
