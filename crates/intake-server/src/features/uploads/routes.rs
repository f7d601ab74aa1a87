use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;

use super::commands::{store, StoreFileCommand, StoreFileError};

pub fn upload_routes() -> Router<FeatureState> {
    Router::new().route("/upload", post(upload_file))
}

#[tracing::instrument(skip(state, multipart))]
async fn upload_file(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, StoreFileError> {
    let mut command: Option<StoreFileCommand> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StoreFileError::Multipart(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        let content = field
            .bytes()
            .await
            .map_err(|e| StoreFileError::Multipart(e.to_string()))?
            .to_vec();

        command = Some(StoreFileCommand {
            original_name,
            content_type,
            content,
        });
    }

    let command = command.ok_or(StoreFileError::FileFieldMissing)?;

    let response = store::handle(&state.storage, state.channel.as_ref(), &state.topic, command).await?;

    tracing::info!(
        stored_name = %response.stored_name,
        original_name = %response.original_name,
        size = response.size_bytes,
        "Upload completed"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

impl IntoResponse for StoreFileError {
    fn into_response(self) -> Response {
        match self {
            StoreFileError::FileFieldMissing
            | StoreFileError::FileNameLength
            | StoreFileError::ContentRequired
            | StoreFileError::Multipart(_) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            StoreFileError::Storage(_) => {
                tracing::error!("Storage error during upload: {}", self);
                let error = ErrorResponse::new("STORAGE_ERROR", "A storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            StoreFileError::Channel(_) => {
                tracing::error!("Failed to publish file-ready event: {}", self);
                let error =
                    ErrorResponse::new("CHANNEL_ERROR", "Failed to publish the notification");
                (StatusCode::BAD_GATEWAY, Json(error)).into_response()
            },
        }
    }
}
