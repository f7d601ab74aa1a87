//! Integration tests for the upload API
//!
//! These tests drive the real router through `tower::ServiceExt::oneshot`
//! with an in-memory notification channel and temporary storage, verifying:
//! - a multipart upload is stored, answered, and announced
//! - requests without a file field are rejected without side effects
//! - the health endpoint responds

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use intake_common::config::IntakeConfig;
use intake_common::event::FileReadyEvent;
use intake_common::notify::{MemoryChannel, NotificationChannel, Subscription};
use intake_server::api;
use intake_server::features::FeatureState;
use intake_server::storage::Storage;
use tower::ServiceExt;

const TOPIC: &str = "file-uploaded";
const BOUNDARY: &str = "intake-test-boundary";

async fn test_app(upload_dir: &std::path::Path) -> (Router, Subscription) {
    let channel = Arc::new(MemoryChannel::new());
    let subscription = channel.subscribe(TOPIC).await.unwrap();

    let state = FeatureState {
        storage: Storage::new(upload_dir),
        channel,
        topic: TOPIC.to_string(),
    };

    let config = IntakeConfig::default();
    (api::create_router(state, &config), subscription)
}

fn multipart_upload(filename: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\
         \r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_stores_file_and_publishes_event() {
    let dir = tempfile::tempdir().unwrap();
    let (app, mut subscription) = test_app(dir.path()).await;

    let response = app
        .oneshot(multipart_upload("people.csv", "name,age\nAna,30\n"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);

    let data = &body["data"];
    let stored_name = data["storedName"].as_str().unwrap();
    assert!(stored_name.ends_with("-people.csv"));
    assert_eq!(data["originalName"], "people.csv");
    assert_eq!(data["contentType"], "text/csv");
    assert_eq!(data["sizeBytes"], 16);
    assert_eq!(data["checksum"].as_str().unwrap().len(), 64);

    // The stored file is on disk with the uploaded bytes.
    let stored_path = dir.path().join(stored_name);
    let on_disk = std::fs::read_to_string(&stored_path).unwrap();
    assert_eq!(on_disk, "name,age\nAna,30\n");

    // Exactly one event was published, referencing the stored file.
    let payload = subscription.recv().await.unwrap();
    let event = FileReadyEvent::from_payload(&payload).unwrap();
    assert_eq!(event.stored_name, stored_name);
    assert_eq!(event.storage_path, stored_path);
    assert!(event.storage_path.exists());
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _subscription) = test_app(dir.path()).await;

    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"comment\"\r\n\
         \r\n\
         not a file\r\n\
         --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Nothing was stored.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_empty_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _subscription) = test_app(dir.path()).await;

    let response = app
        .oneshot(multipart_upload("empty.csv", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _subscription) = test_app(dir.path()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}
