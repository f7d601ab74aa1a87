//! Integration tests for the notification-driven coordinator
//!
//! These run against the in-memory channel backend, which shares the Redis
//! backend's delivery contract: best-effort fan-out to current subscribers,
//! no persistence, no replay.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use intake_common::config::IntakeConfig;
use intake_common::event::FileReadyEvent;
use intake_common::notify::{MemoryChannel, NotificationChannel};
use intake_processor::coordinator::IntakeCoordinator;

fn test_config(root: &Path) -> IntakeConfig {
    let mut config = IntakeConfig::default();
    config.storage.upload_dir = root.join("uploads");
    config.storage.processed_dir = root.join("processed");
    config
}

fn write_upload(config: &IntakeConfig, stored_name: &str, content: &str) -> FileReadyEvent {
    std::fs::create_dir_all(&config.storage.upload_dir).unwrap();
    let storage_path = config.storage.upload_dir.join(stored_name);
    std::fs::write(&storage_path, content).unwrap();

    FileReadyEvent {
        stored_name: stored_name.to_string(),
        original_name: stored_name.to_string(),
        storage_path,
        content_type: "text/csv".to_string(),
        size_bytes: content.len() as u64,
        stored_at: Utc::now(),
    }
}

fn destination_for(config: &IntakeConfig, event: &FileReadyEvent) -> PathBuf {
    config.storage.processed_dir.join(event.destination_name())
}

async fn wait_for_file(path: &Path) -> bool {
    for _ in 0..250 {
        if path.exists() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_published_event_is_processed_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let channel = Arc::new(MemoryChannel::new());

    let event = write_upload(&config, "a1-people.csv", "name,age\nAna,30\nBob,25\n");
    let destination = destination_for(&config, &event);

    // Subscribe before publishing; events have no replay.
    let subscription = channel.subscribe(&config.channel.topic).await.unwrap();
    let coordinator = IntakeCoordinator::new(channel.clone(), &config);
    let worker = tokio::spawn(async move { coordinator.run_with(subscription).await });

    channel.publish(&config.channel.topic, &event).await.unwrap();

    assert!(wait_for_file(&destination).await, "processed file never appeared");

    let output = std::fs::read_to_string(&destination).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "NAME,AGE,processedAt,processedRow");
    assert!(lines[1].starts_with("ANA,30,"));
    assert!(lines[2].starts_with("BOB,25,"));

    worker.abort();
}

#[tokio::test]
async fn test_unrecognized_extension_is_skipped_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let channel = Arc::new(MemoryChannel::new());
    let coordinator = IntakeCoordinator::new(channel, &config);

    let event = write_upload(&config, "b2-notes.txt", "not,a,csv\n");
    coordinator.handle_message(&event.to_payload().unwrap()).await;

    // Skipping produces no destination file (and no panic, no error).
    assert!(!destination_for(&config, &event).exists());
}

#[tokio::test]
async fn test_malformed_payload_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let channel = Arc::new(MemoryChannel::new());
    let coordinator = IntakeCoordinator::new(channel, &config);

    coordinator.handle_message("definitely { not json").await;
    coordinator.handle_message("{\"storedName\": 42}").await;

    // Nothing was written anywhere.
    assert!(!config.storage.processed_dir.exists());
}

#[tokio::test]
async fn test_pipeline_failure_does_not_stop_later_messages() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let channel = Arc::new(MemoryChannel::new());
    let coordinator = IntakeCoordinator::new(channel, &config);

    // References a file that was never written: the pipeline run fails,
    // the coordinator logs and moves on.
    let missing = FileReadyEvent {
        stored_name: "c3-gone.csv".to_string(),
        original_name: "gone.csv".to_string(),
        storage_path: config.storage.upload_dir.join("c3-gone.csv"),
        content_type: "text/csv".to_string(),
        size_bytes: 0,
        stored_at: Utc::now(),
    };
    coordinator.handle_message(&missing.to_payload().unwrap()).await;
    assert!(!destination_for(&config, &missing).exists());

    // The next message processes normally.
    let event = write_upload(&config, "d4-ok.csv", "name\nAna\n");
    coordinator.handle_message(&event.to_payload().unwrap()).await;
    assert!(destination_for(&config, &event).exists());
}

#[tokio::test]
async fn test_notification_published_without_subscribers_is_lost() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let channel = Arc::new(MemoryChannel::new());

    // Published before anyone subscribes: must not error, must not be
    // replayed to the subscriber that connects later.
    let lost = write_upload(&config, "e5-early.csv", "name\nAna\n");
    channel.publish(&config.channel.topic, &lost).await.unwrap();

    let subscription = channel.subscribe(&config.channel.topic).await.unwrap();
    let coordinator = IntakeCoordinator::new(channel.clone(), &config);
    let worker = tokio::spawn(async move { coordinator.run_with(subscription).await });

    let seen = write_upload(&config, "f6-late.csv", "name\nBob\n");
    channel.publish(&config.channel.topic, &seen).await.unwrap();

    assert!(wait_for_file(&destination_for(&config, &seen)).await);
    assert!(!destination_for(&config, &lost).exists());

    worker.abort();
}
