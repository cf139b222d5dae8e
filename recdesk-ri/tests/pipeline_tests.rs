//! Pipeline integration tests
//!
//! Exercises the full ingest path with fixture files on disk: evidence
//! fetching, graceful degradation, fusion, naming, and event emission.

use chrono::NaiveDate;
use recdesk_common::events::{EventBus, IngestEvent};
use recdesk_ri::services::{
    EventBusReviewQueue, InMemoryDirectory, IngestPipeline, LocalFileFetcher, RecordingRequest,
};
use recdesk_ri::types::{MediaKind, SessionCategory, StudentDirectoryEntry};
use recdesk_ri::IngestConfig;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

/// Helper: fixture directory with all three evidence documents
fn create_evidence_dir() -> TempDir {
    let dir = TempDir::new().unwrap();

    fs::write(
        dir.path().join("timeline.json"),
        r#"{"timeline": [
            {"ts": "2026-02-17T17:00:00Z", "users": [
                {"username": "Kelvin Wong", "email_address": "kelvin@ivymentors.co", "zoom_userid": 101}
            ]},
            {"ts": "2026-02-17T17:00:05Z", "users": [
                {"username": "Kelvin Wong", "email_address": "kelvin@ivymentors.co", "zoom_userid": 101},
                {"username": "Priya Patel", "email_address": "priya@gmail.com", "zoom_userid": 102}
            ]}
        ]}"#,
    )
    .unwrap();

    fs::write(
        dir.path().join("transcript.vtt"),
        "WEBVTT\n\n1\n00:00:01.000 --> 00:00:04.000\nKelvin: Hi Priya, I'm Kelvin.\n\n2\n00:00:05.000 --> 00:00:08.000\nPriya: I need help with my activities list.\n",
    )
    .unwrap();

    fs::write(
        dir.path().join("chat.txt"),
        "17:10:02 From Kelvin Wong to Everyone: link incoming\n17:11:40 From Priya Patel to Everyone: got it\n",
    )
    .unwrap();

    dir
}

fn pipeline_for(dir: &TempDir, bus: EventBus) -> IngestPipeline {
    let directory = InMemoryDirectory::new(vec![StudentDirectoryEntry {
        email: "priya@gmail.com".to_string(),
        display_name: "Priya Patel".to_string(),
        coach_name: "Kelvin".to_string(),
        coach_email: Some("kelvin@ivymentors.co".to_string()),
        program: None,
        start_date: NaiveDate::from_ymd_opt(2026, 1, 5),
    }]);

    IngestPipeline::new(
        Arc::new(IngestConfig::default()),
        Arc::new(LocalFileFetcher::new(dir.path())),
        directory,
        Arc::new(EventBusReviewQueue::new(bus.clone())),
        bus,
    )
}

fn request(topic: &str) -> RecordingRequest {
    RecordingRequest {
        recording_id: Uuid::new_v4(),
        topic: topic.to_string(),
        host_email: None,
        recording_date: NaiveDate::from_ymd_opt(2026, 2, 17),
        timeline_locator: Some("timeline.json".to_string()),
        transcript_locator: Some("transcript.vtt".to_string()),
        chat_locator: Some("chat.txt".to_string()),
        media_kinds: vec![MediaKind::Video, MediaKind::Audio],
    }
}

#[tokio::test]
async fn full_pipeline_names_all_media() {
    let dir = create_evidence_dir();
    let bus = EventBus::new(64);
    let pipeline = pipeline_for(&dir, bus);

    let processed = pipeline
        .process(request("kelvin_priya_patel_week_6"))
        .await
        .unwrap();

    assert_eq!(processed.record.category, SessionCategory::Normal);
    assert_eq!(processed.record.coach.value().unwrap(), "Kelvin Wong");
    assert_eq!(processed.record.student.value().unwrap(), "Priya Patel");
    assert_eq!(processed.record.week_number.value().unwrap(), "6");
    assert!(!processed.needs_review);

    assert_eq!(processed.files.len(), 2);
    assert_eq!(
        processed.files[0].filename,
        "Kelvin_Wong_Priya_Patel_Wk6_2026-02-17_Video.mp4"
    );
    assert_eq!(
        processed.files[1].filename,
        "Kelvin_Wong_Priya_Patel_Wk6_2026-02-17_Audio.m4a"
    );
}

#[tokio::test]
async fn missing_evidence_degrades_and_emits_events() {
    let dir = TempDir::new().unwrap();
    let bus = EventBus::new(64);
    let mut rx = bus.subscribe();
    let pipeline = pipeline_for(&dir, bus);

    // No evidence files exist; the directory still resolves the student
    let processed = pipeline
        .process(request("priya patel planning call"))
        .await
        .unwrap();

    assert_eq!(processed.record.student.value().unwrap(), "Priya Patel");
    assert_eq!(processed.record.coach.value().unwrap(), "Kelvin");
    // 43 elapsed days → week 7 from the directory start date
    assert_eq!(processed.record.week_number.value().unwrap(), "7");

    let mut unavailable = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, IngestEvent::EvidenceUnavailable { .. }) {
            unavailable += 1;
        }
    }
    assert_eq!(unavailable, 3);
}

#[tokio::test]
async fn malformed_timeline_degrades_to_absent_source() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("timeline.json"), "{definitely not json").unwrap();

    let bus = EventBus::new(64);
    let pipeline = pipeline_for(&dir, bus);

    let mut req = request("kelvin_priya_patel_week_2");
    req.transcript_locator = None;
    req.chat_locator = None;

    let processed = pipeline.process(req).await.unwrap();
    // Fusion proceeded on the folder pattern alone
    assert_eq!(processed.record.coach.value().unwrap(), "Kelvin");
    assert_eq!(processed.record.student.value().unwrap(), "Priya Patel");
}

#[tokio::test]
async fn low_confidence_recording_reaches_review_queue() {
    let dir = TempDir::new().unwrap();
    let bus = EventBus::new(64);
    let mut rx = bus.subscribe();

    let pipeline = IngestPipeline::new(
        Arc::new(IngestConfig::default()),
        Arc::new(LocalFileFetcher::new(dir.path())),
        InMemoryDirectory::empty(),
        Arc::new(EventBusReviewQueue::new(bus.clone())),
        bus,
    );

    let mut req = request("Weekly Meeting 123");
    req.timeline_locator = None;
    req.transcript_locator = None;
    req.chat_locator = None;

    let processed = pipeline.process(req).await.unwrap();
    assert!(processed.needs_review);

    let mut flagged = false;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, IngestEvent::ReviewFlagged { .. }) {
            flagged = true;
        }
    }
    assert!(flagged);

    // Files are still named, with placeholder components
    assert!(processed.files[0].filename.starts_with("Unknown_Unknown_"));
}

#[tokio::test]
async fn misc_host_recording_end_to_end() {
    let dir = TempDir::new().unwrap();
    let bus = EventBus::new(64);
    let pipeline = pipeline_for(&dir, bus);

    let mut req = request("Siraj & Aanya onboarding 8372119");
    req.timeline_locator = None;
    req.transcript_locator = None;
    req.chat_locator = None;

    let processed = pipeline.process(req).await.unwrap();
    assert_eq!(processed.record.category, SessionCategory::MiscHost);
    assert_eq!(
        processed.files[0].filename,
        "MISC_Siraj_Onboarding_Aanya_2026-02-17_Video.mp4"
    );
}
