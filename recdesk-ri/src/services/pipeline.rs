//! Per-recording ingest pipeline
//!
//! Orchestrates one recording end to end: fetch whatever evidence
//! documents the collaborator produced, fuse them into a finalized
//! record, derive canonical filenames for the declared media kinds, and
//! emit lifecycle events. A source that is missing or fails to parse
//! degrades to absent evidence; it never aborts the recording.

use crate::config::IngestConfig;
use crate::extractors::{chat, timeline, transcript};
use crate::fusion::engine::MetadataFusionEngine;
use crate::services::document_fetcher::DocumentFetcher;
use crate::services::file_namer::FileNamingEngine;
use crate::services::review_queue::ReviewQueue;
use crate::services::student_directory::StudentDirectory;
use crate::types::{FinalizedMetadataRecord, MediaKind, RecordingEvidence};
use chrono::{NaiveDate, Utc};
use recdesk_common::events::{EventBus, IngestEvent};
use recdesk_common::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// One recording notification, as handed over by the webhook collaborator
#[derive(Debug, Clone)]
pub struct RecordingRequest {
    pub recording_id: Uuid,
    /// Folder or topic string
    pub topic: String,
    pub host_email: Option<String>,
    pub recording_date: Option<NaiveDate>,
    /// Opaque locators for the evidence documents, when present
    pub timeline_locator: Option<String>,
    pub transcript_locator: Option<String>,
    pub chat_locator: Option<String>,
    /// Media kinds declared for this recording
    pub media_kinds: Vec<MediaKind>,
}

/// A named media file ready for placement
#[derive(Debug, Clone, Serialize)]
pub struct NamedFile {
    pub kind: MediaKind,
    pub filename: String,
}

/// Everything the pipeline produces for one recording
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedRecording {
    pub recording_id: Uuid,
    pub record: FinalizedMetadataRecord,
    pub files: Vec<NamedFile>,
    pub needs_review: bool,
}

/// The ingest pipeline
pub struct IngestPipeline {
    fusion: MetadataFusionEngine,
    namer: FileNamingEngine,
    fetcher: Arc<dyn DocumentFetcher>,
    directory: Arc<dyn StudentDirectory>,
    review_queue: Arc<dyn ReviewQueue>,
    event_bus: EventBus,
}

impl IngestPipeline {
    pub fn new(
        config: Arc<IngestConfig>,
        fetcher: Arc<dyn DocumentFetcher>,
        directory: Arc<dyn StudentDirectory>,
        review_queue: Arc<dyn ReviewQueue>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            fusion: MetadataFusionEngine::new(config.clone()),
            namer: FileNamingEngine::new(config.identity.clone()),
            fetcher,
            directory,
            review_queue,
            event_bus,
        }
    }

    /// Process one recording end to end.
    pub async fn process(&self, request: RecordingRequest) -> Result<ProcessedRecording> {
        let recording_id = request.recording_id;
        info!(recording_id = %recording_id, topic = %request.topic, "Processing recording");
        self.event_bus.emit_lossy(IngestEvent::RecordingReceived {
            recording_id,
            topic: request.topic.clone(),
            timestamp: Utc::now(),
        });

        let evidence = self.gather_evidence(&request).await;
        let directory = self.directory.snapshot().await;
        let outcome = self.fusion.fuse(&evidence, &directory);

        if outcome.needs_review {
            self.review_queue.flag(recording_id, &outcome.record).await;
        }

        let date_stamp = request
            .recording_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let mut files = Vec::with_capacity(request.media_kinds.len());
        for kind in &request.media_kinds {
            match self.namer.name(*kind, &outcome.record, date_stamp) {
                Ok(filename) => files.push(NamedFile {
                    kind: *kind,
                    filename,
                }),
                Err(e) => {
                    // One unnameable file is skipped; the rest proceed
                    warn!(recording_id = %recording_id, error = %e, "Skipping media file");
                }
            }
        }

        self.event_bus.emit_lossy(IngestEvent::FilesNamed {
            recording_id,
            filenames: files.iter().map(|f| f.filename.clone()).collect(),
        });

        Ok(ProcessedRecording {
            recording_id,
            record: outcome.record,
            files,
            needs_review: outcome.needs_review,
        })
    }

    /// Fetch and parse every available evidence document, degrading each
    /// failure to an absent source.
    async fn gather_evidence(&self, request: &RecordingRequest) -> RecordingEvidence {
        let mut evidence = RecordingEvidence::from_topic(request.recording_id, &request.topic);
        evidence.host_email = request.host_email.clone();
        evidence.recording_date = request.recording_date;

        if let Some(raw) = self
            .fetch_source(request.recording_id, "timeline", request.timeline_locator.as_deref())
            .await
        {
            match timeline::parse_timeline(&raw) {
                Ok(document) => evidence.timeline = Some(document),
                Err(e) => self.report_unavailable(request.recording_id, "timeline", &e.to_string()),
            }
        }

        if let Some(raw) = self
            .fetch_source(
                request.recording_id,
                "transcript",
                request.transcript_locator.as_deref(),
            )
            .await
        {
            evidence.transcript = Some(transcript::parse_vtt(&raw));
        }

        if let Some(raw) = self
            .fetch_source(request.recording_id, "chat", request.chat_locator.as_deref())
            .await
        {
            evidence.chat = Some(chat::parse_chat(&raw));
        }

        evidence
    }

    async fn fetch_source(
        &self,
        recording_id: Uuid,
        source: &str,
        locator: Option<&str>,
    ) -> Option<String> {
        let locator = locator?;
        match self.fetcher.fetch_text(locator).await {
            Ok(Some(content)) => Some(content),
            Ok(None) => {
                self.report_unavailable(recording_id, source, "not found");
                None
            }
            Err(e) => {
                self.report_unavailable(recording_id, source, &e.to_string());
                None
            }
        }
    }

    fn report_unavailable(&self, recording_id: Uuid, source: &str, reason: &str) {
        warn!(recording_id = %recording_id, source, reason, "Evidence source unavailable");
        self.event_bus.emit_lossy(IngestEvent::EvidenceUnavailable {
            recording_id,
            source: source.to_string(),
            reason: reason.to_string(),
        });
    }
}
