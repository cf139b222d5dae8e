//! recdesk-ri - Recording Ingest service
//!
//! Processes one recording notification from the command line: loads the
//! ingest configuration and a student-directory snapshot, gathers local
//! evidence files, runs metadata fusion, and prints the finalized record
//! plus canonical filenames as JSON.

use anyhow::Result;
use clap::Parser;
use recdesk_common::events::EventBus;
use recdesk_ri::services::{
    EventBusReviewQueue, InMemoryDirectory, IngestPipeline, LocalFileFetcher, RecordingRequest,
};
use recdesk_ri::types::MediaKind;
use recdesk_ri::IngestConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "recdesk-ri", about = "Recording ingest: metadata fusion and naming")]
struct Args {
    /// Folder or topic string from the recording notification
    #[arg(long)]
    topic: String,

    /// Host email address, when the notification carried one
    #[arg(long)]
    host_email: Option<String>,

    /// Recording date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<chrono::NaiveDate>,

    /// Path to the interaction-timeline JSON document
    #[arg(long)]
    timeline: Option<String>,

    /// Path to the WEBVTT transcript
    #[arg(long)]
    transcript: Option<String>,

    /// Path to the chat log
    #[arg(long)]
    chat: Option<String>,

    /// Path to a student-directory JSON snapshot
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Config file path (falls back to RECDESK_RI_CONFIG, then the
    /// platform config directory, then compiled defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Media kinds to name, comma separated
    #[arg(long, value_delimiter = ',', default_value = "video,audio,transcript,chat,timeline")]
    kinds: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting recdesk-ri (Recording Ingest)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = Arc::new(IngestConfig::resolve_and_load(args.config.as_deref())?);

    let directory = match &args.directory {
        Some(path) => InMemoryDirectory::load_json(path)?,
        None => InMemoryDirectory::empty(),
    };

    let mut media_kinds = Vec::new();
    for kind in &args.kinds {
        match MediaKind::parse(kind) {
            Ok(parsed) => media_kinds.push(parsed),
            // An unrecognized kind skips that file only
            Err(e) => tracing::warn!(error = %e, "Skipping media kind"),
        }
    }

    let event_bus = EventBus::new(100);
    let pipeline = IngestPipeline::new(
        config,
        Arc::new(LocalFileFetcher::new(std::env::current_dir()?)),
        directory,
        Arc::new(EventBusReviewQueue::new(event_bus.clone())),
        event_bus,
    );

    let request = RecordingRequest {
        recording_id: Uuid::new_v4(),
        topic: args.topic,
        host_email: args.host_email,
        recording_date: args.date,
        timeline_locator: args.timeline,
        transcript_locator: args.transcript,
        chat_locator: args.chat,
        media_kinds,
    };

    let processed = pipeline.process(request).await?;
    println!("{}", serde_json::to_string_pretty(&processed)?);

    Ok(())
}
