//! recdesk-ri library interface
//!
//! Recording ingest: infers coach, student, week number, and session
//! category from noisy evidence sources (folder/topic text, interaction
//! timeline, subtitle transcript, chat log), fuses them into one
//! confidence-scored record, and derives canonical output filenames.

pub mod config;
pub mod extractors;
pub mod fusion;
pub mod normalize;
pub mod roles;
pub mod services;
pub mod types;

pub use crate::config::IngestConfig;
pub use crate::fusion::{FusionOutcome, MetadataFusionEngine};
pub use crate::services::{IngestPipeline, ProcessedRecording, RecordingRequest};
pub use crate::types::{
    ExtractedField, FieldSource, FinalizedMetadataRecord, MediaKind, RecordingEvidence,
    SessionCategory,
};
