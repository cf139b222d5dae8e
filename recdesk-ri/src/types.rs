//! Core types for the recording-ingest metadata engine
//!
//! Every extracted field carries a confidence score and a provenance tag so
//! the fusion cascade can merge evidence sources by reliability and the
//! tracking ledger can record where each value came from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Provenance
// ============================================================================

/// Provenance tag recording which analyzer or stage produced a field value.
///
/// Serialized as the exact snake_case strings the tracking ledger stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Underscore-tokenized folder/topic pattern match
    FolderPattern,
    /// Folder pattern with a hyphenated-surname student pairing
    FolderPatternHyphenated,
    /// Interaction timeline participant classification (basic variant)
    Timeline,
    /// Timeline classification with organization-name filtering
    TimelineEnhanced,
    /// Subtitle transcript self-introduction mining
    Transcript,
    /// Chat-log sender substring match
    Chat,
    /// Original file name carried in webhook metadata (ledger imports)
    MetadataOriginalName,
    /// Coach identity derived from an organizational host email
    MetadataCoachEmail,
    /// Student identity derived from a host-email directory hit
    MetadataStudentEmail,
    /// Student directory (coach/student mapping table) fallback
    Mappings,
    /// Week number computed from elapsed time since program start
    Calculated,
    /// Default applied at final record assembly
    CalculatedFallback,
    /// Miscellaneous-host keyword short-circuit
    SirajPattern,
    /// Generic-organization-only participant override
    IvylevelPattern,
    /// No value was produced
    None,
}

impl FieldSource {
    /// Ledger string for this source tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldSource::FolderPattern => "folder_pattern",
            FieldSource::FolderPatternHyphenated => "folder_pattern_hyphenated",
            FieldSource::Timeline => "timeline",
            FieldSource::TimelineEnhanced => "timeline_enhanced",
            FieldSource::Transcript => "transcript",
            FieldSource::Chat => "chat",
            FieldSource::MetadataOriginalName => "metadata_original_name",
            FieldSource::MetadataCoachEmail => "metadata_coach_email",
            FieldSource::MetadataStudentEmail => "metadata_student_email",
            FieldSource::Mappings => "mappings",
            FieldSource::Calculated => "calculated",
            FieldSource::CalculatedFallback => "calculated_fallback",
            FieldSource::SirajPattern => "siraj_pattern",
            FieldSource::IvylevelPattern => "ivylevel_pattern",
            FieldSource::None => "none",
        }
    }
}

impl std::fmt::Display for FieldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Extracted fields
// ============================================================================

/// A value paired with a confidence score and provenance tag.
///
/// Invariant: confidence 0.0 if and only if the value is absent. The
/// constructors and merge operations maintain this; fields are private so
/// it cannot be broken from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedField<T> {
    value: Option<T>,
    confidence: f32,
    source: FieldSource,
}

impl<T> ExtractedField<T> {
    /// An absent field (confidence 0, source `none`).
    pub fn absent() -> Self {
        Self {
            value: None,
            confidence: 0.0,
            source: FieldSource::None,
        }
    }

    /// A present field. Confidence is clamped to (0.0, 1.0]; a
    /// non-positive confidence would violate the invariant and is raised
    /// to a minimal positive score rather than silently producing an
    /// "absent" field that still has a value.
    pub fn new(value: T, confidence: f32, source: FieldSource) -> Self {
        Self {
            value: Some(value),
            confidence: confidence.clamp(f32::EPSILON, 1.0),
            source,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn source(&self) -> FieldSource {
        self.source
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Merge rule: adopt the candidate only when its confidence strictly
    /// exceeds the current one. Returns true when the value was replaced.
    pub fn consider(&mut self, candidate: ExtractedField<T>) -> bool {
        if candidate.is_set() && candidate.confidence > self.confidence {
            *self = candidate;
            true
        } else {
            false
        }
    }

    /// Forced override, bypassing the strictly-exceeds rule. Used only by
    /// the two documented category overrides in the fusion cascade.
    pub fn force(&mut self, value: T, confidence: f32, source: FieldSource) {
        *self = Self::new(value, confidence, source);
    }

    /// Reset to absent (e.g. after organization-name rejection).
    pub fn clear(&mut self) {
        *self = Self::absent();
    }

    /// Consume into the inner value.
    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

impl<T> Default for ExtractedField<T> {
    fn default() -> Self {
        Self::absent()
    }
}

// ============================================================================
// Participants
// ============================================================================

/// Role assigned to a session participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantRole {
    Coach,
    Student,
    Unknown,
}

/// A participant observed in a timeline, transcript, or chat document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub display_name: String,
    pub email: Option<String>,
    pub role: ParticipantRole,
}

// ============================================================================
// Evidence documents
// ============================================================================

/// One user entry inside a timeline event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "email_address")]
    pub email: Option<String>,
    /// Stable account id; some producers emit it as a JSON number
    #[serde(
        default,
        alias = "zoom_userid",
        alias = "id",
        deserialize_with = "de_opt_string_or_number"
    )]
    pub user_id: Option<String>,
}

fn de_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// One timestamped event in the interaction timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub users: Vec<TimelineUser>,
}

/// Parsed interaction-timeline document.
///
/// Event order is chronological but carries no extraction semantics; the
/// analyzer flattens events into a deduplicated participant set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineDocument {
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}

/// One dialogue cue from a subtitle transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptCue {
    pub speaker: Option<String>,
    pub text: String,
}

/// Parsed caption/subtitle transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptDocument {
    pub cues: Vec<TranscriptCue>,
}

/// One timestamped chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub timestamp: String,
    pub sender: String,
    pub recipient: String,
    pub text: String,
}

/// Parsed chat log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatDocument {
    pub messages: Vec<ChatMessage>,
}

/// Immutable evidence bundle for one recording.
///
/// Constructed fresh per webhook event from the payload plus whatever
/// documents the collaborator could fetch; absent documents simply
/// contribute nothing to fusion.
#[derive(Debug, Clone)]
pub struct RecordingEvidence {
    pub recording_id: Uuid,
    /// Folder or topic string from the notification payload
    pub source_text: String,
    pub recording_date: Option<NaiveDate>,
    pub host_email: Option<String>,
    pub timeline: Option<TimelineDocument>,
    pub transcript: Option<TranscriptDocument>,
    pub chat: Option<ChatDocument>,
}

impl RecordingEvidence {
    /// Evidence bundle with only the topic text (the minimum the webhook
    /// payload always carries).
    pub fn from_topic(recording_id: Uuid, source_text: impl Into<String>) -> Self {
        Self {
            recording_id,
            source_text: source_text.into(),
            recording_date: None,
            host_email: None,
            timeline: None,
            transcript: None,
            chat: None,
        }
    }
}

// ============================================================================
// Finalized record
// ============================================================================

/// Category override that replaces the normal coach/student naming scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCategory {
    Normal,
    /// Ambiguous-host sessions keyed by the reserved keyword
    MiscHost,
    /// Sessions where the only identifiable participant is the shared
    /// organizational contact account
    GenericOrg,
}

/// The single best-guess record produced by the fusion engine.
///
/// Never mutated after fusion completes; handed by value to the naming
/// engine and the ledger writer. For non-Normal categories, week number
/// and game-plan flag are never applied to naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedMetadataRecord {
    pub coach: ExtractedField<String>,
    pub student: ExtractedField<String>,
    pub week_number: ExtractedField<String>,
    pub has_game_plan: bool,
    pub category: SessionCategory,
    /// Context fragment for miscellaneous-host naming, derived from the
    /// source text during fusion
    pub misc_context: Option<String>,
}

// ============================================================================
// Student directory
// ============================================================================

/// One row of the external coach/student mapping table (read-only here)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDirectoryEntry {
    pub email: String,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(alias = "coach")]
    pub coach_name: String,
    #[serde(default)]
    pub coach_email: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

// ============================================================================
// Media kinds
// ============================================================================

/// Media kinds a recording can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    Transcript,
    Chat,
    Timeline,
}

impl MediaKind {
    /// Parse a collaborator-supplied kind string. Unknown kinds are an
    /// error for that one file, never for the recording.
    pub fn parse(kind: &str) -> Result<Self, NamingError> {
        match kind.to_ascii_lowercase().as_str() {
            "video" | "mp4" => Ok(MediaKind::Video),
            "audio" | "m4a" => Ok(MediaKind::Audio),
            "transcript" | "vtt" => Ok(MediaKind::Transcript),
            "chat" | "txt" => Ok(MediaKind::Chat),
            "timeline" | "json" => Ok(MediaKind::Timeline),
            other => Err(NamingError::UnknownMediaKind(other.to_string())),
        }
    }

    /// Fixed suffix + extension appended to every canonical filename.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            MediaKind::Video => "_Video.mp4",
            MediaKind::Audio => "_Audio.m4a",
            MediaKind::Transcript => "_Transcript.vtt",
            MediaKind::Chat => "_Chat.txt",
            MediaKind::Timeline => "_Timeline.json",
        }
    }
}

/// Naming failures are per-file: the collaborator skips the file and the
/// rest of the recording proceeds.
#[derive(Debug, Error)]
pub enum NamingError {
    #[error("Unknown media kind: {0}")]
    UnknownMediaKind(String),
}

// ============================================================================
// Tests
// ============================================================================
