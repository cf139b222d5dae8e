//! Chat-log analysis
//!
//! Chat lines follow `HH:MM:SS From <sender> to <recipient>: <message>`.
//! Non-matching lines are ignored, not errors. The chat log is the
//! lowest-confidence source in the system and is consulted last.

use crate::config::IngestConfig;
use crate::normalize::capitalize;
use crate::types::{ChatDocument, ChatMessage, ExtractedField, FieldSource};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

static CHAT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2})\s+From\s+(.+?)\s+to\s+(.+?):\s*(.*)$")
        .expect("invalid chat line pattern")
});

/// What chat analysis yields for one recording
#[derive(Debug, Clone, Default)]
pub struct ChatFindings {
    pub coach: ExtractedField<String>,
    /// Message counts keyed by sender display name
    pub sender_counts: BTreeMap<String, usize>,
}

/// Parse a raw chat log. Lines that do not match the expected shape are
/// skipped silently.
pub fn parse_chat(raw: &str) -> ChatDocument {
    let mut messages = Vec::new();
    for line in raw.lines() {
        if let Some(captures) = CHAT_LINE.captures(line.trim_end()) {
            messages.push(ChatMessage {
                timestamp: captures[1].to_string(),
                sender: captures[2].trim().to_string(),
                recipient: captures[3].trim().to_string(),
                text: captures[4].to_string(),
            });
        }
    }
    ChatDocument { messages }
}

/// Aggregate per-sender counts and scan senders for dictionary coach
/// names (substring match, the weakest hint in the cascade).
pub fn analyze(document: &ChatDocument, config: &IngestConfig) -> ChatFindings {
    let thresholds = &config.thresholds;
    let mut findings = ChatFindings::default();

    for message in &document.messages {
        *findings.sender_counts.entry(message.sender.clone()).or_default() += 1;
    }

    'scan: for sender in findings.sender_counts.keys() {
        let sender_lower = sender.to_lowercase();
        for coach in &config.coaches {
            if sender_lower.contains(coach.as_str()) {
                debug!(sender = %sender, coach = %coach, "Chat coach candidate");
                findings.coach = ExtractedField::new(
                    capitalize(coach),
                    thresholds.chat_coach,
                    FieldSource::Chat,
                );
                break 'scan;
            }
        }
    }

    findings
}
