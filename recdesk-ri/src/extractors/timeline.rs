//! Interaction-timeline analysis
//!
//! The timeline document lists who was present at each moment of the
//! session. Event order carries no extraction meaning: all events are
//! flattened into a deduplicated participant set, each participant is
//! classified by the shared role rule, and the first coach and student in
//! flattening order become the candidates. This is the most reliable
//! evidence source in the cascade.

use crate::config::IngestConfig;
use crate::normalize::{capitalize_phrase, is_organization_name};
use crate::roles::{classify_role, is_excluded_participant};
use crate::types::{
    ExtractedField, FieldSource, ParticipantRecord, ParticipantRole, TimelineDocument,
};
use recdesk_common::{Error, Result};
use std::collections::HashSet;
use tracing::debug;

/// What timeline analysis yields for one recording
#[derive(Debug, Clone, Default)]
pub struct TimelineFindings {
    pub coach: ExtractedField<String>,
    pub student: ExtractedField<String>,
    /// Deduplicated, non-excluded participants in flattening order
    pub participants: Vec<ParticipantRecord>,
    /// True when every participant is the shared contact account and no
    /// other organizational-domain email was collected — the
    /// generic-organization category condition
    pub only_shared_contact: bool,
}

/// Parse a raw timeline JSON document. Accepts either the enveloped
/// `{"timeline": [...]}` shape or a bare event array.
pub fn parse_timeline(raw: &str) -> Result<TimelineDocument> {
    if let Ok(doc) = serde_json::from_str::<TimelineDocument>(raw) {
        return Ok(doc);
    }
    serde_json::from_str(raw)
        .map(|events| TimelineDocument { timeline: events })
        .map_err(|e| Error::Parse(format!("timeline document: {}", e)))
}

/// Flatten, deduplicate, and classify the timeline's participants.
pub fn analyze(document: &TimelineDocument, config: &IngestConfig) -> TimelineFindings {
    let thresholds = &config.thresholds;
    let mut findings = TimelineFindings::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut org_emails: Vec<String> = Vec::new();

    for event in &document.timeline {
        for user in &event.users {
            let display_name = match user.username.as_deref() {
                Some(name) if !name.trim().is_empty() => name.trim().to_string(),
                _ => continue,
            };

            // Dedup key: account id, then email, then username — a user
            // appearing in fifty events counts once
            let key = user
                .user_id
                .clone()
                .or_else(|| user.email.as_ref().map(|e| e.to_lowercase()))
                .unwrap_or_else(|| display_name.to_lowercase());
            if !seen.insert(key) {
                continue;
            }

            if let Some(email) = user.email.as_deref() {
                if config.identity.is_org_email(email) {
                    org_emails.push(email.to_lowercase());
                }
            }

            if is_excluded_participant(&display_name, config) {
                debug!(name = %display_name, "Timeline participant excluded");
                continue;
            }

            let role = classify_role(&display_name, user.email.as_deref(), config);
            findings.participants.push(ParticipantRecord {
                display_name,
                email: user.email.clone(),
                role,
            });
        }
    }

    for participant in &findings.participants {
        let shared_contact = participant
            .email
            .as_deref()
            .map(|e| config.identity.is_shared_contact(e))
            .unwrap_or(false);

        match participant.role {
            ParticipantRole::Coach => {
                // The shared contact account is never a coach candidate;
                // it stays in the set so the category condition sees it
                if !findings.coach.is_set()
                    && !shared_contact
                    && !is_organization_name(&participant.display_name, &config.identity)
                {
                    findings.coach = ExtractedField::new(
                        capitalize_phrase(&participant.display_name),
                        thresholds.timeline_participant,
                        FieldSource::TimelineEnhanced,
                    );
                }
            }
            ParticipantRole::Student => {
                if !findings.student.is_set()
                    && !is_organization_name(&participant.display_name, &config.identity)
                {
                    findings.student = ExtractedField::new(
                        capitalize_phrase(&participant.display_name),
                        thresholds.timeline_participant,
                        FieldSource::TimelineEnhanced,
                    );
                }
            }
            ParticipantRole::Unknown => {}
        }
    }

    let non_contact_org_email = org_emails
        .iter()
        .any(|e| !config.identity.is_shared_contact(e));
    findings.only_shared_contact = !findings.participants.is_empty()
        && !non_contact_org_email
        && findings.participants.iter().all(|p| {
            p.email
                .as_deref()
                .map(|e| config.identity.is_shared_contact(e))
                .unwrap_or(false)
        });

    debug!(
        participants = findings.participants.len(),
        coach = findings.coach.value().map(String::as_str).unwrap_or("-"),
        student = findings.student.value().map(String::as_str).unwrap_or("-"),
        only_shared_contact = findings.only_shared_contact,
        "Timeline analysis complete"
    );

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IngestConfig {
        IngestConfig::default()
    }

    fn doc(json: &str) -> TimelineDocument {
        parse_timeline(json).unwrap()
    }

    #[test]
    fn parses_enveloped_and_bare_shapes() {
        let enveloped = doc(r#"{"timeline": [{"users": [{"username": "Jenny"}]}]}"#);
        assert_eq!(enveloped.timeline.len(), 1);

        let bare = doc(r#"[{"users": [{"username": "Jenny"}]}]"#);
        assert_eq!(bare.timeline.len(), 1);
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        assert!(parse_timeline("{not json").is_err());
    }

    #[test]
    fn repeat_appearances_count_once() {
        let document = doc(
            r#"{"timeline": [
                {"users": [{"username": "Jenny Duan", "email_address": "jenny@ivymentors.co", "zoom_userid": 42}]},
                {"users": [{"username": "Jenny Duan", "email_address": "jenny@ivymentors.co", "zoom_userid": 42}]},
                {"users": [{"username": "John Smith", "email_address": "john@gmail.com"}]}
            ]}"#,
        );
        let findings = analyze(&document, &config());
        assert_eq!(findings.participants.len(), 2);
        assert_eq!(findings.coach.value().unwrap(), "Jenny Duan");
        assert_eq!(findings.coach.confidence(), 0.9);
        assert_eq!(findings.coach.source(), FieldSource::TimelineEnhanced);
        assert_eq!(findings.student.value().unwrap(), "John Smith");
    }

    #[test]
    fn numeric_and_org_label_usernames_are_excluded() {
        let document = doc(
            r#"{"timeline": [
                {"users": [
                    {"username": "16778240"},
                    {"username": "ivylevel"},
                    {"username": "John Smith", "email_address": "john@gmail.com"}
                ]}
            ]}"#,
        );
        let findings = analyze(&document, &config());
        assert_eq!(findings.participants.len(), 1);
        assert_eq!(findings.participants[0].display_name, "John Smith");
    }

    #[test]
    fn dictionary_name_without_email_is_coach() {
        let document = doc(
            r#"{"timeline": [{"users": [
                {"username": "Jenny"},
                {"username": "John Smith", "email_address": "john@gmail.com"}
            ]}]}"#,
        );
        let findings = analyze(&document, &config());
        assert_eq!(findings.coach.value().unwrap(), "Jenny");
        assert_eq!(findings.student.value().unwrap(), "John Smith");
    }

    #[test]
    fn shared_contact_only_sets_category_signal() {
        let document = doc(
            r#"{"timeline": [{"users": [
                {"username": "contact", "email_address": "contact@ivymentors.co"}
            ]}]}"#,
        );
        let findings = analyze(&document, &config());
        assert!(findings.only_shared_contact);
        // The shared contact is never a coach candidate
        assert!(!findings.coach.is_set());
    }

    #[test]
    fn other_org_email_defeats_shared_contact_condition() {
        let document = doc(
            r#"{"timeline": [{"users": [
                {"username": "contact", "email_address": "contact@ivymentors.co"},
                {"username": "Jenny Duan", "email_address": "jenny@ivymentors.co"}
            ]}]}"#,
        );
        let findings = analyze(&document, &config());
        assert!(!findings.only_shared_contact);
        assert_eq!(findings.coach.value().unwrap(), "Jenny Duan");
    }

    #[test]
    fn empty_timeline_yields_nothing() {
        let findings = analyze(&TimelineDocument::default(), &config());
        assert!(findings.participants.is_empty());
        assert!(!findings.only_shared_contact);
        assert!(!findings.coach.is_set());
    }
}
