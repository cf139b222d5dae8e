//! Confidence thresholds for the fusion cascade
//!
//! Every confidence constant the merge cascade consults lives on this one
//! table, so tests can assert exact values and a tuning pass touches one
//! place.

use serde::{Deserialize, Serialize};

/// Named confidence scores and gates used across extraction and fusion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    /// Below this on coach or student, the record is flagged for manual
    /// review (Normal category only)
    pub manual_review: f32,
    /// Transcript analysis runs only while coach or student is below this
    pub transcript_consult: f32,
    /// Chat analysis runs only while coach or student is below this
    pub chat_consult: f32,

    /// Folder rule 1: dictionary coach at token 0
    pub folder_coach: f32,
    /// Folder rule 1: hyphenated-surname student pairing
    pub folder_student_hyphen: f32,
    /// Folder rule 1: exactly two remaining tokens
    pub folder_student_pair: f32,
    /// Folder rule 1: trailing two of three-plus remaining tokens
    pub folder_student_tail: f32,
    /// Folder rule 2: dictionary match at any position
    pub folder_scan: f32,

    /// Timeline participant classification
    pub timeline_participant: f32,
    /// Transcript dictionary hit in a speaker's possible names
    pub transcript_coach: f32,
    /// Transcript help-seeking speaker's introduced name
    pub transcript_student: f32,
    /// Chat sender substring match (lowest-trust source)
    pub chat_coach: f32,
    /// Organizational host-email local-part hint
    pub host_email_coach: f32,
    /// Student-directory fallback hit
    pub directory_match: f32,

    /// Miscellaneous-host category override
    pub misc_host: f32,
    /// Student salvaged from the misc-host sub-pattern
    pub misc_student: f32,
    /// Generic-organization-only override
    pub generic_org: f32,

    /// Week number matched directly in the source text
    pub week_pattern: f32,
    /// Week number computed from elapsed time since program start
    pub week_calculated: f32,
    /// Week number defaulted at final record assembly
    pub week_fallback: f32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            manual_review: 0.5,
            transcript_consult: 0.8,
            chat_consult: 0.7,
            folder_coach: 0.85,
            folder_student_hyphen: 0.85,
            folder_student_pair: 0.80,
            folder_student_tail: 0.75,
            folder_scan: 0.80,
            timeline_participant: 0.9,
            transcript_coach: 0.85,
            transcript_student: 0.75,
            chat_coach: 0.6,
            host_email_coach: 0.85,
            directory_match: 0.9,
            misc_host: 1.0,
            misc_student: 0.8,
            generic_org: 0.9,
            week_pattern: 0.8,
            week_calculated: 0.7,
            week_fallback: 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_preserve_source_reliability_ordering() {
        let t = ConfidenceThresholds::default();
        // structured participant data > free-text pattern > transcript >
        // chat; the directory fallback only fills gaps
        assert!(t.timeline_participant > t.folder_coach);
        assert!(t.folder_coach == t.transcript_coach);
        assert!(t.transcript_coach > t.chat_coach);
        assert!(t.week_pattern > t.week_calculated);
        assert!(t.week_calculated > t.week_fallback);
        assert_eq!(t.misc_host, 1.0);
    }
}
