//! Shared participant-role classification
//!
//! Exactly one implementation of the coach/student rule, consumed by the
//! timeline, transcript, and chat analyzers so the classification
//! invariant holds identically everywhere:
//! - email on an organizational domain → Coach
//! - no email, first name token in the coach dictionary → Coach
//! - email on any other domain → Student
//! - otherwise → Unknown
//!
//! Numeric-only display names and the organization's generic account name
//! are excluded from the participant set entirely.

use crate::config::IngestConfig;
use crate::normalize::is_numeric_token;
use crate::types::ParticipantRole;

/// Classify a participant from its display name and optional email.
pub fn classify_role(
    display_name: &str,
    email: Option<&str>,
    config: &IngestConfig,
) -> ParticipantRole {
    if let Some(email) = email {
        if config.identity.is_org_email(email) {
            return ParticipantRole::Coach;
        }
        if email.contains('@') {
            return ParticipantRole::Student;
        }
    }

    let first_token = display_name.split_whitespace().next().unwrap_or("");
    if config.is_coach_name(first_token) {
        ParticipantRole::Coach
    } else {
        ParticipantRole::Unknown
    }
}

/// Whether a display name is excluded from the participant set
/// (numeric-only account ids, the generic organizational label).
pub fn is_excluded_participant(display_name: &str, config: &IngestConfig) -> bool {
    let trimmed = display_name.trim();
    if trimmed.is_empty() || is_numeric_token(trimmed) {
        return true;
    }
    trimmed.eq_ignore_ascii_case(&config.identity.org_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_domain_email_is_coach() {
        let config = IngestConfig::default();
        assert_eq!(
            classify_role("Whoever", Some("x@ivymentors.co"), &config),
            ParticipantRole::Coach
        );
    }

    #[test]
    fn external_email_is_student() {
        let config = IngestConfig::default();
        assert_eq!(
            classify_role("John Smith", Some("john@gmail.com"), &config),
            ParticipantRole::Student
        );
    }

    #[test]
    fn dictionary_first_name_without_email_is_coach() {
        let config = IngestConfig::default();
        assert_eq!(
            classify_role("Jenny Duan", None, &config),
            ParticipantRole::Coach
        );
    }

    #[test]
    fn unknown_name_without_email_is_unknown() {
        let config = IngestConfig::default();
        assert_eq!(
            classify_role("John Smith", None, &config),
            ParticipantRole::Unknown
        );
    }

    #[test]
    fn malformed_email_falls_back_to_name_rule() {
        let config = IngestConfig::default();
        assert_eq!(
            classify_role("Jenny", Some("not-an-email"), &config),
            ParticipantRole::Coach
        );
    }

    #[test]
    fn exclusions() {
        let config = IngestConfig::default();
        assert!(is_excluded_participant("16778240", &config));
        assert!(is_excluded_participant("ivylevel", &config));
        assert!(is_excluded_participant("Ivylevel", &config));
        assert!(is_excluded_participant("  ", &config));
        assert!(!is_excluded_participant("Jenny Duan", &config));
    }
}
