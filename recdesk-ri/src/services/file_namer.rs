//! Canonical output filenames
//!
//! A pure function of the finalized record: same record, same date, same
//! media kind — same filename. Components are sanitized to an
//! alphanumeric/space/hyphen charset, then spaces collapse to
//! underscores, so stripping the kind suffix reproduces the base-name
//! components losslessly.
//!
//! Category recordings never carry a week suffix or the game-plan marker.

use crate::config::IdentityConfig;
use crate::normalize::capitalize;
use crate::types::{FinalizedMetadataRecord, MediaKind, NamingError, SessionCategory};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Characters outside the allowed base-name charset
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9 \-]").expect("invalid charset pattern"));

/// Placeholder for an unresolved name component in the Normal scheme
const UNKNOWN_COMPONENT: &str = "Unknown";

/// Derives canonical filenames from finalized records
pub struct FileNamingEngine {
    identity: IdentityConfig,
}

impl FileNamingEngine {
    pub fn new(identity: IdentityConfig) -> Self {
        Self { identity }
    }

    /// Canonical filename for one media file of a recording.
    ///
    /// Unknown media kinds were rejected at [`MediaKind::parse`]; the
    /// typed kind makes this infallible, so the signature stays `Result`
    /// only for parity with callers that parse kinds late.
    pub fn name(
        &self,
        kind: MediaKind,
        record: &FinalizedMetadataRecord,
        date_stamp: NaiveDate,
    ) -> Result<String, NamingError> {
        let mut parts: Vec<String> = Vec::new();

        match record.category {
            SessionCategory::MiscHost => {
                parts.push("MISC".to_string());
                parts.push(sanitize(&capitalize(&self.identity.misc_keyword)));
                if let Some(context) = &record.misc_context {
                    push_sanitized(&mut parts, context);
                }
                if let Some(student) = record.student.value() {
                    push_sanitized(&mut parts, student);
                }
            }
            SessionCategory::GenericOrg => {
                parts.push(sanitize(&self.identity.org_label));
                if let Some(student) = record.student.value() {
                    push_sanitized(&mut parts, student);
                }
            }
            SessionCategory::Normal => {
                parts.push(sanitize(
                    record
                        .coach
                        .value()
                        .map(String::as_str)
                        .unwrap_or(UNKNOWN_COMPONENT),
                ));
                parts.push(sanitize(
                    record
                        .student
                        .value()
                        .map(String::as_str)
                        .unwrap_or(UNKNOWN_COMPONENT),
                ));
                if record.has_game_plan {
                    parts.push("GamePlan".to_string());
                }
                if let Some(week) = record.week_number.value() {
                    parts.push(format!("Wk{}", sanitize(week)));
                }
            }
        }

        parts.push(date_stamp.format("%Y-%m-%d").to_string());

        Ok(format!("{}{}", parts.join("_"), kind.file_suffix()))
    }
}

/// Restrict to the allowed charset, collapse whitespace runs to single
/// underscores.
fn sanitize(component: &str) -> String {
    let cleaned = DISALLOWED.replace_all(component, " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join("_")
}

fn push_sanitized(parts: &mut Vec<String>, component: &str) {
    let sanitized = sanitize(component);
    if !sanitized.is_empty() {
        parts.push(sanitized);
    }
}
