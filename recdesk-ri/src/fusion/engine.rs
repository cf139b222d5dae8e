//! Metadata fusion engine
//!
//! Runs every analyzer over one recording's evidence bundle in a fixed
//! precedence order and merges their outputs into a single finalized
//! record. The ordering is the contract, not an implementation detail:
//! structured participant data beats free-text patterns, which beat
//! transcript self-introductions, which beat chat substring matches, with
//! the directory and time-based calculations only ever filling gaps.
//!
//! Merging follows the strictly-exceeds confidence rule everywhere except
//! two documented forced overrides: the misc-host short-circuit (stage 1)
//! and the generic-organization participant condition (stage 3).

use crate::config::IngestConfig;
use crate::extractors::{chat, folder_pattern, timeline, transcript};
use crate::fusion::special_cases;
use crate::normalize::{capitalize, is_organization_name};
use crate::services::student_directory::DirectorySnapshot;
use crate::types::{
    ExtractedField, FieldSource, FinalizedMetadataRecord, RecordingEvidence, SessionCategory,
    StudentDirectoryEntry,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of fusing one recording's evidence
#[derive(Debug, Clone)]
pub struct FusionOutcome {
    pub record: FinalizedMetadataRecord,
    /// Final coach or student confidence fell below the review gate; the
    /// caller notifies the review queue, processing continues regardless
    pub needs_review: bool,
}

/// The fusion orchestrator
pub struct MetadataFusionEngine {
    config: Arc<IngestConfig>,
}

impl MetadataFusionEngine {
    pub fn new(config: Arc<IngestConfig>) -> Self {
        Self { config }
    }

    /// Fuse all available evidence for one recording into a finalized
    /// record. Pure computation over already-fetched documents; absent
    /// documents contribute nothing.
    pub fn fuse(
        &self,
        evidence: &RecordingEvidence,
        directory: &DirectorySnapshot,
    ) -> FusionOutcome {
        let config = &self.config;
        let thresholds = &config.thresholds;
        let text = &evidence.source_text;

        // Stage 1: miscellaneous-host short-circuit. Normal student/week
        // extraction is skipped; only the keyword sub-pattern can recover
        // a student first name.
        if special_cases::is_misc_host(text, config) {
            let mut coach = ExtractedField::absent();
            coach.force(
                special_cases::misc_label(config),
                thresholds.misc_host,
                FieldSource::SirajPattern,
            );
            let student = match special_cases::misc_student_name(text, config) {
                Some(name) => {
                    ExtractedField::new(name, thresholds.misc_student, FieldSource::SirajPattern)
                }
                None => ExtractedField::absent(),
            };
            info!(topic = %text, "Misc-host short-circuit");
            return FusionOutcome {
                record: FinalizedMetadataRecord {
                    coach,
                    student,
                    week_number: ExtractedField::absent(),
                    has_game_plan: false,
                    category: SessionCategory::MiscHost,
                    misc_context: special_cases::misc_context(text, config),
                },
                needs_review: false,
            };
        }

        // Stage 2: seed from the folder/topic pattern
        let folder = folder_pattern::extract(text, config);
        let mut coach = folder.coach;
        let mut student = folder.student;
        let mut week_number = folder.week_number;
        let has_game_plan = folder.has_game_plan;
        let mut category = SessionCategory::Normal;

        // Stage 3: timeline merge, then the forced generic-organization
        // override — an explicit single-participant signal outranks any
        // text-pattern guess
        if let Some(document) = &evidence.timeline {
            let findings = timeline::analyze(document, config);
            coach.consider(findings.coach.clone());
            student.consider(findings.student.clone());
            self.org_gate(&mut coach, &mut student, category);

            if special_cases::is_generic_org(&findings) {
                category = SessionCategory::GenericOrg;
                coach.force(
                    config.identity.org_label.clone(),
                    thresholds.generic_org,
                    FieldSource::IvylevelPattern,
                );
                debug!("Generic-organization override applied");
            }
        }

        // Stage 4: transcript, only while coach or student is missing or
        // below the consult gate
        if below(&coach, thresholds.transcript_consult)
            || below(&student, thresholds.transcript_consult)
        {
            if let Some(document) = &evidence.transcript {
                let findings = transcript::analyze(document, config);
                coach.consider(findings.coach);
                student.consider(findings.student);
                self.org_gate(&mut coach, &mut student, category);
            }
        }

        // Stage 5: chat, the last-resort hint
        if below(&coach, thresholds.chat_consult) || below(&student, thresholds.chat_consult) {
            if let Some(document) = &evidence.chat {
                let findings = chat::analyze(document, config);
                coach.consider(findings.coach);
            }
        }

        // Organizational host emails usually carry the coach's name in
        // the local part
        if let Some(host) = evidence.host_email.as_deref() {
            if config.identity.is_org_email(host) {
                if let Some(candidate) = coach_from_email(host, config) {
                    coach.consider(ExtractedField::new(
                        candidate,
                        thresholds.host_email_coach,
                        FieldSource::MetadataCoachEmail,
                    ));
                }
            }
        }

        self.org_gate(&mut coach, &mut student, category);

        // Stage 6: student-directory fallback, filling whatever is still
        // unset
        if !coach.is_set() || !student.is_set() {
            if let Some((entry, student_source)) = find_directory_entry(evidence, directory, config)
            {
                debug!(student = %entry.display_name, coach = %entry.coach_name, "Directory fallback hit");
                student.consider(ExtractedField::new(
                    entry.display_name.clone(),
                    thresholds.directory_match,
                    student_source,
                ));
                if !coach.is_set() {
                    coach.consider(ExtractedField::new(
                        entry.coach_name.clone(),
                        thresholds.directory_match,
                        FieldSource::Mappings,
                    ));
                }
                // Stage 7: elapsed-time week calculation
                if !week_number.is_set() {
                    if let (Some(start), Some(recorded)) =
                        (entry.start_date, evidence.recording_date)
                    {
                        let week = elapsed_week(start, recorded);
                        week_number = ExtractedField::new(
                            week.to_string(),
                            thresholds.week_calculated,
                            FieldSource::Calculated,
                        );
                    }
                }
            }
        }

        // Final assembly: the week default exists only here
        if category == SessionCategory::Normal && !week_number.is_set() {
            week_number = ExtractedField::new(
                "1".to_string(),
                thresholds.week_fallback,
                FieldSource::CalculatedFallback,
            );
        }

        let needs_review = category == SessionCategory::Normal
            && (coach.confidence() < thresholds.manual_review
                || student.confidence() < thresholds.manual_review);

        info!(
            coach = coach.value().map(String::as_str).unwrap_or("-"),
            coach_source = %coach.source(),
            student = student.value().map(String::as_str).unwrap_or("-"),
            student_source = %student.source(),
            week = week_number.value().map(String::as_str).unwrap_or("-"),
            category = ?category,
            needs_review,
            "Fusion complete"
        );

        FusionOutcome {
            record: FinalizedMetadataRecord {
                coach,
                student,
                week_number,
                has_game_plan,
                category,
                misc_context: None,
            },
            needs_review,
        }
    }

    /// Stage 8: organization-name filtering. A positive hit resets the
    /// field to absent so later stages can refill it. The forced category
    /// label is exempt — it is the organization, on purpose.
    fn org_gate(
        &self,
        coach: &mut ExtractedField<String>,
        student: &mut ExtractedField<String>,
        category: SessionCategory,
    ) {
        if category == SessionCategory::Normal {
            if let Some(value) = coach.value() {
                if is_organization_name(value, &self.config.identity) {
                    debug!(coach = %value, "Coach reset: organization name");
                    coach.clear();
                }
            }
        }
        if let Some(value) = student.value() {
            if is_organization_name(value, &self.config.identity) {
                debug!(student = %value, "Student reset: organization name");
                student.clear();
            }
        }
    }
}

fn below(field: &ExtractedField<String>, gate: f32) -> bool {
    field.confidence() < gate
}

/// Leading local-part segment of an organizational email, when it is a
/// dictionary coach name.
fn coach_from_email(email: &str, config: &IngestConfig) -> Option<String> {
    let local = email.split('@').next()?;
    let lead = local.split(['.', '_', '-']).next()?;
    if config.is_coach_name(lead) {
        Some(capitalize(lead))
    } else {
        None
    }
}

/// Directory lookup: host-email match first, then a substring scan of the
/// source text against student names and email local parts.
fn find_directory_entry<'a>(
    evidence: &RecordingEvidence,
    directory: &'a DirectorySnapshot,
    config: &IngestConfig,
) -> Option<(&'a StudentDirectoryEntry, FieldSource)> {
    if let Some(host) = evidence.host_email.as_deref() {
        if !config.identity.is_org_email(host) {
            if let Some(entry) = directory.lookup_by_email(host) {
                return Some((entry, FieldSource::MetadataStudentEmail));
            }
        }
    }

    let text_norm = evidence.source_text.to_lowercase().replace('_', " ");
    for entry in directory.entries() {
        let name = entry.display_name.to_lowercase();
        if !name.is_empty() && text_norm.contains(&name) {
            return Some((entry, FieldSource::Mappings));
        }
        if let Some(local) = entry.email.split('@').next() {
            let local_norm = local.to_lowercase().replace(['.', '_', '-'], " ");
            if local_norm.len() >= 3 && text_norm.contains(&local_norm) {
                return Some((entry, FieldSource::Mappings));
            }
        }
    }
    None
}

/// Week number from elapsed days since program start, clamped to [1, 52].
fn elapsed_week(start: chrono::NaiveDate, recorded: chrono::NaiveDate) -> i64 {
    let days = (recorded - start).num_days();
    ((days + 6).div_euclid(7)).clamp(1, 52)
}
