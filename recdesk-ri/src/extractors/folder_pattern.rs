//! Pattern extraction from folder and topic strings
//!
//! The folder/topic string is the highest-volume evidence source and the
//! noisiest: underscore- or space-separated tokens mixing coach names,
//! student names, week markers, session qualifiers, and numeric ids.
//! Extraction runs as an ordered cascade — the first successful stage wins
//! per field — with week-number and game-plan detection independent of the
//! name rules.
//!
//! Week and game-plan patterns are ordered `(Regex, …)` tables so new
//! variants are added as rows, not branches.

use crate::config::IngestConfig;
use crate::normalize::{capitalize, is_numeric_token, is_organization_name};
use crate::types::{ExtractedField, FieldSource};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Ordered week-number patterns; the first capture wins and its digits are
/// taken verbatim.
static WEEK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)week[\s_#-]*(\d+)",
        r"(?i)wk[\s_#-]*(\d+)",
        r"(?i)(\d+)\s*(?:st|nd|rd|th)[\s_-]+week",
        // \b is useless next to underscores (they are word characters),
        // so the w-shorthand spells out its separators
        r"(?i)(?:^|[\s_#-])w[\s_-]?(\d+)(?:[\s_#-]|$)",
        r"(?i)session[\s_#-]*(\d+)",
        r"(?i)meeting[\s_#-]*(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid week pattern"))
    .collect()
});

/// Phrases that mark a game-plan session
static GAME_PLAN_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)game[\s_-]*plan",
        r"(?i)strategy[\s_-]+session",
        r"(?i)planning[\s_-]+meeting",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid game-plan pattern"))
    .collect()
});

/// Tokens that are session markers rather than name fragments
static SESSION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:week|wk|w|session|meeting|game|plan|gameplan|planning|strategy)\d*$")
        .expect("invalid marker pattern")
});

/// What pattern extraction yields for one source string
#[derive(Debug, Clone, Default)]
pub struct FolderFindings {
    pub coach: ExtractedField<String>,
    pub student: ExtractedField<String>,
    pub week_number: ExtractedField<String>,
    pub has_game_plan: bool,
}

/// Extract coach, student, week number, and game-plan flag from a single
/// free-text string. Pure function: identical input yields identical
/// output.
pub fn extract(source_text: &str, config: &IngestConfig) -> FolderFindings {
    let thresholds = &config.thresholds;
    let mut findings = FolderFindings::default();

    let tokens: Vec<&str> = source_text
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    // Rule 1: dictionary coach leading a well-formed folder name
    if tokens.len() >= 4 && config.is_coach_name(tokens[0]) {
        findings.coach = ExtractedField::new(
            capitalize(tokens[0]),
            thresholds.folder_coach,
            FieldSource::FolderPattern,
        );
        derive_student(&tokens[1..], config, &mut findings);
    }

    // Rule 2: dictionary match at any position
    if !findings.coach.is_set() {
        if let Some(pos) = tokens.iter().position(|t| config.is_coach_name(t)) {
            findings.coach = ExtractedField::new(
                capitalize(tokens[pos]),
                thresholds.folder_scan,
                FieldSource::FolderPattern,
            );
            if pos > 0 {
                let preceding: Vec<&str> = tokens[..pos]
                    .iter()
                    .copied()
                    .filter(|t| is_name_fragment(t))
                    .collect();
                if preceding.len() >= 2 {
                    let name = format!(
                        "{} {}",
                        capitalize(preceding[preceding.len() - 2]),
                        capitalize(preceding[preceding.len() - 1])
                    );
                    findings.student = ExtractedField::new(
                        name,
                        thresholds.folder_scan,
                        FieldSource::FolderPattern,
                    );
                }
            }
        }
    }

    // Organization gate: a rejected name is absence, not an error
    reject_org_names(&mut findings, config);

    // Week number and game-plan flag run against the whole string,
    // independent of the name rules
    for pattern in WEEK_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(source_text) {
            let digits = captures.get(1).map(|m| m.as_str().to_string());
            if let Some(digits) = digits {
                debug!(week = %digits, pattern = %pattern.as_str(), "Week number matched");
                findings.week_number = ExtractedField::new(
                    digits,
                    thresholds.week_pattern,
                    FieldSource::FolderPattern,
                );
                break;
            }
        }
    }

    findings.has_game_plan = GAME_PLAN_PATTERNS.iter().any(|p| p.is_match(source_text));

    findings
}

/// Rule 1 student derivation over the tokens after the coach.
fn derive_student(rest: &[&str], config: &IngestConfig, findings: &mut FolderFindings) {
    let thresholds = &config.thresholds;
    let remaining: Vec<&str> = rest.iter().copied().filter(|t| is_name_fragment(t)).collect();

    // Hyphenated surname: pair with the immediately preceding token
    if let Some(pos) = remaining.iter().position(|t| t.contains('-')) {
        let name = if pos > 0 {
            format!("{} {}", capitalize(remaining[pos - 1]), capitalize(remaining[pos]))
        } else {
            capitalize(remaining[pos])
        };
        findings.student = ExtractedField::new(
            name,
            thresholds.folder_student_hyphen,
            FieldSource::FolderPatternHyphenated,
        );
        return;
    }

    match remaining.len() {
        0 => {}
        1 => {
            // A lone trailing token is taken as the student's first name
            findings.student = ExtractedField::new(
                capitalize(remaining[0]),
                thresholds.folder_student_tail,
                FieldSource::FolderPattern,
            );
        }
        2 => {
            findings.student = ExtractedField::new(
                format!("{} {}", capitalize(remaining[0]), capitalize(remaining[1])),
                thresholds.folder_student_pair,
                FieldSource::FolderPattern,
            );
        }
        n => {
            // Trailing tokens are the student; leading ones are the
            // coach's own surname or session qualifiers
            findings.student = ExtractedField::new(
                format!("{} {}", capitalize(remaining[n - 2]), capitalize(remaining[n - 1])),
                thresholds.folder_student_tail,
                FieldSource::FolderPattern,
            );
        }
    }
}

/// Whether a token can be part of a person name.
fn is_name_fragment(token: &str) -> bool {
    !is_numeric_token(token) && !SESSION_MARKER.is_match(token)
}

/// Apply the organization gate to both name fields.
fn reject_org_names(findings: &mut FolderFindings, config: &IngestConfig) {
    if let Some(coach) = findings.coach.value() {
        if is_organization_name(coach, &config.identity) {
            debug!(coach = %coach, "Coach candidate rejected as organization name");
            findings.coach.clear();
        }
    }
    if let Some(student) = findings.student.value() {
        if is_organization_name(student, &config.identity) {
            debug!(student = %student, "Student candidate rejected as organization name");
            findings.student.clear();
        }
    }
}
