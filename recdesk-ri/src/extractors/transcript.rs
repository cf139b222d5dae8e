//! Subtitle-transcript analysis
//!
//! WEBVTT cues carry a `Speaker: utterance` prefix per dialogue line.
//! The analyzer aggregates per-speaker statistics, mines self-introduction
//! phrasing for name candidates, and infers coaching-register vs
//! help-seeking roles as corroborating evidence. It is consulted only when
//! higher-priority sources left coach or student unresolved.

use crate::config::IngestConfig;
use crate::normalize::{capitalize, is_organization_name};
use crate::types::{ExtractedField, FieldSource, TranscriptCue, TranscriptDocument};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Self-introduction phrasings; group 1 captures the introduced name.
/// The captures insist on a leading capital so sentence fillers
/// ("I'm going to…") do not read as names.
static INTRODUCTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:I'm|I am)\s+([A-Z][a-z'-]+)",
        r"(?:this is|This is)\s+([A-Z][a-z'-]+)",
        r"(?i:my name is)\s+([A-Z][a-z'-]+)",
        r"Coach\s+([A-Z][a-z'-]+)",
        r"(?:Hi|hi)\s+([A-Z][a-z'-]+)\s*,\s*(?:I'm|I am)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid introduction pattern"))
    .collect()
});

/// Coaching-register phrases marking a likely coach
static COACH_PHRASES: &[&str] = &[
    "your assignment",
    "your homework",
    "my feedback",
    "i'll guide you",
    "let's work on",
    "your essay",
    "for next week i want",
];

/// Help-seeking phrases marking a likely student
static STUDENT_PHRASES: &[&str] = &[
    "i need help",
    "i don't understand",
    "can you explain",
    "how do i",
    "i'm struggling",
    "my question is",
];

/// Filler words a capitalized sentence start can still produce
static NAME_STOPWORDS: &[&str] = &[
    "going", "gonna", "just", "really", "sorry", "sure", "here", "okay", "good", "glad", "happy",
    "excited", "doing", "trying", "ready",
];

/// Per-speaker aggregate statistics
#[derive(Debug, Clone, Default)]
pub struct SpeakerStats {
    pub message_count: usize,
    pub possible_names: Vec<String>,
    pub likely_coach: bool,
    pub likely_student: bool,
}

/// What transcript analysis yields for one recording
#[derive(Debug, Clone, Default)]
pub struct TranscriptFindings {
    pub coach: ExtractedField<String>,
    pub student: ExtractedField<String>,
    /// Keyed by normalized speaker label; BTreeMap keeps iteration
    /// deterministic
    pub speakers: BTreeMap<String, SpeakerStats>,
}

/// Parse a WEBVTT transcript into dialogue cues. Cue-timing lines (the
/// `-->` arrow), headers, numeric cue ids, and blank lines are skipped;
/// this never fails, an unrecognizable document just yields no cues.
pub fn parse_vtt(raw: &str) -> TranscriptDocument {
    let mut cues = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.contains("-->")
            || line.eq_ignore_ascii_case("WEBVTT")
            || line.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        match line.split_once(':') {
            // A speaker label is a short prefix, not a clock time
            Some((speaker, text))
                if !speaker.trim().is_empty()
                    && !speaker.chars().any(|c| c.is_ascii_digit())
                    && !text.trim().is_empty() =>
            {
                cues.push(TranscriptCue {
                    speaker: Some(speaker.trim().to_string()),
                    text: text.trim().to_string(),
                });
            }
            _ => cues.push(TranscriptCue {
                speaker: None,
                text: line.to_string(),
            }),
        }
    }
    TranscriptDocument { cues }
}

/// Aggregate per-speaker statistics and derive coach/student candidates.
pub fn analyze(document: &TranscriptDocument, config: &IngestConfig) -> TranscriptFindings {
    let thresholds = &config.thresholds;
    let mut findings = TranscriptFindings::default();

    for cue in &document.cues {
        let label = normalize_speaker(cue.speaker.as_deref().unwrap_or("unknown"), config);
        let stats = findings.speakers.entry(label).or_default();
        stats.message_count += 1;

        for pattern in INTRODUCTION_PATTERNS.iter() {
            for captures in pattern.captures_iter(&cue.text) {
                if let Some(name) = captures.get(1) {
                    let name = name.as_str();
                    if NAME_STOPWORDS.contains(&name.to_lowercase().as_str()) {
                        continue;
                    }
                    // Organization names are discarded at add-time
                    if is_organization_name(name, &config.identity) {
                        continue;
                    }
                    let name = capitalize(name);
                    if !stats.possible_names.contains(&name) {
                        stats.possible_names.push(name);
                    }
                }
            }
        }

        let lower = cue.text.to_lowercase();
        if COACH_PHRASES.iter().any(|p| lower.contains(p)) {
            stats.likely_coach = true;
        }
        if STUDENT_PHRASES.iter().any(|p| lower.contains(p)) {
            stats.likely_student = true;
        }
    }

    // Coach candidate: dictionary hit among a speaker's possible names
    'coach: for (label, stats) in &findings.speakers {
        for name in &stats.possible_names {
            if config.is_coach_name(name) {
                debug!(speaker = %label, coach = %name, "Transcript coach candidate");
                findings.coach = ExtractedField::new(
                    name.clone(),
                    thresholds.transcript_coach,
                    FieldSource::Transcript,
                );
                break 'coach;
            }
        }
    }

    // Student candidate: a help-seeking speaker's non-dictionary name
    'student: for (label, stats) in &findings.speakers {
        if !stats.likely_student {
            continue;
        }
        for name in &stats.possible_names {
            if !config.is_coach_name(name) {
                debug!(speaker = %label, student = %name, "Transcript student candidate");
                findings.student = ExtractedField::new(
                    name.clone(),
                    thresholds.transcript_student,
                    FieldSource::Transcript,
                );
                break 'student;
            }
        }
    }

    findings
}

/// Rewrite the organization's spoken alias to its canonical label before
/// aggregation.
fn normalize_speaker(label: &str, config: &IngestConfig) -> String {
    if label.eq_ignore_ascii_case(&config.identity.org_spoken_alias) {
        config.identity.org_label.clone()
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IngestConfig {
        IngestConfig::default()
    }

    const SAMPLE_VTT: &str = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:04.000\nJenny: Hi John, I'm Jenny and I'll be your coach.\n\n2\n00:00:05.000 --> 00:00:09.000\nJohn: Thanks! I'm John. I need help with my essay outline.\n\n3\n00:00:10.000 --> 00:00:12.000\nJenny: Your assignment for next week is the common app draft.\n";

    #[test]
    fn vtt_parsing_skips_timing_and_headers() {
        let document = parse_vtt(SAMPLE_VTT);
        assert_eq!(document.cues.len(), 3);
        assert_eq!(document.cues[0].speaker.as_deref(), Some("Jenny"));
        assert!(document.cues[0].text.starts_with("Hi John"));
    }

    #[test]
    fn speaker_counts_aggregate() {
        let findings = analyze(&parse_vtt(SAMPLE_VTT), &config());
        assert_eq!(findings.speakers["Jenny"].message_count, 2);
        assert_eq!(findings.speakers["John"].message_count, 1);
    }

    #[test]
    fn self_introductions_feed_possible_names() {
        let findings = analyze(&parse_vtt(SAMPLE_VTT), &config());
        assert!(findings.speakers["Jenny"]
            .possible_names
            .contains(&"Jenny".to_string()));
        assert!(findings.speakers["John"]
            .possible_names
            .contains(&"John".to_string()));
    }

    #[test]
    fn dictionary_hit_yields_coach_candidate() {
        let findings = analyze(&parse_vtt(SAMPLE_VTT), &config());
        assert_eq!(findings.coach.value().unwrap(), "Jenny");
        assert_eq!(findings.coach.confidence(), 0.85);
        assert_eq!(findings.coach.source(), FieldSource::Transcript);
    }

    #[test]
    fn help_seeking_speaker_yields_student_candidate() {
        let findings = analyze(&parse_vtt(SAMPLE_VTT), &config());
        assert_eq!(findings.student.value().unwrap(), "John");
        assert_eq!(findings.student.confidence(), 0.75);
    }

    #[test]
    fn role_hints_from_register_phrases() {
        let findings = analyze(&parse_vtt(SAMPLE_VTT), &config());
        assert!(findings.speakers["Jenny"].likely_coach);
        assert!(findings.speakers["John"].likely_student);
    }

    #[test]
    fn sentence_fillers_are_not_names() {
        let vtt = "Speaker: I'm going to share my screen now.\n";
        let findings = analyze(&parse_vtt(vtt), &config());
        assert!(findings.speakers["Speaker"].possible_names.is_empty());
    }

    #[test]
    fn organization_names_discarded_at_add_time() {
        let vtt = "Host: Hi, this is Ivylevel welcoming you.\n";
        let findings = analyze(&parse_vtt(vtt), &config());
        assert!(findings.speakers["Host"].possible_names.is_empty());
    }

    #[test]
    fn spoken_alias_rewrites_to_canonical_label() {
        let vtt = "Ivy Level: Welcome everyone.\n";
        let findings = analyze(&parse_vtt(vtt), &config());
        assert!(findings.speakers.contains_key("Ivylevel"));
    }

    #[test]
    fn timing_lines_never_become_dialogue() {
        let vtt = "00:00:01.000 --> 00:00:04.000\n";
        let document = parse_vtt(vtt);
        assert!(document.cues.is_empty());
    }
}
