//! Cross-cutting category overrides
//!
//! Two classifications replace the normal coach/student scheme entirely:
//! the miscellaneous-host category, keyed by a reserved keyword in the
//! source text, and the generic-organization category, triggered when the
//! only identifiable participant is the shared contact account.

use crate::config::IngestConfig;
use crate::extractors::timeline::TimelineFindings;
use crate::normalize::capitalize;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// `<keyword> (&|and) <Name>` — the only student recovery available once
/// the misc-host short-circuit fires
static MISC_STUDENT: Lazy<Regex> = Lazy::new(|| {
    // Underscores are word characters, so the "and" separator spells out
    // its boundaries instead of using \b
    Regex::new(r"(?i)(?:&|[\s_]and[\s_])\s*([A-Za-z][A-Za-z'-]*)")
        .expect("invalid misc student pattern")
});

/// Whether the source text routes the recording to the misc-host
/// category: it contains the reserved keyword and does not match any
/// `firstname_keyword` exception where the keyword is a real surname.
pub fn is_misc_host(source_text: &str, config: &IngestConfig) -> bool {
    let lower = source_text.to_lowercase();
    let keyword = config.identity.misc_keyword.to_lowercase();
    if !lower.contains(&keyword) {
        return false;
    }
    for first in &config.identity.misc_surname_exceptions {
        let exception = format!("{}_{}", first.to_lowercase(), keyword);
        if lower.contains(&exception) {
            debug!(exception = %exception, "Misc keyword is a surname here; not misc-host");
            return false;
        }
    }
    true
}

/// Category label for misc-host recordings (the capitalized keyword).
pub fn misc_label(config: &IngestConfig) -> String {
    capitalize(&config.identity.misc_keyword)
}

/// Recover a student first name from the `<keyword> & <Name>` /
/// `<keyword> and <Name>` sub-pattern.
pub fn misc_student_name(source_text: &str, config: &IngestConfig) -> Option<String> {
    // Search the lower-cased text throughout; capitalize() restores the
    // name's casing afterwards
    let lower = source_text.to_lowercase();
    let keyword = config.identity.misc_keyword.to_lowercase();
    let after = &lower[lower.find(&keyword)? + keyword.len()..];
    let captures = MISC_STUDENT.captures(after)?;
    let name = capitalize(captures.get(1)?.as_str());
    if name.eq_ignore_ascii_case(&config.identity.misc_keyword) {
        return None;
    }
    Some(name)
}

/// Context fragment for misc-host naming: strip the keyword and long
/// numeric ids, match the configured context keywords, else fall back to
/// the first alphabetic token of three or more characters.
pub fn misc_context(source_text: &str, config: &IngestConfig) -> Option<String> {
    let keyword = config.identity.misc_keyword.to_lowercase();
    let cleaned: String = source_text
        .to_lowercase()
        .replace(&keyword, " ")
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|t| !t.is_empty() && !(t.len() >= 5 && t.chars().all(|c| c.is_ascii_digit())))
        .collect::<Vec<_>>()
        .join(" ");

    for context in &config.identity.misc_context_keywords {
        if cleaned.contains(&context.to_lowercase()) {
            return Some(capitalize(context));
        }
    }

    cleaned
        .split_whitespace()
        .find(|t| t.len() >= 3 && t.chars().all(|c| c.is_ascii_alphabetic()))
        .map(capitalize)
}

/// The generic-organization condition over classified timeline
/// participants: every non-excluded participant is the shared contact
/// account and no other organizational-domain email was collected.
pub fn is_generic_org(timeline: &TimelineFindings) -> bool {
    timeline.only_shared_contact
}
