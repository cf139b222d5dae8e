//! Name normalization and organization-name rejection
//!
//! Every putative person name accepted anywhere in the system passes
//! through [`is_organization_name`] first, so a company label can never be
//! recorded as a coach or a student.

use crate::config::IdentityConfig;

/// Title-case a single word. Hyphenated tokens are capitalized per
/// segment: `mani-munoz` → `Mani-Munoz`.
pub fn capitalize(token: &str) -> String {
    token
        .split('-')
        .map(capitalize_segment)
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Title-case every whitespace-separated word of a phrase.
pub fn capitalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a candidate "person name" is actually an organization.
///
/// True when the lower-cased candidate contains any configured indicator
/// substring or exactly equals the organization's display label.
pub fn is_organization_name(candidate: &str, identity: &IdentityConfig) -> bool {
    let lower = candidate.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    if lower == identity.org_label.to_lowercase() {
        return true;
    }
    identity
        .org_indicators
        .iter()
        .any(|indicator| lower.contains(&indicator.to_lowercase()))
}

/// Whether a token is purely numeric (account ids, session numbers).
pub fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}
