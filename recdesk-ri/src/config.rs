//! Configuration for the recording-ingest service
//!
//! All heuristic tables live here — organization identity, the coach-name
//! dictionary, keyword exception lists — so a tuning pass touches one
//! place and tests can construct exact configurations. Loaded from TOML
//! with serde defaults; every field falls back to the compiled default
//! when the file omits it.

use crate::fusion::thresholds::ConfidenceThresholds;
use recdesk_common::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "RECDESK_RI_CONFIG";

/// Default config file name under the platform config directory
pub const CONFIG_FILE_NAME: &str = "recdesk-ri.toml";

/// Identity of the sponsoring organization and its reserved keywords
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Canonical display label, used as the coach value for
    /// generic-organization recordings
    pub org_label: String,
    /// Spoken alias sometimes produced by caption speaker labels
    pub org_spoken_alias: String,
    /// Email domains whose accounts are organizational (coaches)
    pub org_domains: Vec<String>,
    /// The shared contact account's exact email address
    pub shared_contact_email: String,
    /// Substrings that mark a putative person name as an organization
    pub org_indicators: Vec<String>,
    /// Reserved keyword that routes a recording to the misc-host category
    pub misc_keyword: String,
    /// First names for which `<first>_<keyword>` is a real student whose
    /// surname equals the keyword, not a misc-host session
    pub misc_surname_exceptions: Vec<String>,
    /// Context keywords recognized when naming misc-host recordings
    pub misc_context_keywords: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            org_label: "Ivylevel".to_string(),
            org_spoken_alias: "Ivy Level".to_string(),
            org_domains: vec!["ivymentors.co".to_string(), "ivylevel.com".to_string()],
            shared_contact_email: "contact@ivymentors.co".to_string(),
            org_indicators: vec![
                "ivylevel".to_string(),
                "ivy level".to_string(),
                "ivymentors".to_string(),
                "company".to_string(),
                "corp".to_string(),
                "inc".to_string(),
                "llc".to_string(),
                "institute".to_string(),
                "academy".to_string(),
                "university".to_string(),
                "organization".to_string(),
                "mentors".to_string(),
            ],
            misc_keyword: "siraj".to_string(),
            misc_surname_exceptions: vec!["aarnav".to_string()],
            misc_context_keywords: vec![
                "checkin".to_string(),
                "check-in".to_string(),
                "planning".to_string(),
                "review".to_string(),
                "intro".to_string(),
                "strategy".to_string(),
                "onboarding".to_string(),
                "workshop".to_string(),
                "training".to_string(),
                "interview".to_string(),
            ],
        }
    }
}

impl IdentityConfig {
    /// Whether an email address is on one of the organizational domains.
    pub fn is_org_email(&self, email: &str) -> bool {
        let lower = email.to_ascii_lowercase();
        match lower.rsplit_once('@') {
            Some((_, domain)) => self
                .org_domains
                .iter()
                .any(|d| domain == d.to_ascii_lowercase()),
            None => false,
        }
    }

    /// Whether an email address is exactly the shared contact account.
    pub fn is_shared_contact(&self, email: &str) -> bool {
        email.eq_ignore_ascii_case(&self.shared_contact_email)
    }
}

/// Full ingest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub identity: IdentityConfig,
    /// Known coach first names, lower-cased (the dictionary every
    /// analyzer matches against)
    pub coaches: Vec<String>,
    pub thresholds: ConfidenceThresholds,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            identity: IdentityConfig::default(),
            coaches: vec![
                "jenny".to_string(),
                "rishi".to_string(),
                "aditi".to_string(),
                "noor".to_string(),
                "jamie".to_string(),
                "kelvin".to_string(),
                "juli".to_string(),
                "erin".to_string(),
                "steven".to_string(),
                "andrew".to_string(),
                "marissa".to_string(),
                "siraj".to_string(),
            ],
            thresholds: ConfidenceThresholds::default(),
        }
    }
}

impl IngestConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let config: IngestConfig = recdesk_common::config::load_toml(path)?;
        info!(path = %path.display(), coaches = config.coaches.len(), "Ingest config loaded");
        Ok(config)
    }

    /// Resolve the config file (CLI → ENV → platform dir) and load it,
    /// falling back to compiled defaults when none exists.
    pub fn resolve_and_load(cli_path: Option<&Path>) -> Result<Self> {
        match recdesk_common::config::resolve_config_path(cli_path, CONFIG_ENV_VAR, CONFIG_FILE_NAME)
        {
            Some(path) => Self::load(&path),
            None => {
                info!("No config file found; using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Dictionary lookup for a single lower-cased token.
    pub fn is_coach_name(&self, token: &str) -> bool {
        let lower = token.to_ascii_lowercase();
        self.coaches.iter().any(|c| *c == lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dictionary_matches_case_insensitively() {
        let config = IngestConfig::default();
        assert!(config.is_coach_name("jenny"));
        assert!(config.is_coach_name("Jenny"));
        assert!(!config.is_coach_name("john"));
    }

    #[test]
    fn org_email_by_domain() {
        let identity = IdentityConfig::default();
        assert!(identity.is_org_email("jenny@ivymentors.co"));
        assert!(identity.is_org_email("Jenny@IVYMENTORS.CO"));
        assert!(!identity.is_org_email("john@gmail.com"));
        assert!(!identity.is_org_email("not-an-email"));
    }

    #[test]
    fn shared_contact_is_exact_match() {
        let identity = IdentityConfig::default();
        assert!(identity.is_shared_contact("contact@ivymentors.co"));
        assert!(identity.is_shared_contact("Contact@Ivymentors.co"));
        assert!(!identity.is_shared_contact("jenny@ivymentors.co"));
    }

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recdesk-ri.toml");
        std::fs::write(
            &path,
            r#"
coaches = ["priya"]

[identity]
org_label = "Acme Prep"
"#,
        )
        .unwrap();

        let config = IngestConfig::load(&path).unwrap();
        assert_eq!(config.coaches, vec!["priya".to_string()]);
        assert_eq!(config.identity.org_label, "Acme Prep");
        // Unspecified sections keep their defaults
        assert!(config.thresholds.manual_review > 0.0);
    }
}
