//! Student directory (coach/student mapping table)
//!
//! The directory is an external, spreadsheet-backed table; the core only
//! ever sees read-only snapshots of it. The shared cache is refreshed at
//! explicit points (batch start, operator request) and is safe to share
//! across concurrently-processed recordings.

use crate::types::StudentDirectoryEntry;
use async_trait::async_trait;
use recdesk_common::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Immutable snapshot of the directory at one refresh point
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    entries: Vec<StudentDirectoryEntry>,
}

impl DirectorySnapshot {
    pub fn new(entries: Vec<StudentDirectoryEntry>) -> Self {
        Self { entries }
    }

    /// Case-insensitive lookup by student email.
    pub fn lookup_by_email(&self, email: &str) -> Option<&StudentDirectoryEntry> {
        self.entries
            .iter()
            .find(|e| e.email.eq_ignore_ascii_case(email))
    }

    /// All entries, for substring scans.
    pub fn entries(&self) -> &[StudentDirectoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read access to the student directory
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Lookup one entry by student email.
    async fn lookup_by_email(&self, email: &str) -> Option<StudentDirectoryEntry>;

    /// Current snapshot of all entries.
    async fn snapshot(&self) -> DirectorySnapshot;
}

/// In-memory directory loaded from a JSON snapshot file.
///
/// Shared behind `Arc`; `reload` is the explicit refresh point. Readers
/// hold the lock only long enough to clone the snapshot.
pub struct InMemoryDirectory {
    inner: RwLock<DirectorySnapshot>,
}

impl InMemoryDirectory {
    pub fn new(entries: Vec<StudentDirectoryEntry>) -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(DirectorySnapshot::new(entries)),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new(Vec::new())
    }

    /// Load a directory snapshot from a JSON array file.
    pub fn load_json(path: &Path) -> Result<Arc<Self>> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<StudentDirectoryEntry> = serde_json::from_str(&raw)
            .map_err(|e| Error::Parse(format!("directory snapshot {}: {}", path.display(), e)))?;
        info!(path = %path.display(), entries = entries.len(), "Student directory loaded");
        Ok(Self::new(entries))
    }

    /// Replace the snapshot wholesale (the refresh point).
    pub async fn reload(&self, entries: Vec<StudentDirectoryEntry>) {
        let mut guard = self.inner.write().await;
        *guard = DirectorySnapshot::new(entries);
    }
}

#[async_trait]
impl StudentDirectory for InMemoryDirectory {
    async fn lookup_by_email(&self, email: &str) -> Option<StudentDirectoryEntry> {
        self.inner.read().await.lookup_by_email(email).cloned()
    }

    async fn snapshot(&self) -> DirectorySnapshot {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(email: &str, name: &str, coach: &str) -> StudentDirectoryEntry {
        StudentDirectoryEntry {
            email: email.to_string(),
            display_name: name.to_string(),
            coach_name: coach.to_string(),
            coach_email: None,
            program: None,
            start_date: None,
        }
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let directory = InMemoryDirectory::new(vec![entry(
            "john.smith@gmail.com",
            "John Smith",
            "Jenny",
        )]);
        let hit = directory.lookup_by_email("John.Smith@Gmail.com").await;
        assert_eq!(hit.unwrap().display_name, "John Smith");
        assert!(directory.lookup_by_email("nobody@gmail.com").await.is_none());
    }

    #[tokio::test]
    async fn reload_replaces_snapshot() {
        let directory = InMemoryDirectory::empty();
        assert!(directory.snapshot().await.is_empty());

        directory
            .reload(vec![entry("a@b.com", "Ana Torres", "Rishi")])
            .await;
        assert_eq!(directory.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn load_json_parses_entries_with_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");
        std::fs::write(
            &path,
            r#"[
                {"email": "john@gmail.com", "name": "John Smith", "coach": "Jenny",
                 "start_date": "2026-01-05"}
            ]"#,
        )
        .unwrap();

        let directory = InMemoryDirectory::load_json(&path).unwrap();
        let snapshot = directory.snapshot().await;
        assert_eq!(snapshot.entries()[0].coach_name, "Jenny");
        assert!(snapshot.entries()[0].start_date.is_some());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");
        std::fs::write(&path, "{not an array").unwrap();
        assert!(InMemoryDirectory::load_json(&path).is_err());
    }
}
