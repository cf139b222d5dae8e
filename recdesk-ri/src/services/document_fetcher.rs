//! Evidence document fetching
//!
//! The core does not interpret locators; a fetcher resolves them to text.
//! A missing document is `Ok(None)` — evidence sources degrade to absent,
//! they never abort a recording.

use async_trait::async_trait;
use recdesk_common::Result;
use std::path::PathBuf;
use tracing::debug;

/// Fetch evidence documents by opaque locator
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Resolve a locator to its text content, or `None` when the
    /// document does not exist.
    async fn fetch_text(&self, locator: &str) -> Result<Option<String>>;
}

/// Fetcher over the local filesystem; locators are paths, resolved
/// against a root when relative.
pub struct LocalFileFetcher {
    root: PathBuf,
}

impl LocalFileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentFetcher for LocalFileFetcher {
    async fn fetch_text(&self, locator: &str) -> Result<Option<String>> {
        let path = {
            let candidate = PathBuf::from(locator);
            if candidate.is_absolute() {
                candidate
            } else {
                self.root.join(candidate)
            }
        };

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Evidence document not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chat.txt"), "17:00:00 From A to B: hi").unwrap();

        let fetcher = LocalFileFetcher::new(dir.path());
        let content = fetcher.fetch_text("chat.txt").await.unwrap();
        assert_eq!(content.as_deref(), Some("17:00:00 From A to B: hi"));
    }

    #[tokio::test]
    async fn missing_file_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = LocalFileFetcher::new(dir.path());
        assert!(fetcher.fetch_text("absent.vtt").await.unwrap().is_none());
    }
}
