//! JSON-file backed snapshot source and history store.
//!
//! Serves a single local learner, so the user id is only used for logging.
//! The snapshot file holds one snapshot object or an array of them; the
//! history file holds an array of history records and is created on first
//! append.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use learnquest_core::model::PerformanceSnapshot;
use learnquest_core::stats::HistoryRecord;
use learnquest_core::traits::{HistoryStore, SnapshotSource};

#[derive(Debug, Clone, Default)]
pub struct FileStore {
    snapshot_path: Option<PathBuf>,
    history_path: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    One(PerformanceSnapshot),
    Many(Vec<PerformanceSnapshot>),
}

impl FileStore {
    pub fn new(snapshot_path: Option<PathBuf>, history_path: Option<PathBuf>) -> Self {
        Self {
            snapshot_path,
            history_path,
        }
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

#[async_trait]
impl SnapshotSource for FileStore {
    async fn latest_snapshot(&self, user_id: &str) -> Result<Option<PerformanceSnapshot>> {
        let Some(path) = &self.snapshot_path else {
            return Ok(None);
        };
        let Some(content) = read_optional(path).await? else {
            debug!(user_id, path = %path.display(), "no snapshot file");
            return Ok(None);
        };

        let parsed: SnapshotFile = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse snapshot: {}", path.display()))?;
        Ok(match parsed {
            SnapshotFile::One(snapshot) => Some(snapshot),
            SnapshotFile::Many(list) => list.into_iter().max_by_key(|s| s.taken_at),
        })
    }
}

#[async_trait]
impl HistoryStore for FileStore {
    async fn history(&self, user_id: &str) -> Result<Vec<HistoryRecord>> {
        let Some(path) = &self.history_path else {
            return Ok(Vec::new());
        };
        let Some(content) = read_optional(path).await? else {
            debug!(user_id, path = %path.display(), "no history file yet");
            return Ok(Vec::new());
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse history: {}", path.display()))
    }

    async fn append(&self, user_id: &str, record: HistoryRecord) -> Result<()> {
        let Some(path) = &self.history_path else {
            debug!(user_id, "no history file configured; result not persisted");
            return Ok(());
        };
        let mut records = self.history(user_id).await?;
        records.push(record);

        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write history: {}", path.display()))
    }
}
