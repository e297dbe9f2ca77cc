//! Filesystem-based history storage implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::store::HistoryStore;
use crate::SyncReport;

/// Filesystem implementation of HistoryStore trait.
///
/// Stores one JSON-serialized report per line. Appends are serialized
/// through an async mutex so concurrent writers never interleave lines.
/// The file itself is never truncated; the retention bound is applied when
/// reading.
pub struct FilesystemHistoryStore {
    path: PathBuf,
    max_entries: Option<usize>,
    lock: Mutex<()>,
}

impl FilesystemHistoryStore {
    /// Create a new FilesystemHistoryStore writing to `path`.
    pub fn new(path: impl Into<PathBuf>, max_entries: Option<usize>) -> Self {
        Self {
            path: path.into(),
            max_entries,
            lock: Mutex::new(()),
        }
    }

    /// Get the file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl HistoryStore for FilesystemHistoryStore {
    async fn append(&self, report: SyncReport) -> Result<()> {
        let mut line = serde_json::to_string(&report)?;
        line.push('\n');

        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create history directory {}", parent.display())
                })?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open history file {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(
            "Appended sync report for table {} to {}",
            report.table_name,
            self.path.display()
        );
        Ok(())
    }

    async fn all(&self) -> Result<Vec<SyncReport>> {
        let content = {
            let _guard = self.lock.lock().await;
            match tokio::fs::read_to_string(&self.path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to read history file {}", self.path.display())
                    })
                }
            }
        };

        let mut reports = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SyncReport>(line) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    // Skip malformed lines
                    tracing::warn!(
                        "Skipping malformed history line {} in {}: {}",
                        line_no + 1,
                        self.path.display(),
                        e
                    );
                }
            }
        }

        let mut reports = crate::newest_first(reports);
        if let Some(max) = self.max_entries {
            reports.truncate(max);
        }
        Ok(reports)
    }
}
