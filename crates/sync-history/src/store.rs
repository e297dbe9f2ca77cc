//! History storage trait.
//!
//! This module defines the HistoryStore trait for backend-agnostic
//! history operations.

use anyhow::Result;
use async_trait::async_trait;

use crate::SyncReport;

/// Trait for history storage operations.
///
/// This trait abstracts the storage backend for the sync history, allowing
/// the same engine logic to work with:
/// - In-memory storage (`MemoryHistoryStore`)
/// - Filesystem storage (`FilesystemHistoryStore`)
///
/// Implementations must not lose entries under concurrent `append` calls,
/// and `all` must return a consistent snapshot even while appends run.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a report to the log.
    async fn append(&self, report: SyncReport) -> Result<()>;

    /// All retained reports, most recent `sync_time` first.
    async fn all(&self) -> Result<Vec<SyncReport>>;
}
