//! In-memory history storage implementation.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::RwLock;

use crate::store::HistoryStore;
use crate::SyncReport;

/// In-memory implementation of HistoryStore trait.
///
/// Reports live behind a `RwLock`, so reads proceed in parallel and only
/// contend with the short critical section of an append. Reports are lost
/// on process restart.
pub struct MemoryHistoryStore {
    reports: RwLock<VecDeque<SyncReport>>,
    max_entries: Option<usize>,
}

impl MemoryHistoryStore {
    /// Create a new store keeping at most `max_entries` reports.
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            reports: RwLock::new(VecDeque::new()),
            max_entries,
        }
    }

    /// Create a store that never evicts.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new(Some(crate::DEFAULT_MAX_ENTRIES))
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, report: SyncReport) -> Result<()> {
        let mut reports = self
            .reports
            .write()
            .map_err(|_| anyhow::anyhow!("sync history lock poisoned"))?;

        reports.push_back(report);
        if let Some(max) = self.max_entries {
            while reports.len() > max {
                reports.pop_front();
            }
        }
        Ok(())
    }

    async fn all(&self) -> Result<Vec<SyncReport>> {
        let snapshot: Vec<SyncReport> = self
            .reports
            .read()
            .map_err(|_| anyhow::anyhow!("sync history lock poisoned"))?
            .iter()
            .cloned()
            .collect();

        Ok(crate::newest_first(snapshot))
    }
}
