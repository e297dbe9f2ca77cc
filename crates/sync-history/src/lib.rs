//! Sync history log for table-sync
//!
//! Retains a [`SyncReport`] for every completed directional transfer and
//! serves them back newest first.
//!
//! # Architecture
//!
//! This crate provides a storage-agnostic history log that:
//! - Defines the `SyncReport` record appended after each directional sync
//! - Defines the `HistoryStore` trait for append and ordered read
//! - Supports multiple storage backends
//!
//! ## Storage Backends
//!
//! - `MemoryHistoryStore` - Lock-guarded in-process log with a retention bound
//! - `FilesystemHistoryStore` - JSON-lines file that survives restarts
//!
//! Both backends are safe for concurrent appends and for reads running
//! alongside appends. Readers always receive owned copies of the reports.

mod config;
mod filesystem;
mod memory;
mod report;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::{HistoryConfig, HistoryStorage, DEFAULT_MAX_ENTRIES};
pub use filesystem::FilesystemHistoryStore;
pub use memory::MemoryHistoryStore;
pub use report::SyncReport;
pub use store::HistoryStore;

use std::sync::Arc;

/// Build the history store described by `config`.
pub fn open_history_store(config: &HistoryConfig) -> Arc<dyn HistoryStore> {
    match &config.storage {
        HistoryStorage::Memory => Arc::new(MemoryHistoryStore::new(config.max_entries)),
        HistoryStorage::Filesystem { path } => Arc::new(FilesystemHistoryStore::new(
            path.clone(),
            config.max_entries,
        )),
    }
}

/// Order reports newest first.
///
/// `reports` must be in append order. Reports with the same timestamp keep
/// the most recently appended one first.
pub(crate) fn newest_first(mut reports: Vec<SyncReport>) -> Vec<SyncReport> {
    reports.reverse();
    // Stable sort keeps the reversed append order for equal timestamps
    reports.sort_by(|a, b| b.sync_time.cmp(&a.sync_time));
    reports
}
