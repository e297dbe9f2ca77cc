//! The record stored for each directional transfer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable summary of one completed (or failed) directional sync.
///
/// Created once by the sync engine right after the transfer finishes and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// When the transfer started
    pub sync_time: DateTime<Utc>,
    /// Name of the store rows were read from
    pub source: String,
    /// Name of the store rows were written to
    pub destination: String,
    pub table_name: String,
    pub records_read: usize,
    pub records_written: usize,
    pub records_failed: usize,
    pub success: bool,
    /// Connection-level failure message, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SyncReport {
    /// Short direction label, e.g. `Oracle -> MySQL`.
    pub fn direction(&self) -> String {
        format!("{} -> {}", self.source, self.destination)
    }
}
