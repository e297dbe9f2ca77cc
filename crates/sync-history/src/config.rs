//! History configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of reports kept by a history store.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Storage backend for the sync history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryStorage {
    /// Keep reports in process memory only.
    Memory,

    /// Append reports to a JSON-lines file.
    Filesystem { path: PathBuf },
}

/// Configuration for the sync history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Where reports are stored.
    pub storage: HistoryStorage,

    /// Maximum number of reports retained.
    ///
    /// When the bound is exceeded the oldest reports are dropped. The
    /// filesystem store applies the bound when reading and never truncates
    /// its file. `None` keeps every report for the lifetime of the store.
    pub max_entries: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage: HistoryStorage::Memory,
            max_entries: Some(DEFAULT_MAX_ENTRIES),
        }
    }
}

impl HistoryConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config backed by a JSON-lines file.
    pub fn filesystem(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: HistoryStorage::Filesystem { path: path.into() },
            ..Self::default()
        }
    }

    /// Create an in-memory config without a retention bound.
    pub fn unbounded() -> Self {
        Self {
            storage: HistoryStorage::Memory,
            max_entries: None,
        }
    }
}
