//! Outcome types for sync operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use sync_core::TableName;
use sync_history::SyncReport;
use thiserror::Error;

/// Outcome of writing a single row to the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Written,
    Failed { reason: String },
}

/// A fault that stops a directional transfer.
///
/// Per-row write failures are never a `SyncError`; see [`RowOutcome`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The full-table read from the source failed
    #[error("failed to read table {table} from {store}: {message}")]
    SourceRead {
        store: String,
        table: String,
        message: String,
    },

    /// A session with the destination could not be established
    #[error("destination {store} is unavailable: {message}")]
    DestinationUnavailable { store: String, message: String },

    /// The engine's cancellation token fired between rows
    #[error("sync cancelled after {processed} of {total} rows")]
    Cancelled { processed: usize, total: usize },
}

/// Which way rows move between the primary and secondary store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    /// Primary to secondary (Oracle to MySQL)
    #[default]
    Forward,
    /// Secondary to primary (MySQL to Oracle)
    Reverse,
    /// Forward, then reverse
    #[serde(alias = "both")]
    Bidirectional,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Reverse => write!(f, "reverse"),
            Self::Bidirectional => write!(f, "bidirectional"),
        }
    }
}

impl std::str::FromStr for SyncDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" | "oracle-to-mysql" => Ok(Self::Forward),
            "reverse" | "mysql-to-oracle" => Ok(Self::Reverse),
            "bidirectional" | "both" => Ok(Self::Bidirectional),
            _ => Err(anyhow::anyhow!(
                "Invalid sync direction: '{s}'. Expected 'forward', 'reverse' or 'bidirectional'"
            )),
        }
    }
}

/// Running counts for one directional transfer.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TransferTally {
    pub read: usize,
    pub written: usize,
    pub failed: usize,
}

/// Outcome of one directional transfer or one bidirectional round.
///
/// For a directional result `records_written + records_failed <= records_read`.
/// A bidirectional result sums the counts and durations of both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    /// False only when a connection-level fault stopped a transfer
    pub success: bool,
    pub records_read: usize,
    pub records_written: usize,
    pub records_failed: usize,
    pub error_message: Option<String>,
    pub duration: Duration,
    pub sync_time: DateTime<Utc>,
}

impl SyncResult {
    pub(crate) fn from_transfer(
        tally: &TransferTally,
        error: Option<&SyncError>,
        duration: Duration,
        sync_time: DateTime<Utc>,
    ) -> Self {
        Self {
            success: error.is_none(),
            records_read: tally.read,
            records_written: tally.written,
            records_failed: tally.failed,
            error_message: error.map(ToString::to_string),
            duration,
            sync_time,
        }
    }

    /// Combine the results of the two legs of a bidirectional sync.
    ///
    /// Counts and durations are summed, `success` requires both legs, and the
    /// first leg's error message takes precedence.
    pub fn combine(first: &SyncResult, second: &SyncResult) -> SyncResult {
        SyncResult {
            success: first.success && second.success,
            records_read: first.records_read + second.records_read,
            records_written: first.records_written + second.records_written,
            records_failed: first.records_failed + second.records_failed,
            error_message: first
                .error_message
                .clone()
                .or_else(|| second.error_message.clone()),
            duration: first.duration + second.duration,
            sync_time: Utc::now(),
        }
    }

    /// Summarize this result as a history record.
    pub fn to_report(&self, source: &str, destination: &str, table: &TableName) -> SyncReport {
        SyncReport {
            sync_time: self.sync_time,
            source: source.to_string(),
            destination: destination.to_string(),
            table_name: table.to_string(),
            records_read: self.records_read,
            records_written: self.records_written,
            records_failed: self.records_failed,
            success: self.success,
            error_message: self.error_message.clone(),
        }
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} read, {} written, {} failed in {:?}",
            if self.success { "succeeded" } else { "failed" },
            self.records_read,
            self.records_written,
            self.records_failed,
            self.duration
        )?;
        if let Some(message) = &self.error_message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}
