//! Table synchronization engine.
//!
//! Reads a full table snapshot from one store, writes each row into another
//! store, isolates per-row failures, and records a [`SyncReport`] for every
//! directional transfer.
//!
//! # Design Overview
//!
//! ```text
//! StoreAdapter(source).query ──► RowSnapshot
//!                                    │ for each row
//!                                    ▼
//!                           StatementBuilder.build_insert
//!                                    │
//!                                    ▼
//!                       StoreAdapter(dest).execute ──► RowOutcome
//!                                    │ tally
//!                                    ▼
//!                     SyncResult ──► HistoryStore.append(SyncReport)
//! ```
//!
//! Failures are tiered:
//! - A row that the destination rejects becomes [`RowOutcome::Failed`]; it is
//!   counted in `records_failed` and the loop moves on.
//! - A fault reading the source or reaching the destination becomes a
//!   [`SyncError`]; the transfer stops and the result carries
//!   `success = false` with an error message.
//!
//! Neither tier escapes the public operations as an error: callers always get
//! a [`SyncResult`].
//!
//! # Bidirectional Sync
//!
//! [`SyncEngine::bidirectional_sync`] runs primary→secondary and then
//! secondary→primary, strictly in sequence. The second pass re-reads the rows
//! the first pass inserted, so without uniqueness constraints repeated runs
//! duplicate rows. No deduplication is attempted.

mod engine;
mod result;
mod statement;
pub mod testing;

#[cfg(test)]
mod tests;

pub use engine::{EngineOptions, SyncEngine};
pub use result::{RowOutcome, SyncDirection, SyncError, SyncResult};
pub use statement::{BindMode, InsertStatement, StatementBuilder, StatementError};

// Re-export the history types the engine produces
pub use sync_history::{HistoryStore, SyncReport};
