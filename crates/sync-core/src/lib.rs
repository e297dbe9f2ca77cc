//! Core types for the table-sync framework.
//!
//! This crate provides the engine-agnostic building blocks shared by the
//! store adapters and the sync engine:
//!
//! - [`SnapshotValue`] - An opaque scalar or NULL read from a store
//! - [`RowSnapshot`] - Ordered column names plus ordered rows of values
//! - [`TableName`] - A validated table identifier
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── store-adapter   (query/execute contract returning RowSnapshot)
//!    │      ├─── mysql-store
//!    │      └─── oracle-store
//!    │
//!    └─── sync-engine     (walks RowSnapshot rows into INSERT statements)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sync_core::{RowSnapshot, SnapshotValue};
//!
//! let mut snapshot = RowSnapshot::new(vec!["id".into(), "name".into()]).unwrap();
//! snapshot
//!     .push_row(vec![SnapshotValue::Int(1), SnapshotValue::text("widget")])
//!     .unwrap();
//!
//! assert_eq!(snapshot.len(), 1);
//! ```

pub mod snapshot;
pub mod table;
pub mod values;

pub use snapshot::{RowSnapshot, SnapshotError, SnapshotRow};
pub use table::{TableName, TableNameError};
pub use values::SnapshotValue;
