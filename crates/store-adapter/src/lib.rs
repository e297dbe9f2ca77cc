//! Store adapter trait abstraction.
//!
//! This crate defines the `StoreAdapter` trait that abstracts over the
//! backing relational engines. Both `oracle-store` and `mysql-store`
//! implement this trait, allowing the sync engine to be written once against
//! a single interface.
//!
//! The trait uses sync-core types (`RowSnapshot`, `SnapshotValue`) so the
//! engine never touches driver-specific row or value types.

mod dialect;
mod traits;

pub use dialect::StoreDialect;
pub use traits::StoreAdapter;
