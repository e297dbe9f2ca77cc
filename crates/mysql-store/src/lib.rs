//! MySQL store adapter.
//!
//! [`MySqlStore`] implements [`store_adapter::StoreAdapter`] over a
//! `mysql_async` connection pool. Every operation checks out a connection
//! from the pool and returns it when done.
//!
//! Values are converted between `mysql_async::Value` and
//! [`sync_core::SnapshotValue`] in [`value`].

mod client;
pub mod testing;
pub mod value;

pub use client::{sanitize_connection_string, MySqlStore};
