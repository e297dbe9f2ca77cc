//! Oracle store adapter.
//!
//! [`OracleStore`] implements [`store_adapter::StoreAdapter`] with the
//! blocking `oracle` driver. Each operation opens a session on a blocking
//! worker thread, runs one statement, commits writes, and closes the session.

mod client;
mod value;

pub use client::{OracleConnectOptions, OracleStore};
pub use value::number_from_text;
