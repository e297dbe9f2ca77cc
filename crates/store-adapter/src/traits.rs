//! StoreAdapter trait definition.
//!
//! This trait is the minimal capability each backing store exposes to the
//! sync engine: run a query and get a snapshot back, run a mutating
//! statement and get an affected-row count, run a scalar query.

use crate::StoreDialect;
use anyhow::Result;
use std::sync::Arc;
use sync_core::{RowSnapshot, SnapshotValue};

/// Trait for reading from and writing to a relational store.
///
/// Statements are SQL text in the store's dialect. `params` are bound
/// positionally to the placeholders the dialect uses (`?` for MySQL,
/// `:1`, `:2`, ... for Oracle). Any error returned is treated by the engine
/// as "operation failed"; engine-specific error codes are never inspected.
///
/// # Usage Pattern
///
/// ```ignore
/// let snapshot = source.query("SELECT * FROM products", &[]).await?;
/// for row in snapshot.iter() {
///     dest.execute("INSERT INTO products (id) VALUES (?)", row.values()).await?;
/// }
/// ```
#[async_trait::async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Human readable store name used in logs and sync reports
    /// (e.g. "Oracle", "MySQL").
    fn name(&self) -> &str;

    /// SQL dialect of this store.
    fn dialect(&self) -> StoreDialect;

    /// Run a query and collect its full result set.
    async fn query(&self, statement: &str, params: &[SnapshotValue]) -> Result<RowSnapshot>;

    /// Run a mutating statement and return the number of affected rows.
    async fn execute(&self, statement: &str, params: &[SnapshotValue]) -> Result<u64>;

    /// Run a query and return the first column of the first row,
    /// or `SnapshotValue::Null` when the result is empty.
    async fn execute_scalar(
        &self,
        statement: &str,
        params: &[SnapshotValue],
    ) -> Result<SnapshotValue>;
}

#[async_trait::async_trait]
impl<T: StoreAdapter + ?Sized> StoreAdapter for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn dialect(&self) -> StoreDialect {
        (**self).dialect()
    }

    async fn query(&self, statement: &str, params: &[SnapshotValue]) -> Result<RowSnapshot> {
        (**self).query(statement, params).await
    }

    async fn execute(&self, statement: &str, params: &[SnapshotValue]) -> Result<u64> {
        (**self).execute(statement, params).await
    }

    async fn execute_scalar(
        &self,
        statement: &str,
        params: &[SnapshotValue],
    ) -> Result<SnapshotValue> {
        (**self).execute_scalar(statement, params).await
    }
}
