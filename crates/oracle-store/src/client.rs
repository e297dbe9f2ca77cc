//! Session-per-call Oracle adapter.

use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use oracle::sql_type::ToSql;
use oracle::Connection;
use serde::{Deserialize, Serialize};
use store_adapter::{StoreAdapter, StoreDialect};
use sync_core::{RowSnapshot, SnapshotValue};
use tracing::debug;

use crate::value::{from_oracle_row, to_oracle_params};

/// Credentials and connect string for an Oracle session.
#[derive(Clone, Serialize, Deserialize)]
pub struct OracleConnectOptions {
    pub user: String,
    pub password: String,
    /// Easy Connect string or TNS alias, e.g. `localhost:1521/FREEPDB1`
    pub connect_string: String,
}

// Keep the password out of logs
impl fmt::Debug for OracleConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConnectOptions")
            .field("user", &self.user)
            .field("password", &"***")
            .field("connect_string", &self.connect_string)
            .finish()
    }
}

impl fmt::Display for OracleConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.connect_string)
    }
}

/// Oracle-family store.
pub struct OracleStore {
    name: String,
    options: OracleConnectOptions,
}

impl OracleStore {
    pub fn new(name: impl Into<String>, options: OracleConnectOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    pub fn options(&self) -> &OracleConnectOptions {
        &self.options
    }

    /// Run `op` against a fresh session on a blocking thread.
    async fn with_session<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let options = self.options.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::connect(&options.user, &options.password, &options.connect_string)
                .with_context(|| format!("Failed to connect to Oracle at '{options}'"))?;
            let result = op(&conn);
            if let Err(e) = conn.close() {
                debug!("Failed to close Oracle session: {}", e);
            }
            result
        })
        .await?
    }
}

fn param_refs(params: &[Box<dyn ToSql + Send>]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p.as_ref() as &dyn ToSql).collect()
}

#[async_trait]
impl StoreAdapter for OracleStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn dialect(&self) -> StoreDialect {
        StoreDialect::Oracle
    }

    async fn query(&self, statement: &str, values: &[SnapshotValue]) -> Result<RowSnapshot> {
        debug!("Executing query on {}: {}", self.name, statement);
        let sql = statement.to_string();
        let params = to_oracle_params(values);

        self.with_session(move |conn| {
            let refs = param_refs(&params);
            let result_set = conn.query(&sql, &refs)?;
            let columns: Vec<String> = result_set
                .column_info()
                .iter()
                .map(|c| c.name().to_string())
                .collect();

            let mut snapshot = RowSnapshot::new(columns)?;
            for row in result_set {
                snapshot.push_row(from_oracle_row(&row?)?)?;
            }
            Ok(snapshot)
        })
        .await
    }

    async fn execute(&self, statement: &str, values: &[SnapshotValue]) -> Result<u64> {
        let sql = statement.to_string();
        let params = to_oracle_params(values);

        self.with_session(move |conn| {
            let refs = param_refs(&params);
            let stmt = conn.execute(&sql, &refs)?;
            let affected = stmt.row_count()?;
            conn.commit()?;
            Ok(affected)
        })
        .await
    }

    async fn execute_scalar(
        &self,
        statement: &str,
        values: &[SnapshotValue],
    ) -> Result<SnapshotValue> {
        let sql = statement.to_string();
        let params = to_oracle_params(values);

        self.with_session(move |conn| {
            let refs = param_refs(&params);
            let mut rows = conn.query(&sql, &refs)?;
            match rows.next() {
                Some(row) => Ok(from_oracle_row(&row?)?
                    .into_iter()
                    .next()
                    .unwrap_or(SnapshotValue::Null)),
                None => Ok(SnapshotValue::Null),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> OracleConnectOptions {
        OracleConnectOptions {
            user: "system".into(),
            password: "hunter2".into(),
            connect_string: "localhost:1521/FREEPDB1".into(),
        }
    }

    #[test]
    fn test_debug_hides_password() {
        let debug = format!("{:?}", options());
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("FREEPDB1"));
    }

    #[test]
    fn test_display_is_user_at_connect_string() {
        assert_eq!(options().to_string(), "system@localhost:1521/FREEPDB1");
    }

    #[test]
    fn test_store_identity() {
        let store = OracleStore::new("oracle", options());
        assert_eq!(store.name(), "oracle");
        assert_eq!(store.dialect(), StoreDialect::Oracle);
    }
}
