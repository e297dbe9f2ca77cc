//! In-memory snapshot of a query result.
//!
//! A [`RowSnapshot`] is created fresh by a store query, walked once by the
//! sync engine and then dropped. Every row has exactly as many values as the
//! snapshot has columns; the constructors enforce it.

use crate::values::SnapshotValue;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while building a snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The same column name appeared twice
    #[error("duplicate column '{0}' in snapshot")]
    DuplicateColumn(String),

    /// A row did not match the column list
    #[error("row {row} has {actual} values but the snapshot has {expected} columns")]
    ArityMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Ordered column names plus ordered rows of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSnapshot {
    columns: Vec<String>,
    rows: Vec<Vec<SnapshotValue>>,
}

impl RowSnapshot {
    /// Create an empty snapshot with the given columns.
    pub fn new(columns: Vec<String>) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SnapshotError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a snapshot from columns and rows in one go.
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<Vec<SnapshotValue>>,
    ) -> Result<Self, SnapshotError> {
        let mut snapshot = Self::new(columns)?;
        snapshot.rows.reserve(rows.len());
        for row in rows {
            snapshot.push_row(row)?;
        }
        Ok(snapshot)
    }

    /// Append a row, checking it against the column list.
    pub fn push_row(&mut self, row: Vec<SnapshotValue>) -> Result<(), SnapshotError> {
        if row.len() != self.columns.len() {
            return Err(SnapshotError::ArityMismatch {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<SnapshotValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows together with the column list they are aligned to.
    pub fn iter(&self) -> impl Iterator<Item = SnapshotRow<'_>> {
        self.rows.iter().enumerate().map(|(index, values)| SnapshotRow {
            index,
            columns: &self.columns,
            values,
        })
    }
}

/// A borrowed view of one snapshot row.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotRow<'a> {
    /// Zero-based position of the row in the snapshot
    pub index: usize,
    columns: &'a [String],
    values: &'a [SnapshotValue],
}

impl<'a> SnapshotRow<'a> {
    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn values(&self) -> &'a [SnapshotValue] {
        self.values
    }

    /// Look up a value by column name.
    pub fn get(&self, column: &str) -> Option<&'a SnapshotValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = RowSnapshot::new(columns(&["id", "name", "id"])).unwrap_err();
        assert_eq!(err, SnapshotError::DuplicateColumn("id".to_string()));
    }

    #[test]
    fn test_arity_enforced() {
        let mut snapshot = RowSnapshot::new(columns(&["id", "name"])).unwrap();
        snapshot
            .push_row(vec![SnapshotValue::Int(1), SnapshotValue::Null])
            .unwrap();

        let err = snapshot.push_row(vec![SnapshotValue::Int(2)]).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::ArityMismatch {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_iter_preserves_order() {
        let snapshot = RowSnapshot::from_rows(
            columns(&["id", "name"]),
            vec![
                vec![SnapshotValue::Int(1), SnapshotValue::text("a")],
                vec![SnapshotValue::Int(2), SnapshotValue::text("b")],
            ],
        )
        .unwrap();

        let rows: Vec<_> = snapshot.iter().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[1].get("name"), Some(&SnapshotValue::text("b")));
        assert_eq!(rows[1].get("missing"), None);
        assert_eq!(rows[0].columns(), snapshot.columns());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = RowSnapshot::new(columns(&["id"])).unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.iter().count(), 0);
    }
}
