//! Validated table identifiers.
//!
//! Table names are interpolated into `SELECT * FROM <table>` and
//! `INSERT INTO <table>` without identifier quoting, so only plain
//! identifiers (optionally schema-qualified) are accepted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when validating a table name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableNameError {
    #[error("table name must not be empty")]
    Empty,

    #[error("table name '{name}' contains invalid character {ch:?}")]
    InvalidCharacter { name: String, ch: char },

    #[error("table name '{0}' has an empty schema or table part")]
    EmptyPart(String),
}

/// A table name that is safe to place in generated SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Validate and wrap a table name.
    ///
    /// Accepts ASCII letters, digits, `_`, `$`, `#` and a single `.` between
    /// a schema and a table part.
    pub fn new(name: impl Into<String>) -> Result<Self, TableNameError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TableNameError::Empty);
        }

        if let Some(ch) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#' | '.')))
        {
            return Err(TableNameError::InvalidCharacter {
                name: trimmed.to_string(),
                ch,
            });
        }

        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() > 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(TableNameError::EmptyPart(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for TableName {
    type Err = TableNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TableName {
    type Error = TableNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TableName> for String {
    fn from(value: TableName) -> Self {
        value.0
    }
}
