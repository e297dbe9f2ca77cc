//! INSERT statement generation.
//!
//! Turns one snapshot row into an INSERT for the destination dialect.
//! Column order follows the snapshot. NULL is always written inline as the
//! dialect's NULL literal; every other value is either bound through a
//! placeholder ([`BindMode::Parameterized`], the default) or rendered as an
//! escaped literal ([`BindMode::Literal`]).
//!
//! Identifiers are not quoted or validated here. Table names are validated by
//! [`TableName`]; column names come from the source store's own metadata.

use serde::{Deserialize, Serialize};
use store_adapter::StoreDialect;
use sync_core::{SnapshotValue, TableName};
use thiserror::Error;

/// How non-null values are placed into generated statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Emit placeholders and pass values as statement parameters.
    #[default]
    Parameterized,

    /// Render values as escaped SQL literals. Compatibility fallback for
    /// drivers that cannot bind parameters.
    Literal,
}

impl std::fmt::Display for BindMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parameterized => write!(f, "parameterized"),
            Self::Literal => write!(f, "literal"),
        }
    }
}

impl std::str::FromStr for BindMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parameterized" | "params" => Ok(Self::Parameterized),
            "literal" => Ok(Self::Literal),
            _ => Err(anyhow::anyhow!(
                "Invalid bind mode: '{s}'. Expected 'parameterized' or 'literal'"
            )),
        }
    }
}

/// Errors raised while building a statement for a single row.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatementError {
    #[error("cannot build an INSERT without columns")]
    NoColumns,

    #[error("row has {values} values for {columns} columns")]
    ArityMismatch { columns: usize, values: usize },
}

/// SQL text plus the parameters bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub sql: String,
    pub params: Vec<SnapshotValue>,
}

/// Builds INSERT statements for one destination dialect.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder {
    dialect: StoreDialect,
    mode: BindMode,
}

impl StatementBuilder {
    pub fn new(dialect: StoreDialect, mode: BindMode) -> Self {
        Self { dialect, mode }
    }

    /// Builder that binds values through placeholders.
    pub fn parameterized(dialect: StoreDialect) -> Self {
        Self::new(dialect, BindMode::Parameterized)
    }

    /// Builder that renders values as literals.
    pub fn literal(dialect: StoreDialect) -> Self {
        Self::new(dialect, BindMode::Literal)
    }

    pub fn dialect(&self) -> StoreDialect {
        self.dialect
    }

    pub fn mode(&self) -> BindMode {
        self.mode
    }

    /// Build `INSERT INTO <table> (<columns>) VALUES (<values>)` for one row.
    pub fn build_insert(
        &self,
        table: &TableName,
        columns: &[String],
        values: &[SnapshotValue],
    ) -> Result<InsertStatement, StatementError> {
        if columns.is_empty() {
            return Err(StatementError::NoColumns);
        }
        if columns.len() != values.len() {
            return Err(StatementError::ArityMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        let mut params = Vec::new();
        let rendered: Vec<String> = values
            .iter()
            .map(|value| match (self.mode, value) {
                (_, SnapshotValue::Null) => self.dialect.null_literal().to_string(),
                (BindMode::Parameterized, value) => {
                    params.push(value.clone());
                    self.dialect.placeholder(params.len())
                }
                (BindMode::Literal, value) => self.render_literal(value),
            })
            .collect();

        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            rendered.join(", ")
        );

        Ok(InsertStatement { sql, params })
    }

    /// Render a single value as a literal of this builder's dialect.
    pub fn render_literal(&self, value: &SnapshotValue) -> String {
        match value {
            SnapshotValue::Null => self.dialect.null_literal().to_string(),
            SnapshotValue::Int(i) => i.to_string(),
            SnapshotValue::UInt(u) => u.to_string(),
            SnapshotValue::Float(f) if f.is_finite() => f.to_string(),
            SnapshotValue::Float(f) => self.dialect.quote_text(&f.to_string()),
            SnapshotValue::Text(s) => self.dialect.quote_text(s),
            SnapshotValue::Bytes(b) => self.dialect.binary_literal(&sync_core::values::to_hex(b)),
        }
    }
}
