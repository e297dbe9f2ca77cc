//! In-memory store adapter for tests.
//!
//! [`MemoryStore`] keeps tables in process memory and understands the
//! statements the engine generates: `SELECT * FROM <table>`, the INSERTs
//! produced by [`crate::StatementBuilder`] in either bind mode, the dialect
//! probe, and `SELECT COUNT(*) FROM <table>`. It can simulate unique keys,
//! rows the destination rejects, and a lost connection.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, bail, Result};
use store_adapter::{StoreAdapter, StoreDialect};
use sync_core::{RowSnapshot, SnapshotValue};

/// Predicate deciding whether an inserted row is rejected.
///
/// Receives the table name, the insert's columns and values; returns the
/// rejection reason.
pub type RejectRule =
    Box<dyn Fn(&str, &[String], &[SnapshotValue]) -> Option<String> + Send + Sync>;

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<SnapshotValue>>,
    unique_key: Option<usize>,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, MemoryTable>,
    unavailable: bool,
    reject_rules: Vec<RejectRule>,
    executed: Vec<String>,
}

/// A `StoreAdapter` backed by in-process tables.
pub struct MemoryStore {
    name: String,
    dialect: StoreDialect,
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>, dialect: StoreDialect) -> Self {
        Self {
            name: name.into(),
            dialect,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Create `table` with `columns` and the given rows.
    pub fn with_table(self, table: &str, columns: &[&str], rows: Vec<Vec<SnapshotValue>>) -> Self {
        self.create_table(table, columns);
        {
            let mut state = self.state();
            if let Some(t) = state.tables.get_mut(table) {
                t.rows = rows;
            }
        }
        self
    }

    /// Create (or replace) an empty table.
    pub fn create_table(&self, table: &str, columns: &[&str]) {
        self.state().tables.insert(
            table.to_string(),
            MemoryTable {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                ..MemoryTable::default()
            },
        );
    }

    /// Reject inserts that duplicate an existing value of `column`.
    pub fn set_unique_key(&self, table: &str, column: &str) {
        let mut state = self.state();
        if let Some(t) = state.tables.get_mut(table) {
            t.unique_key = t.columns.iter().position(|c| c == column);
        }
    }

    /// Reject inserted rows matching `rule`.
    pub fn reject_rows_where(&self, rule: RejectRule) {
        self.state().reject_rules.push(rule);
    }

    /// Make every operation fail as if the connection was lost.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.state()
            .tables
            .get(table)
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }

    pub fn rows(&self, table: &str) -> Vec<Vec<SnapshotValue>> {
        self.state()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Every statement passed to `execute`, in order.
    pub fn executed_statements(&self) -> Vec<String> {
        self.state().executed.clone()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self, state: &MemoryState) -> Result<()> {
        if state.unavailable {
            bail!("connection to {} refused", self.name);
        }
        Ok(())
    }

    fn insert(&self, state: &mut MemoryState, insert: ParsedInsert) -> Result<u64> {
        for rule in &state.reject_rules {
            if let Some(reason) = rule(&insert.table, &insert.columns, &insert.values) {
                bail!("row rejected: {reason}");
            }
        }

        let table = state
            .tables
            .get_mut(&insert.table)
            .ok_or_else(|| anyhow!("table or view {} does not exist", insert.table))?;

        let mut row = vec![SnapshotValue::Null; table.columns.len()];
        for (column, value) in insert.columns.iter().zip(insert.values) {
            let idx = table
                .columns
                .iter()
                .position(|c| c == column)
                .ok_or_else(|| anyhow!("unknown column '{column}' in {}", insert.table))?;
            row[idx] = value;
        }

        if let Some(key) = table.unique_key {
            let existing: HashSet<String> =
                table.rows.iter().map(|r| r[key].to_string()).collect();
            if existing.contains(&row[key].to_string()) {
                bail!(
                    "duplicate entry '{}' for key '{}'",
                    row[key],
                    table.columns[key]
                );
            }
        }

        table.rows.push(row);
        Ok(1)
    }
}

#[async_trait::async_trait]
impl StoreAdapter for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn dialect(&self) -> StoreDialect {
        self.dialect
    }

    async fn query(&self, statement: &str, _params: &[SnapshotValue]) -> Result<RowSnapshot> {
        let state = self.state();
        self.check_available(&state)?;

        let table_name = strip_prefix_ci(statement.trim(), "SELECT * FROM ")
            .map(str::trim)
            .ok_or_else(|| anyhow!("unsupported query: {statement}"))?;
        let table = state
            .tables
            .get(table_name)
            .ok_or_else(|| anyhow!("table or view {table_name} does not exist"))?;

        Ok(RowSnapshot::from_rows(
            table.columns.clone(),
            table.rows.clone(),
        )?)
    }

    async fn execute(&self, statement: &str, params: &[SnapshotValue]) -> Result<u64> {
        let mut state = self.state();
        self.check_available(&state)?;
        state.executed.push(statement.to_string());

        let insert = parse_insert(statement, self.dialect, params)?;
        self.insert(&mut state, insert)
    }

    async fn execute_scalar(
        &self,
        statement: &str,
        _params: &[SnapshotValue],
    ) -> Result<SnapshotValue> {
        let state = self.state();
        self.check_available(&state)?;

        let statement = statement.trim();
        if statement.eq_ignore_ascii_case(self.dialect.probe_statement()) {
            return Ok(SnapshotValue::Int(1));
        }
        if let Some(table) = strip_prefix_ci(statement, "SELECT COUNT(*) FROM ") {
            let table = table.trim();
            let count = state
                .tables
                .get(table)
                .map(|t| t.rows.len())
                .ok_or_else(|| anyhow!("table or view {table} does not exist"))?;
            return Ok(SnapshotValue::Int(count as i64));
        }
        bail!("unsupported scalar query: {statement}")
    }
}

#[derive(Debug)]
struct ParsedInsert {
    table: String,
    columns: Vec<String>,
    values: Vec<SnapshotValue>,
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Parse `INSERT INTO t (a, b) VALUES (x, y)` as generated by the statement
/// builder.
fn parse_insert(sql: &str, dialect: StoreDialect, params: &[SnapshotValue]) -> Result<ParsedInsert> {
    let rest = strip_prefix_ci(sql.trim(), "INSERT INTO ")
        .ok_or_else(|| anyhow!("unsupported statement: {sql}"))?;

    let open = rest
        .find('(')
        .ok_or_else(|| anyhow!("missing column list: {sql}"))?;
    let close = rest[open..]
        .find(')')
        .map(|i| open + i)
        .ok_or_else(|| anyhow!("unterminated column list: {sql}"))?;

    let table = rest[..open].trim().to_string();
    let columns: Vec<String> = rest[open + 1..close]
        .split(',')
        .map(|c| c.trim().to_string())
        .collect();

    let values_part = strip_prefix_ci(rest[close + 1..].trim_start(), "VALUES")
        .map(str::trim)
        .and_then(|v| v.strip_prefix('('))
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| anyhow!("malformed VALUES clause: {sql}"))?;

    let tokens = split_values(values_part, dialect)?;
    if tokens.len() != columns.len() {
        bail!(
            "column count {} does not match value count {}",
            columns.len(),
            tokens.len()
        );
    }

    let mut next_param = 0;
    let mut values = Vec::with_capacity(tokens.len());
    for token in tokens {
        let value = match token.as_str() {
            "?" => {
                let value = params
                    .get(next_param)
                    .cloned()
                    .ok_or_else(|| anyhow!("missing parameter {}", next_param + 1))?;
                next_param += 1;
                value
            }
            t if t.starts_with(':') => {
                let position: usize = t[1..].parse()?;
                params
                    .get(position.wrapping_sub(1))
                    .cloned()
                    .ok_or_else(|| anyhow!("missing parameter {position}"))?
            }
            t => parse_literal(t, dialect)?,
        };
        values.push(value);
    }

    Ok(ParsedInsert {
        table,
        columns,
        values,
    })
}

/// Split a VALUES list on commas outside string literals.
fn split_values(values: &str, dialect: StoreDialect) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = values.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_quote && dialect == StoreDialect::MySql => {
                current.push(ch);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '\'' => {
                in_quote = !in_quote;
                current.push(ch);
            }
            ',' if !in_quote => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if in_quote {
        bail!("unterminated string literal");
    }
    tokens.push(current.trim().to_string());
    Ok(tokens)
}

fn parse_literal(token: &str, dialect: StoreDialect) -> Result<SnapshotValue> {
    if token.eq_ignore_ascii_case("NULL") {
        return Ok(SnapshotValue::Null);
    }
    if let Some(hex) = token
        .strip_prefix("X'")
        .or_else(|| token.strip_prefix("HEXTORAW('"))
    {
        let hex = hex.trim_end_matches(')').trim_end_matches('\'');
        return Ok(SnapshotValue::Bytes(from_hex(hex)?));
    }
    if let Some(inner) = token
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
    {
        return Ok(SnapshotValue::Text(unescape(inner, dialect)));
    }
    if let Ok(i) = token.parse::<i64>() {
        return Ok(SnapshotValue::Int(i));
    }
    if let Ok(u) = token.parse::<u64>() {
        return Ok(SnapshotValue::UInt(u));
    }
    if let Ok(f) = token.parse::<f64>() {
        return Ok(SnapshotValue::Float(f));
    }
    bail!("unsupported literal: {token}")
}

fn unescape(inner: &str, dialect: StoreDialect) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if dialect == StoreDialect::MySql => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                out.push('\'');
            }
            _ => out.push(ch),
        }
    }
    out
}

fn from_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        bail!("odd-length hex literal");
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(Into::into))
        .collect()
}
