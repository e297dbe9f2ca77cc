//! Conversion between Oracle column values and `SnapshotValue`.
//!
//! Oracle NUMBER has no fixed binary width, so numeric columns are fetched as
//! text and narrowed with [`number_from_text`]. RAW and BLOB columns are
//! fetched as bytes; everything else as text.

use anyhow::Result;
use oracle::sql_type::{OracleType, ToSql};
use oracle::Row;
use sync_core::SnapshotValue;

pub(crate) fn to_oracle_params(values: &[SnapshotValue]) -> Vec<Box<dyn ToSql + Send>> {
    values
        .iter()
        .map(|value| -> Box<dyn ToSql + Send> {
            match value {
                SnapshotValue::Null => Box::new(Option::<String>::None),
                SnapshotValue::Int(i) => Box::new(*i),
                SnapshotValue::UInt(u) => Box::new(*u),
                SnapshotValue::Float(f) => Box::new(*f),
                SnapshotValue::Text(s) => Box::new(s.clone()),
                SnapshotValue::Bytes(b) => Box::new(b.clone()),
            }
        })
        .collect()
}

pub(crate) fn from_oracle_row(row: &Row) -> Result<Vec<SnapshotValue>> {
    let mut values = Vec::with_capacity(row.sql_values().len());
    for (idx, sql_value) in row.sql_values().iter().enumerate() {
        let value = match sql_value.oracle_type()? {
            OracleType::Raw(_) | OracleType::LongRaw | OracleType::BLOB => row
                .get::<_, Option<Vec<u8>>>(idx)?
                .map(SnapshotValue::Bytes),
            OracleType::Number(_, _)
            | OracleType::Float(_)
            | OracleType::BinaryFloat
            | OracleType::BinaryDouble
            | OracleType::Int64
            | OracleType::UInt64 => row
                .get::<_, Option<String>>(idx)?
                .map(|s| number_from_text(&s)),
            _ => row
                .get::<_, Option<String>>(idx)?
                .map(SnapshotValue::Text),
        };
        values.push(value.unwrap_or(SnapshotValue::Null));
    }
    Ok(values)
}

/// Narrow the text form of an Oracle number to the tightest value type.
///
/// Integers that fit 64 bits stay exact; other numbers become floats when
/// that is lossless for their text, and text otherwise.
pub fn number_from_text(text: &str) -> SnapshotValue {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return SnapshotValue::Int(i);
    }
    if let Ok(u) = text.parse::<u64>() {
        return SnapshotValue::UInt(u);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && text.len() <= 15 => SnapshotValue::Float(f),
        _ => SnapshotValue::Text(text.to_string()),
    }
}
