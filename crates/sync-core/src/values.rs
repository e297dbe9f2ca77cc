//! Value representation for rows read from a store.
//!
//! The sync engine never interprets column types. A value is either NULL or
//! an opaque scalar that keeps the representation the driver handed back, so
//! it can be bound as a statement parameter or rendered as a literal.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A single column value inside a [`crate::RowSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotValue {
    /// SQL NULL
    Null,

    /// Signed integer as reported by the driver
    Int(i64),

    /// Unsigned integer as reported by the driver
    UInt(u64),

    /// Floating point value
    Float(f64),

    /// Textual value (also used for dates, decimals and anything the
    /// driver reports as a string)
    Text(String),

    /// Raw bytes that are not valid UTF-8
    Bytes(Vec<u8>),
}

impl SnapshotValue {
    /// Create a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render the value in its textual form.
    ///
    /// Returns `None` for NULL. Byte values are rendered as lowercase hex.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Int(i) => Some(Cow::Owned(i.to_string())),
            Self::UInt(u) => Some(Cow::Owned(u.to_string())),
            Self::Float(f) => Some(Cow::Owned(f.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s)),
            Self::Bytes(b) => Some(Cow::Owned(to_hex(b))),
        }
    }
}

impl fmt::Display for SnapshotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("NULL"),
        }
    }
}

impl From<i64> for SnapshotValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for SnapshotValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SnapshotValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<SnapshotValue>> From<Option<T>> for SnapshotValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Lowercase hex encoding used for byte values.
pub fn to_hex(bytes: &[u8]) -> String {
    use fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing into a String cannot fail
        let _ = write!(out, "{b:02x}");
    }
    out
}
