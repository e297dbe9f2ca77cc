//! Conversion between `mysql_async::Value` and `SnapshotValue`.
//!
//! MySQL's text and binary protocols both deliver strings, decimals and
//! blobs as `Value::Bytes`. Bytes that are valid UTF-8 become
//! [`SnapshotValue::Text`]; anything else stays binary. Temporal values are
//! rendered in MySQL's own literal format so they can be written back as
//! text into either dialect.

use mysql_async::Value;
use sync_core::SnapshotValue;

/// Convert a value read from MySQL.
pub fn from_mysql_value(value: Value) -> SnapshotValue {
    match value {
        Value::NULL => SnapshotValue::Null,
        Value::Int(i) => SnapshotValue::Int(i),
        Value::UInt(u) => SnapshotValue::UInt(u),
        Value::Float(f) => SnapshotValue::Float(f as f64),
        Value::Double(f) => SnapshotValue::Float(f),
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => SnapshotValue::Text(s),
            Err(e) => SnapshotValue::Bytes(e.into_bytes()),
        },
        Value::Date(year, month, day, hour, minute, second, micros) => {
            SnapshotValue::Text(format_date(year, month, day, hour, minute, second, micros))
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            SnapshotValue::Text(format_time(negative, days, hours, minutes, seconds, micros))
        }
    }
}

/// Convert a value bound as a statement parameter.
pub fn to_mysql_value(value: &SnapshotValue) -> Value {
    match value {
        SnapshotValue::Null => Value::NULL,
        SnapshotValue::Int(i) => Value::Int(*i),
        SnapshotValue::UInt(u) => Value::UInt(*u),
        SnapshotValue::Float(f) => Value::Double(*f),
        SnapshotValue::Text(s) => Value::Bytes(s.clone().into_bytes()),
        SnapshotValue::Bytes(b) => Value::Bytes(b.clone()),
    }
}

pub fn to_mysql_params(values: &[SnapshotValue]) -> Vec<Value> {
    values.iter().map(to_mysql_value).collect()
}

fn format_date(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micros: u32,
) -> String {
    // DATE columns arrive with a zero time part
    if hour == 0 && minute == 0 && second == 0 && micros == 0 {
        return format!("{year:04}-{month:02}-{day:02}");
    }
    let mut out = format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}");
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

fn format_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let total_hours = days * 24 + hours as u32;
    let sign = if negative { "-" } else { "" };
    let mut out = format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}");
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_bytes_become_text() {
        assert_eq!(
            from_mysql_value(Value::Bytes(b"hello".to_vec())),
            SnapshotValue::text("hello")
        );
        assert_eq!(
            from_mysql_value(Value::Bytes(vec![0xff, 0x00])),
            SnapshotValue::Bytes(vec![0xff, 0x00])
        );
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(from_mysql_value(Value::NULL), SnapshotValue::Null);
        assert_eq!(from_mysql_value(Value::Int(-4)), SnapshotValue::Int(-4));
        assert_eq!(from_mysql_value(Value::UInt(u64::MAX)), SnapshotValue::UInt(u64::MAX));
        assert_eq!(from_mysql_value(Value::Float(0.5)), SnapshotValue::Float(0.5));
        assert_eq!(from_mysql_value(Value::Double(2.25)), SnapshotValue::Float(2.25));
    }

    #[test]
    fn test_temporal_values() {
        assert_eq!(
            from_mysql_value(Value::Date(2024, 3, 9, 0, 0, 0, 0)),
            SnapshotValue::text("2024-03-09")
        );
        assert_eq!(
            from_mysql_value(Value::Date(2024, 3, 9, 14, 5, 0, 120)),
            SnapshotValue::text("2024-03-09 14:05:00.000120")
        );
        assert_eq!(
            from_mysql_value(Value::Time(true, 1, 2, 3, 4, 0)),
            SnapshotValue::text("-26:03:04")
        );
    }

    #[test]
    fn test_params() {
        let params = to_mysql_params(&[
            SnapshotValue::text("a"),
            SnapshotValue::Null,
            SnapshotValue::Float(1.0),
        ]);
        assert_eq!(
            params,
            vec![Value::Bytes(b"a".to_vec()), Value::NULL, Value::Double(1.0)]
        );
    }
}
