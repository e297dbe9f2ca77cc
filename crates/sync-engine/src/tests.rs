//! Unit tests for statement generation and result types.

use std::time::Duration;

use chrono::Utc;
use store_adapter::StoreDialect;
use sync_core::{SnapshotValue, TableName};

use crate::result::TransferTally;
use crate::{BindMode, StatementBuilder, StatementError, SyncDirection, SyncError, SyncResult};

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn table(name: &str) -> TableName {
    TableName::new(name).unwrap()
}

// =============================================================================
// Parameterized statements
// =============================================================================

#[test]
fn test_builder_constructors() {
    let builder = StatementBuilder::parameterized(StoreDialect::Oracle);
    assert_eq!(builder.dialect(), StoreDialect::Oracle);
    assert_eq!(builder.mode(), BindMode::Parameterized);

    let builder = StatementBuilder::literal(StoreDialect::MySql);
    assert_eq!(builder.dialect(), StoreDialect::MySql);
    assert_eq!(builder.mode(), BindMode::Literal);
}

#[test]
fn test_mysql_parameterized_insert() {
    let builder = StatementBuilder::parameterized(StoreDialect::MySql);
    let stmt = builder
        .build_insert(
            &table("users"),
            &columns(&["id", "name"]),
            &[SnapshotValue::Int(1), SnapshotValue::text("Ann")],
        )
        .unwrap();

    assert_eq!(stmt.sql, "INSERT INTO users (id, name) VALUES (?, ?)");
    assert_eq!(
        stmt.params,
        vec![SnapshotValue::Int(1), SnapshotValue::text("Ann")]
    );
}

#[test]
fn test_oracle_placeholders_skip_nulls() {
    let builder = StatementBuilder::parameterized(StoreDialect::Oracle);
    let stmt = builder
        .build_insert(
            &table("HR.EMPLOYEES"),
            &columns(&["ID", "MANAGER", "NAME"]),
            &[
                SnapshotValue::Int(10),
                SnapshotValue::Null,
                SnapshotValue::text("Bo"),
            ],
        )
        .unwrap();

    assert_eq!(
        stmt.sql,
        "INSERT INTO HR.EMPLOYEES (ID, MANAGER, NAME) VALUES (:1, NULL, :2)"
    );
    assert_eq!(stmt.params.len(), 2);
}

#[test]
fn test_parameterized_sql_never_contains_value_text() {
    let hostile = "x'); DROP TABLE users; --";
    let builder = StatementBuilder::parameterized(StoreDialect::MySql);
    let stmt = builder
        .build_insert(
            &table("users"),
            &columns(&["note"]),
            &[SnapshotValue::text(hostile)],
        )
        .unwrap();

    assert!(!stmt.sql.contains("DROP"));
    assert_eq!(stmt.params, vec![SnapshotValue::text(hostile)]);
}

#[test]
fn test_all_null_row_has_no_params() {
    let builder = StatementBuilder::parameterized(StoreDialect::MySql);
    let stmt = builder
        .build_insert(
            &table("t"),
            &columns(&["a", "b"]),
            &[SnapshotValue::Null, SnapshotValue::Null],
        )
        .unwrap();

    assert_eq!(stmt.sql, "INSERT INTO t (a, b) VALUES (NULL, NULL)");
    assert!(stmt.params.is_empty());
}

// =============================================================================
// Literal statements
// =============================================================================

#[test]
fn test_literal_escapes_quotes() {
    let builder = StatementBuilder::literal(StoreDialect::Oracle);
    let stmt = builder
        .build_insert(
            &table("t"),
            &columns(&["id", "name"]),
            &[SnapshotValue::Int(3), SnapshotValue::text("O'Brien")],
        )
        .unwrap();

    assert_eq!(stmt.sql, "INSERT INTO t (id, name) VALUES (3, 'O''Brien')");
    assert!(stmt.params.is_empty());
}

#[test]
fn test_literal_mysql_escapes_backslash() {
    let builder = StatementBuilder::literal(StoreDialect::MySql);
    assert_eq!(
        builder.render_literal(&SnapshotValue::text(r"C:\temp")),
        r"'C:\\temp'"
    );
    // Oracle treats backslash literally
    let oracle = StatementBuilder::literal(StoreDialect::Oracle);
    assert_eq!(
        oracle.render_literal(&SnapshotValue::text(r"C:\temp")),
        r"'C:\temp'"
    );
}

#[test]
fn test_literal_binary_and_numbers() {
    let mysql = StatementBuilder::literal(StoreDialect::MySql);
    let oracle = StatementBuilder::literal(StoreDialect::Oracle);
    let bytes = SnapshotValue::Bytes(vec![0xde, 0xad]);

    assert_eq!(mysql.render_literal(&bytes), "X'dead'");
    assert_eq!(oracle.render_literal(&bytes), "HEXTORAW('dead')");
    assert_eq!(mysql.render_literal(&SnapshotValue::UInt(7)), "7");
    assert_eq!(mysql.render_literal(&SnapshotValue::Float(1.5)), "1.5");
    assert_eq!(mysql.render_literal(&SnapshotValue::Null), "NULL");
}

// =============================================================================
// Statement errors
// =============================================================================

#[test]
fn test_build_rejects_empty_columns() {
    let builder = StatementBuilder::parameterized(StoreDialect::MySql);
    assert_eq!(
        builder.build_insert(&table("t"), &[], &[]),
        Err(StatementError::NoColumns)
    );
}

#[test]
fn test_build_rejects_arity_mismatch() {
    let builder = StatementBuilder::parameterized(StoreDialect::MySql);
    let err = builder
        .build_insert(&table("t"), &columns(&["a", "b"]), &[SnapshotValue::Int(1)])
        .unwrap_err();
    assert_eq!(
        err,
        StatementError::ArityMismatch {
            columns: 2,
            values: 1
        }
    );
    assert_eq!(err.to_string(), "row has 1 values for 2 columns");
}

#[test]
fn test_bind_mode_parse() {
    assert_eq!("literal".parse::<BindMode>().unwrap(), BindMode::Literal);
    assert_eq!(
        "Parameterized".parse::<BindMode>().unwrap(),
        BindMode::Parameterized
    );
    assert!("inline".parse::<BindMode>().is_err());
}

// =============================================================================
// Results
// =============================================================================

#[test]
fn test_direction_parse_and_display() {
    assert_eq!("both".parse::<SyncDirection>().unwrap(), SyncDirection::Bidirectional);
    assert_eq!(
        "mysql-to-oracle".parse::<SyncDirection>().unwrap(),
        SyncDirection::Reverse
    );
    assert_eq!(SyncDirection::Forward.to_string(), "forward");
    assert!("sideways".parse::<SyncDirection>().is_err());
}

#[test]
fn test_result_from_transfer_with_error() {
    let tally = TransferTally {
        read: 4,
        written: 1,
        failed: 0,
    };
    let error = SyncError::Cancelled {
        processed: 1,
        total: 4,
    };
    let result = SyncResult::from_transfer(&tally, Some(&error), Duration::from_millis(5), Utc::now());

    assert!(!result.success);
    assert_eq!(result.records_read, 4);
    assert_eq!(
        result.error_message.as_deref(),
        Some("sync cancelled after 1 of 4 rows")
    );
}

#[test]
fn test_combine_prefers_first_error() {
    let now = Utc::now();
    let first = SyncResult::from_transfer(
        &TransferTally::default(),
        Some(&SyncError::DestinationUnavailable {
            store: "mysql".into(),
            message: "refused".into(),
        }),
        Duration::from_millis(2),
        now,
    );
    let second = SyncResult::from_transfer(
        &TransferTally {
            read: 2,
            written: 2,
            failed: 0,
        },
        Some(&SyncError::Cancelled {
            processed: 0,
            total: 0,
        }),
        Duration::from_millis(3),
        now,
    );

    let combined = SyncResult::combine(&first, &second);
    assert!(!combined.success);
    assert_eq!(combined.records_read, 2);
    assert_eq!(combined.records_written, 2);
    assert_eq!(combined.duration, Duration::from_millis(5));
    assert_eq!(
        combined.error_message.as_deref(),
        Some("destination mysql is unavailable: refused")
    );
}

#[test]
fn test_to_report_copies_counts() {
    let result = SyncResult::from_transfer(
        &TransferTally {
            read: 3,
            written: 2,
            failed: 1,
        },
        None,
        Duration::ZERO,
        Utc::now(),
    );
    let report = result.to_report("oracle", "mysql", &table("users"));

    assert_eq!(report.table_name, "users");
    assert_eq!(report.direction(), "oracle -> mysql");
    assert_eq!(
        (report.records_read, report.records_written, report.records_failed),
        (3, 2, 1)
    );
    assert!(report.success);
    assert!(report.error_message.is_none());
}
