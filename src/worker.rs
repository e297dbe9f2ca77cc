//! Periodic sync scheduler.

use std::sync::Arc;
use std::time::Duration;

use sync_core::TableName;
use sync_engine::{SyncDirection, SyncEngine, SyncResult};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditLevel, AuditNotifier};

/// Runs the configured sync for a list of tables on a fixed interval.
///
/// Tables are synced one after another within a tick, so a table is never
/// synced by two ticks at once.
pub struct SyncWorker {
    engine: Arc<SyncEngine>,
    audit: Arc<dyn AuditNotifier>,
    tables: Vec<TableName>,
    direction: SyncDirection,
    interval: Duration,
    cancel: CancellationToken,
}

impl SyncWorker {
    pub fn new(
        engine: Arc<SyncEngine>,
        audit: Arc<dyn AuditNotifier>,
        tables: Vec<TableName>,
        direction: SyncDirection,
        interval: Duration,
    ) -> Self {
        Self {
            engine,
            audit,
            tables,
            direction,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the worker when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Tick until cancelled. The first tick runs immediately.
    ///
    /// Returns the number of completed ticks.
    pub async fn run(&self) -> usize {
        info!(
            "Sync worker started: {} table(s), {} every {:?}",
            self.tables.len(),
            self.direction,
            self.interval
        );
        self.audit(
            AuditEntry::action("WorkerStartup").details(format!(
                "direction={}, interval={:?}, tables={}",
                self.direction,
                self.interval,
                self.table_list()
            )),
        )
        .await;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.run_once().await;
                    ticks += 1;
                }
            }
        }

        info!("Sync worker stopped after {} tick(s)", ticks);
        self.audit(AuditEntry::action("WorkerShutdown").details(format!("ticks={ticks}")))
            .await;
        ticks
    }

    /// Sync every table once, in order.
    pub async fn run_once(&self) -> Vec<SyncResult> {
        let mut results = Vec::with_capacity(self.tables.len());

        for table in &self.tables {
            if self.cancel.is_cancelled() {
                break;
            }

            self.audit(
                AuditEntry::action("SyncStarted")
                    .on(table.as_str())
                    .details(format!("direction={}", self.direction)),
            )
            .await;

            let result = self.engine.run(self.direction, table).await;
            let details = format!(
                "read={}, written={}, failed={}, duration={:?}",
                result.records_read, result.records_written, result.records_failed, result.duration
            );
            let entry = if result.success {
                AuditEntry::action("SyncCompleted").on(table.as_str()).details(details)
            } else {
                let error = result.error_message.as_deref().unwrap_or("unknown error");
                AuditEntry::action("SyncFailed")
                    .on(table.as_str())
                    .level(AuditLevel::Error)
                    .details(format!("{details}, error={error}"))
            };
            self.audit(entry).await;

            results.push(result);
        }

        results
    }

    async fn audit(&self, entry: AuditEntry) {
        let action = entry.action.clone();
        if let Err(e) = self.audit.notify(entry).await {
            warn!("Failed to record audit entry {}: {:#}", action, e);
        }
    }

    fn table_list(&self) -> String {
        self.tables
            .iter()
            .map(TableName::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}
