use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use store_adapter::StoreAdapter;
use sync_core::{SnapshotRow, TableName};
use sync_history::{HistoryStore, SyncReport};
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, warn, Dispatch, Instrument, Span};

use crate::result::{RowOutcome, SyncDirection, SyncError, SyncResult, TransferTally};
use crate::statement::{BindMode, StatementBuilder};

/// Tunables for the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// How row values are placed into INSERT statements
    pub bind_mode: BindMode,
    /// Run the dialect probe statement against the destination before
    /// writing rows
    pub probe_destination: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            bind_mode: BindMode::Parameterized,
            probe_destination: true,
        }
    }
}

/// Copies whole tables between a primary and a secondary store.
///
/// Rows within a transfer are written one at a time and the two legs of a
/// bidirectional sync never overlap. Separate calls (for example for
/// different tables) may run concurrently; the engine holds no lock across
/// calls, so callers that need one sync per table at a time must serialize
/// them themselves.
pub struct SyncEngine {
    primary: Arc<dyn StoreAdapter>,
    secondary: Arc<dyn StoreAdapter>,
    history: Arc<dyn HistoryStore>,
    options: EngineOptions,
    dispatch: Option<Dispatch>,
    span: Span,
    cancel: CancellationToken,
}

impl SyncEngine {
    /// Create an engine over a primary (Oracle-family) and secondary
    /// (MySQL-family) store.
    pub fn new(
        primary: Arc<dyn StoreAdapter>,
        secondary: Arc<dyn StoreAdapter>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            primary,
            secondary,
            history,
            options: EngineOptions::default(),
            dispatch: None,
            span: Span::none(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Route all diagnostics of this engine to `dispatch` instead of the
    /// ambient default subscriber.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Parent span for the spans the engine opens per transfer.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Stop transfers between rows once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn primary(&self) -> &Arc<dyn StoreAdapter> {
        &self.primary
    }

    pub fn secondary(&self) -> &Arc<dyn StoreAdapter> {
        &self.secondary
    }

    /// Copy every row of `table` from `source` into `dest`.
    ///
    /// Always returns a result and always appends exactly one report to the
    /// history, whether the transfer succeeded or not.
    pub async fn sync_directional(
        &self,
        source: &dyn StoreAdapter,
        dest: &dyn StoreAdapter,
        table: &TableName,
    ) -> SyncResult {
        self.dispatched(self.directional(source, dest, table))
            .await
    }

    /// Primary to secondary.
    pub async fn sync_forward(&self, table: &TableName) -> SyncResult {
        self.sync_directional(self.primary.as_ref(), self.secondary.as_ref(), table)
            .await
    }

    /// Secondary to primary.
    pub async fn sync_reverse(&self, table: &TableName) -> SyncResult {
        self.sync_directional(self.secondary.as_ref(), self.primary.as_ref(), table)
            .await
    }

    /// Forward then reverse, strictly in sequence.
    ///
    /// The reverse leg reads what the forward leg just wrote. Two reports are
    /// appended to the history, one per leg.
    pub async fn bidirectional_sync(&self, table: &TableName) -> SyncResult {
        self.dispatched(async {
            info!("Starting bidirectional sync for table: {}", table);

            let forward = self
                .directional(self.primary.as_ref(), self.secondary.as_ref(), table)
                .await;
            let reverse = self
                .directional(self.secondary.as_ref(), self.primary.as_ref(), table)
                .await;

            let combined = SyncResult::combine(&forward, &reverse);
            info!("Bidirectional sync for table {} {}", table, combined);
            combined
        })
        .await
    }

    /// Run the sync for `direction`.
    pub async fn run(&self, direction: SyncDirection, table: &TableName) -> SyncResult {
        match direction {
            SyncDirection::Forward => self.sync_forward(table).await,
            SyncDirection::Reverse => self.sync_reverse(table).await,
            SyncDirection::Bidirectional => self.bidirectional_sync(table).await,
        }
    }

    /// All retained reports, most recent first.
    pub async fn history(&self) -> anyhow::Result<Vec<SyncReport>> {
        self.history.all().await
    }

    async fn dispatched<F: Future>(&self, fut: F) -> F::Output {
        match &self.dispatch {
            Some(dispatch) => fut.with_subscriber(dispatch.clone()).await,
            None => fut.await,
        }
    }

    async fn directional(
        &self,
        source: &dyn StoreAdapter,
        dest: &dyn StoreAdapter,
        table: &TableName,
    ) -> SyncResult {
        let span = tracing::info_span!(
            parent: &self.span,
            "sync",
            table = %table,
            source = source.name(),
            destination = dest.name()
        );

        async {
            let sync_time = Utc::now();
            let started = Instant::now();

            info!(
                "Starting sync from {} to {} for table: {}",
                source.name(),
                dest.name(),
                table
            );

            let mut tally = TransferTally::default();
            let outcome = self.transfer(source, dest, table, &mut tally).await;
            let result = SyncResult::from_transfer(
                &tally,
                outcome.as_ref().err(),
                started.elapsed(),
                sync_time,
            );

            match &outcome {
                Ok(()) => info!(
                    "Sync completed successfully: {} records written, {} failed in {:?}",
                    result.records_written, result.records_failed, result.duration
                ),
                Err(e) => error!(
                    "Sync from {} to {} failed: {}",
                    source.name(),
                    dest.name(),
                    e
                ),
            }

            self.record(result.to_report(source.name(), dest.name(), table))
                .await;
            result
        }
        .instrument(span)
        .await
    }

    async fn transfer(
        &self,
        source: &dyn StoreAdapter,
        dest: &dyn StoreAdapter,
        table: &TableName,
        tally: &mut TransferTally,
    ) -> Result<(), SyncError> {
        let query = format!("SELECT * FROM {table}");
        let snapshot = source
            .query(&query, &[])
            .await
            .map_err(|e| SyncError::SourceRead {
                store: source.name().to_string(),
                table: table.to_string(),
                message: format!("{e:#}"),
            })?;
        tally.read = snapshot.len();

        info!("Read {} records from {}", tally.read, source.name());

        if self.options.probe_destination {
            dest.execute_scalar(dest.dialect().probe_statement(), &[])
                .await
                .map_err(|e| SyncError::DestinationUnavailable {
                    store: dest.name().to_string(),
                    message: format!("{e:#}"),
                })?;
        }

        let builder = StatementBuilder::new(dest.dialect(), self.options.bind_mode);

        for row in snapshot.iter() {
            if self.cancel.is_cancelled() {
                return Err(SyncError::Cancelled {
                    processed: row.index,
                    total: tally.read,
                });
            }

            match write_row(&builder, dest, table, row).await {
                RowOutcome::Written => tally.written += 1,
                RowOutcome::Failed { reason } => {
                    warn!(
                        "Failed to sync record {} of {} from {} to {}: {}",
                        row.index + 1,
                        tally.read,
                        source.name(),
                        dest.name(),
                        reason
                    );
                    tally.failed += 1;
                }
            }
        }

        Ok(())
    }

    async fn record(&self, report: SyncReport) {
        if let Err(e) = self.history.append(report).await {
            // Losing a history entry must not mask the transfer outcome
            error!("Failed to append sync report to history: {e:#}");
        }
    }
}

/// Build and execute the INSERT for one row.
async fn write_row(
    builder: &StatementBuilder,
    dest: &dyn StoreAdapter,
    table: &TableName,
    row: SnapshotRow<'_>,
) -> RowOutcome {
    let statement = match builder.build_insert(table, row.columns(), row.values()) {
        Ok(statement) => statement,
        Err(e) => {
            return RowOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    match dest.execute(&statement.sql, &statement.params).await {
        Ok(affected) => {
            debug!("Inserted record {} ({} rows affected)", row.index + 1, affected);
            RowOutcome::Written
        }
        Err(e) => RowOutcome::Failed {
            reason: format!("{e:#}"),
        },
    }
}
