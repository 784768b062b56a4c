//! MigrationDriver - the batch processing loop
//!
//! # Flow (per cycle)
//! 1. `TaskStore::take(n)`; an empty batch ends the run cleanly
//! 2. `Migration::start_transaction`
//! 3. `Migration::apply` for every task, at most `n` in flight, all
//!    attempted even if some fail
//! 4. any failure: log every `ErrorRecord`, roll back, stop
//! 5. otherwise mark the batch `Success`, commit, go to 1
//!
//! ```text
//! IDLE -> FETCHING -> (empty) -> DONE
//!         FETCHING -> IN_TRANSACTION -> APPLYING -> ALL_OK -> COMMITTING -> FETCHING
//!                                                -> ANY_FAILED -> ROLLING_BACK -> TERMINATED
//! ```

use std::sync::Arc;

use chrono::Utc;
use futures::{StreamExt, TryStreamExt, future, stream};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::config::DriverConfig;
use super::progress::ProgressReporter;
use crate::domain::{
    BoxError, ErrorRecord, MigrationError, MigrationFailure, MigrationOutcome, MigrationSummary,
    StoreError, Task, TaskStatus, TransactionPhase,
};
use crate::observability::format_elapsed;
use crate::ports::{Migration, TaskStore};

/// Drives a `Migration` over every task in a `TaskStore`.
///
/// At most one transaction is open at a time, and it is always committed
/// or rolled back before the next `take` or before `process` returns.
pub struct MigrationDriver<M, S: ?Sized> {
    migration: Arc<M>,
    store: Arc<S>,
    config: DriverConfig,
}

impl<M, S> MigrationDriver<M, S>
where
    M: Migration,
    S: TaskStore<M::Payload> + ?Sized,
{
    pub fn new(migration: Arc<M>, store: Arc<S>) -> Self {
        Self {
            migration,
            store,
            config: DriverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// `process` with the configured concurrency.
    pub async fn run(&self) -> Result<MigrationOutcome, MigrationError> {
        self.process(self.config.concurrency).await
    }

    /// Run batch cycles until the store is drained or a batch fails.
    ///
    /// A failing batch is not an `Err`: it is rolled back and reported as
    /// `MigrationOutcome::RolledBack`. `Err` means a store call or a
    /// transaction hook failed, `concurrency` was zero, or the config does
    /// not validate. Nothing touches the store in the last two cases.
    ///
    /// If the rollback hook of a failed batch itself fails, the result is
    /// `MigrationError::Transaction { phase: Rollback, .. }`; the batch's
    /// `ErrorRecord`s are then only in the error log line.
    #[instrument(skip(self))]
    pub async fn process(&self, concurrency: usize) -> Result<MigrationOutcome, MigrationError> {
        if concurrency == 0 {
            return Err(MigrationError::InvalidConcurrency(concurrency));
        }
        self.config.validate()?;

        let started = Instant::now();
        let progress = ProgressReporter::spawn(self.config.progress_interval());
        let mut batches: u64 = 0;

        loop {
            let batch = self.store.take(concurrency).await?;
            if batch.is_empty() {
                break;
            }
            let size = batch.len();
            debug!(batch = batches + 1, size, "batch taken");

            self.transaction(TransactionPhase::Start).await?;

            let errors = self.apply_batch(&batch, concurrency).await;
            if !errors.is_empty() {
                error!(
                    batch = batches + 1,
                    failed = errors.len(),
                    errors = %render_errors(&errors),
                    "migration encountered errors, rolling back"
                );
                self.transaction(TransactionPhase::Rollback).await?;

                return Ok(MigrationOutcome::RolledBack(MigrationFailure {
                    processed: progress.processed(),
                    batches_committed: batches,
                    errors,
                }));
            }

            if let Err(err) = self.mark_succeeded(&batch, concurrency).await {
                warn!(error = %err, "marking batch as succeeded failed, rolling back");
                if let Err(rollback_err) = self.transaction(TransactionPhase::Rollback).await {
                    error!(error = %rollback_err, "rollback after store failure also failed");
                }
                return Err(err.into());
            }

            self.transaction(TransactionPhase::Commit).await?;
            batches += 1;
            progress.add(size as u64);
        }

        let elapsed = started.elapsed();
        let processed = progress.processed();
        drop(progress);

        info!(
            elapsed = %format_elapsed(elapsed),
            processed,
            batches,
            "migration finished, {processed} records migrated"
        );

        Ok(MigrationOutcome::Completed(MigrationSummary {
            processed,
            batches,
            elapsed,
            finished_at: Utc::now(),
        }))
    }

    /// Apply every task, `concurrency` at a time. Returns the failures in
    /// batch order.
    async fn apply_batch(
        &self,
        batch: &[Task<M::Payload>],
        concurrency: usize,
    ) -> Vec<ErrorRecord> {
        stream::iter(batch)
            .map(|task| self.apply_one(task))
            .buffered(concurrency)
            .filter_map(|result| future::ready(result.err()))
            .collect()
            .await
    }

    async fn apply_one(&self, task: &Task<M::Payload>) -> Result<(), ErrorRecord> {
        let applied = match self.config.apply_timeout() {
            Some(limit) => {
                match tokio::time::timeout(limit, self.migration.apply(&task.payload)).await {
                    Ok(result) => result,
                    Err(_) => Err(BoxError::from(format!(
                        "apply timed out after {}",
                        format_elapsed(limit)
                    ))),
                }
            }
            None => self.migration.apply(&task.payload).await,
        };

        applied.map_err(|err| {
            debug!(task_id = %task.id, error = %err, "apply failed");
            ErrorRecord::new(task.id.clone(), err)
        })
    }

    async fn mark_succeeded(
        &self,
        batch: &[Task<M::Payload>],
        concurrency: usize,
    ) -> Result<(), StoreError> {
        stream::iter(batch)
            .map(|task| self.store.update(&task.id, TaskStatus::Success))
            .buffer_unordered(concurrency)
            .try_collect::<Vec<()>>()
            .await
            .map(|_| ())
    }

    async fn transaction(&self, phase: TransactionPhase) -> Result<(), MigrationError> {
        let result = match phase {
            TransactionPhase::Start => self.migration.start_transaction().await,
            TransactionPhase::Commit => self.migration.commit_transaction().await,
            TransactionPhase::Rollback => self.migration.rollback_transaction().await,
        };
        result.map_err(|source| MigrationError::transaction(phase, source))
    }
}

fn render_errors(errors: &[ErrorRecord]) -> String {
    serde_json::to_string_pretty(errors).unwrap_or_else(|_| format!("{errors:?}"))
}
