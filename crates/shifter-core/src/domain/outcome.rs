//! Outcome of a `MigrationDriver::process` run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use super::ErrorRecord;

/// How a run ended when no fatal error occurred.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// Every batch committed; the store returned an empty batch.
    Completed(MigrationSummary),
    /// A batch had failing items and was rolled back. Nothing after it ran.
    RolledBack(MigrationFailure),
}

impl MigrationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MigrationOutcome::Completed(_))
    }

    /// Tasks marked SUCCESS in committed batches.
    pub fn processed(&self) -> u64 {
        match self {
            MigrationOutcome::Completed(summary) => summary.processed,
            MigrationOutcome::RolledBack(failure) => failure.processed,
        }
    }

    /// Errors of the rolled-back batch (empty on success).
    pub fn errors(&self) -> &[ErrorRecord] {
        match self {
            MigrationOutcome::Completed(_) => &[],
            MigrationOutcome::RolledBack(failure) => &failure.errors,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationSummary {
    pub processed: u64,
    pub batches: u64,
    pub elapsed: Duration,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationFailure {
    /// Tasks committed before the failing batch.
    pub processed: u64,
    pub batches_committed: u64,
    pub errors: Vec<ErrorRecord>,
}
