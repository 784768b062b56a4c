//! Errors - failure taxonomy
//!
//! - Per-item application failures are *data*: they become [`ErrorRecord`]s
//!   and end the run with a rollback, never an `Err`.
//! - Store and transaction-hook failures are fatal and surface as
//!   [`MigrationError`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TaskId;
use crate::app::ConfigError;

/// Error type returned by caller-supplied hooks (`apply`, transactions).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A task identity paired with the error its application raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub task_id: TaskId,
    pub error: String,
}

impl ErrorRecord {
    pub fn new(task_id: TaskId, error: impl fmt::Display) -> Self {
        Self {
            task_id,
            error: error.to_string(),
        }
    }
}

/// TaskStore failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task already exists: {0}")]
    DuplicateTask(TaskId),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Which transaction hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPhase {
    Start,
    Commit,
    Rollback,
}

impl fmt::Display for TransactionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionPhase::Start => "start",
            TransactionPhase::Commit => "commit",
            TransactionPhase::Rollback => "rollback",
        };
        f.write_str(s)
    }
}

/// Fatal driver errors. The run stops immediately.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("concurrency must be at least 1 (got {0})")]
    InvalidConcurrency(usize),

    #[error("invalid driver config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{phase} transaction failed: {source}")]
    Transaction {
        phase: TransactionPhase,
        #[source]
        source: BoxError,
    },
}

impl MigrationError {
    pub fn transaction(phase: TransactionPhase, source: BoxError) -> Self {
        Self::Transaction { phase, source }
    }

    /// Phase of a failed transaction hook, if that is what this error is.
    pub fn transaction_phase(&self) -> Option<TransactionPhase> {
        match self {
            Self::Transaction { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
