//! Domain model (ids, tasks, errors, outcomes).

pub mod errors;
pub mod ids;
pub mod outcome;
pub mod task;

pub use self::errors::{BoxError, ErrorRecord, MigrationError, StoreError, TransactionPhase};
pub use self::ids::TaskId;
pub use self::outcome::{MigrationFailure, MigrationOutcome, MigrationSummary};
pub use self::task::{Task, TaskStatus};
