//! shifter-core
//!
//! Batch task-migration driver: pull a bounded batch of pending tasks from a
//! [`TaskStore`](ports::TaskStore), apply a caller-supplied
//! [`Migration`](ports::Migration) to each inside a transaction, commit the
//! batch only if every task succeeded, and stop with a rollback otherwise.
//!
//! # Modules
//! - **domain**: task ids, tasks and statuses, errors, run outcomes
//! - **ports**: `TaskStore` and `Migration` traits
//! - **app**: `MigrationDriver`, progress reporting, configuration
//! - **impls**: `InMemoryTaskStore`
//! - **observability**: logging bootstrap, elapsed-time formatting

pub mod app;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{DriverConfig, MigrationDriver};
pub use domain::{
    BoxError, ErrorRecord, MigrationError, MigrationOutcome, StoreError, Task, TaskId, TaskStatus,
};
pub use impls::InMemoryTaskStore;
pub use ports::{Migration, TaskStore};
