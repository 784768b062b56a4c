//! TaskStore port - durable task identity -> payload -> status mapping
//!
//! The driver only talks to persistence through this trait. A store may be
//! backed by a database table, a queue, or a file; see
//! [`InMemoryTaskStore`](crate::impls::InMemoryTaskStore) for the reference
//! implementation.

use async_trait::async_trait;

use crate::domain::{StoreError, Task, TaskId, TaskStatus};

/// TaskStore holds the tasks a migration works through.
///
/// # Contract
/// - `take` does not claim or lock anything; it only reads. Running two
///   drivers against one store may hand the same task out twice.
/// - The store serializes concurrent `update`/`take` calls itself. The
///   driver adds no locking on top.
/// - Whether a `Failed` task comes back from `take` is up to the store;
///   the in-memory store re-takes it.
#[async_trait]
pub trait TaskStore<T>: Send + Sync
where
    T: Send + 'static,
{
    /// Remove every task. Setup/reset only; never called mid-run.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Up to `n` tasks whose status is `Pending` or `Failed`, in a
    /// store-defined order that is stable for the call.
    async fn take(&self, n: usize) -> Result<Vec<Task<T>>, StoreError>;

    /// Insert a `Pending` task. Fails with `DuplicateTask` if `id` exists.
    async fn add(&self, id: TaskId, payload: T) -> Result<(), StoreError>;

    /// Set the status of an existing task. Fails with `TaskNotFound`.
    async fn update(&self, id: &TaskId, status: TaskStatus) -> Result<(), StoreError>;
}
