//! Migration port - the caller-supplied half of a run
//!
//! A concrete migration provides the per-task transformation plus the
//! transaction hooks that bracket each batch. The driver treats the hooks
//! as opaque begin/commit/rollback markers.

use async_trait::async_trait;

use crate::domain::BoxError;

/// Migration is the capability set the driver needs from the caller.
///
/// # Example
/// ```ignore
/// struct CopyUsers { pool: PgPool, tx: Mutex<Option<Transaction>> }
///
/// #[async_trait]
/// impl Migration for CopyUsers {
///     type Payload = UserRow;
///
///     async fn apply(&self, row: &UserRow) -> Result<(), BoxError> { ... }
///     async fn start_transaction(&self) -> Result<(), BoxError> { ... }
///     async fn commit_transaction(&self) -> Result<(), BoxError> { ... }
///     async fn rollback_transaction(&self) -> Result<(), BoxError> { ... }
/// }
/// ```
///
/// `apply` runs concurrently for every task of a batch (up to the
/// configured concurrency), so implementations take `&self` and must
/// synchronize any shared state themselves.
#[async_trait]
pub trait Migration: Send + Sync {
    type Payload: Send + Sync + 'static;

    /// Transform one task payload. An `Err` fails the whole batch.
    async fn apply(&self, payload: &Self::Payload) -> Result<(), BoxError>;

    async fn start_transaction(&self) -> Result<(), BoxError>;

    async fn commit_transaction(&self) -> Result<(), BoxError>;

    async fn rollback_transaction(&self) -> Result<(), BoxError>;
}
