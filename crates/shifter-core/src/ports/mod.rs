//! Ports - the seams between the driver and the outside world
//!
//! - **TaskStore**: where tasks live (database table, queue, file, ...)
//! - **Migration**: what to do with each task, and the transaction hooks

pub mod migration;
pub mod task_store;

pub use self::migration::Migration;
pub use self::task_store::TaskStore;
