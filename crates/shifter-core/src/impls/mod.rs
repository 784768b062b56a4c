//! Impls - port implementations for development and tests
//!
//! Production stores (a database table, a queue, ...) live with the
//! migration that uses them; this module only ships the in-memory store.

pub mod inmem_store;

pub use self::inmem_store::{InMemoryTaskStore, StatusCounts};
