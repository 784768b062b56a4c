//! App - the driver and what it needs to run
//!
//! # Components
//! - **MigrationDriver**: batch loop (take -> start -> apply -> commit/rollback)
//! - **ProgressReporter**: periodic processed-count logging
//! - **DriverConfig**: concurrency, progress interval, apply timeout

pub mod config;
pub mod driver;
pub mod progress;

pub use self::config::{ConfigError, DriverConfig};
pub use self::driver::MigrationDriver;
pub use self::progress::ProgressReporter;
