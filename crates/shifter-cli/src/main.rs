mod customers;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use shifter_core::observability::init_logging;
use shifter_core::{DriverConfig, InMemoryTaskStore, MigrationDriver, TaskId, TaskStore};
use tracing::info;

use crate::customers::{CopyCustomers, LegacyCustomer};

/// Settings come from SHIFTER_* env vars first; flags override them.
#[derive(Parser)]
#[command(name = "shifter")]
#[command(about = "Run a demo batch migration against an in-memory task store")]
struct Cli {
    /// Number of legacy rows to seed
    #[arg(long, default_value_t = 20)]
    tasks: u32,

    /// Batch size and fan-out limit
    #[arg(long)]
    concurrency: Option<usize>,

    /// Make the row with this id fail, rolling back its batch
    #[arg(long, value_name = "ID")]
    fail_on: Option<u32>,

    /// Random per-row latency upper bound
    #[arg(long, default_value_t = 0)]
    max_latency_ms: u64,

    /// Per-row apply timeout
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let mut config = DriverConfig::from_env()?;
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_apply_timeout(Some(Duration::from_millis(timeout_ms)));
    }
    config.validate()?;

    let store = Arc::new(InMemoryTaskStore::new());
    store.clear().await?;
    for id in 0..cli.tasks {
        store.add(TaskId::from(id), LegacyCustomer::sample(id)).await?;
    }
    info!(tasks = cli.tasks, concurrency = config.concurrency, "store seeded");

    let migration = Arc::new(CopyCustomers::new(cli.fail_on, cli.max_latency_ms));
    let driver =
        MigrationDriver::new(Arc::clone(&migration), Arc::clone(&store)).with_config(config);

    let outcome = driver.run().await?;

    let counts = store.counts().await;
    info!(
        pending = counts.pending,
        failed = counts.failed,
        success = counts.success,
        migrated = migration.migrated().await,
        "store status"
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
