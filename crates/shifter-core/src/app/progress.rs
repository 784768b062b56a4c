//! Progress - periodic "processed so far" reporting
//!
//! The driver bumps a shared atomic counter after each commit. A background
//! tokio task logs the counter on a fixed wall-clock interval, independent
//! of batch boundaries.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

/// Background progress reporter.
///
/// Dropping the reporter aborts its task, so every exit path of a run
/// (completion, rollback, `?` on a fatal error) stops the timer.
pub struct ProgressReporter {
    processed: Arc<AtomicU64>,
    reports: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Start reporting every `interval`. The first report fires one full
    /// interval after the start, not immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(interval: Duration) -> Self {
        let processed = Arc::new(AtomicU64::new(0));
        let reports = Arc::new(AtomicU64::new(0));

        let handle = tokio::spawn({
            let processed = Arc::clone(&processed);
            let reports = Arc::clone(&reports);
            async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    reports.fetch_add(1, Ordering::Relaxed);
                    info!(
                        processed = processed.load(Ordering::Relaxed),
                        "migration progress"
                    );
                }
            }
        });

        Self {
            processed,
            reports,
            handle,
        }
    }

    /// Add a committed batch to the running total.
    pub fn add(&self, n: u64) {
        self.processed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Number of progress lines emitted so far.
    pub fn reports(&self) -> u64 {
        self.reports.load(Ordering::Relaxed)
    }

    /// Report counter that outlives the reporter (for testing)
    #[cfg(test)]
    fn reports_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.reports)
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reports_on_each_interval() {
        let reporter = ProgressReporter::spawn(Duration::from_secs(5));
        reporter.add(3);
        reporter.add(2);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(reporter.reports(), 0);

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(reporter.reports(), 2);
        assert_eq!(reporter.processed(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_timer() {
        let reporter = ProgressReporter::spawn(Duration::from_secs(1));
        let reports = reporter.reports_counter();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(reports.load(Ordering::Relaxed), 1);

        drop(reporter);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(reports.load(Ordering::Relaxed), 1);
    }
}
