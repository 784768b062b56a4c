//! Logging bootstrap and human-readable formatting for run output.

use std::sync::OnceLock;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "shifter=info,shifter_core=info,shifter_cli=info";

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a fmt subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; if the host already installed a global
/// subscriber, that one is kept.
pub fn init_logging() {
    LOGGING_INITIALIZED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_err()
        {
            tracing::debug!("global tracing subscriber already set, keeping it");
        }
    });
}

/// Compact elapsed-time rendering: `350ms`, `5.2s`, `1m 5.2s`, `2h 3m 4s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1_000 {
        return format!("{millis}ms");
    }

    let secs = elapsed.as_secs();
    let tenths = elapsed.subsec_millis() / 100;
    if secs < 60 {
        return format!("{secs}.{tenths}s");
    }

    let (hours, rem) = (secs / 3600, secs % 3600);
    let (minutes, secs) = (rem / 60, rem % 60);
    if hours == 0 {
        format!("{minutes}m {secs}.{tenths}s")
    } else {
        format!("{hours}h {minutes}m {secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_millis(0), "0ms")]
    #[case(Duration::from_millis(350), "350ms")]
    #[case(Duration::from_millis(5_249), "5.2s")]
    #[case(Duration::from_millis(65_200), "1m 5.2s")]
    #[case(Duration::from_secs(2 * 3600 + 3 * 60 + 4), "2h 3m 4s")]
    fn formats_elapsed(#[case] elapsed: Duration, #[case] expected: &str) {
        assert_eq!(format_elapsed(elapsed), expected);
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
