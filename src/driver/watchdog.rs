//! Global run deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::error;

use super::exit::ProcessExit;

/// Default deadline for a whole run.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

/// Races `run` against `deadline`.
///
/// When the deadline wins, `run` is dropped mid-flight (in-flight requests are
/// abandoned) and [`ProcessExit::Timeout`] is returned.
pub async fn run_with_watchdog<F>(deadline: Duration, run: F) -> ProcessExit
where
    F: Future<Output = ProcessExit>,
{
    run_with_watchdog_since(Instant::now(), deadline, run).await
}

/// Like [`run_with_watchdog`], but the deadline is measured from `started`.
///
/// Work done between `started` and the call counts against the deadline; an
/// already elapsed deadline yields [`ProcessExit::Timeout`] unless `run` is
/// immediately ready.
pub async fn run_with_watchdog_since<F>(
    started: Instant,
    deadline: Duration,
    run: F,
) -> ProcessExit
where
    F: Future<Output = ProcessExit>,
{
    tokio::select! {
        biased;
        exit = run => exit,
        () = tokio::time::sleep_until(started + deadline) => {
            error!(deadline_secs = deadline.as_secs_f64(), "Watchdog deadline exceeded");
            ProcessExit::Timeout
        }
    }
}
