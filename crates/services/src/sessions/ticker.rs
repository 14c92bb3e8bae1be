use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use quiz_core::Clock;

/// Default refresh period of the elapsed-time display.
pub const TICK_PERIOD: std::time::Duration = std::time::Duration::from_secs(1);

/// Background task publishing `now - started_at` for display.
///
/// It only writes to its own channel, never to session state. Stopped
/// explicitly or when dropped.
#[derive(Debug)]
pub struct ElapsedTicker {
    handle: JoinHandle<()>,
    elapsed: watch::Receiver<Duration>,
}

impl ElapsedTicker {
    /// Spawn the ticker on the current tokio runtime.
    ///
    /// Returns `None` outside a runtime; callers can still compute elapsed
    /// time on demand.
    #[must_use]
    pub fn spawn(
        clock: Clock,
        started_at: DateTime<Utc>,
        period: std::time::Duration,
    ) -> Option<Self> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no tokio runtime, elapsed ticker disabled");
            return None;
        };

        let (tx, elapsed) = watch::channel(clock.elapsed_since(started_at));
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(clock.elapsed_since(started_at)).is_err() {
                    break;
                }
            }
        });

        Some(Self { handle, elapsed })
    }

    /// A receiver that observes every published value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Duration> {
        self.elapsed.clone()
    }

    /// Latest published elapsed time.
    #[must_use]
    pub fn latest(&self) -> Duration {
        *self.elapsed.borrow()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
