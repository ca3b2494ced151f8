//! Periodic task scheduling on the Tokio runtime.
//!
//! All recurring work (meter ticks, status refreshes) goes through
//! [`PeriodicTask`] so that every timer can be cancelled the same way.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest accepted period; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A job run at a fixed period until cancelled or dropped.
pub struct PeriodicTask {
    name: &'static str,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawns `job` on the current Tokio runtime, running it once per `period`.
    ///
    /// The first run happens immediately. Late ticks are delayed rather than
    /// bursted, so a stalled runtime never replays a backlog of runs.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(name: &'static str, period: Duration, mut job: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                job();
            }
        });

        tracing::debug!("Periodic task '{}' started ({:?})", name, period);

        Self {
            name,
            period,
            handle: Some(handle),
        }
    }

    /// Stops the task. Calling it again has no effect.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Periodic task '{}' cancelled", self.name);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
