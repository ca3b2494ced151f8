//! Live amplitude metering.
//!
//! The meter polls a [`PowerSource`] on a fixed tick, normalizes each reading
//! and keeps the most recent values in an [`AmplitudeWindow`]. Renderers read
//! copies of the window through [`WindowReader`] on their own cadence.

use super::error::SourceUnavailable;
use super::normalize::NormalizationCurve;
use super::window::AmplitudeWindow;
use crate::scheduler::PeriodicTask;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Default number of samples kept in the window.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default interval between two meter ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(30);

/// Anything that can report the instantaneous power of a live signal.
///
/// Polled at the meter's tick rate, so implementations must be cheap and free
/// of side effects.
pub trait PowerSource: Send + Sync {
    /// Current average power in dBFS.
    ///
    /// # Errors
    /// - If the source is not capturing (stopped, paused, device gone)
    fn current_power_db(&self) -> Result<f32, SourceUnavailable>;
}

/// Metering lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterState {
    Idle,
    Metering,
}

/// Window plus the flag that says whether ticks may still write to it.
///
/// Both live behind one lock so a tick finishing after `stop` cannot land a
/// sample on top of the reset window.
#[derive(Debug)]
struct MeterWindow {
    window: AmplitudeWindow,
    active: bool,
}

#[derive(Debug)]
struct MeterShared {
    curve: NormalizationCurve,
    state: Mutex<MeterWindow>,
}

impl MeterShared {
    fn tick(&self, source: &dyn PowerSource) {
        let db = match source.current_power_db() {
            Ok(db) => db,
            Err(err) => {
                tracing::trace!("Meter tick without reading ({}), using silence", err);
                self.curve.min_db()
            }
        };
        let amplitude = self.curve.normalize_db(db);

        let mut state = self.state.lock();
        if state.active {
            state.window.push(amplitude);
        }
    }

    fn snapshot(&self) -> Vec<f32> {
        self.state.lock().window.to_vec()
    }
}

/// Cloneable read handle on a meter's window.
#[derive(Debug, Clone)]
pub struct WindowReader {
    shared: Arc<MeterShared>,
}

impl WindowReader {
    /// Returns a copy of the current window, oldest sample first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.shared.snapshot()
    }

    /// Most recent sample in the window.
    pub fn latest(&self) -> f32 {
        self.shared
            .state
            .lock()
            .window
            .iter()
            .last()
            .copied()
            .unwrap_or(0.0)
    }
}

/// Streaming meter: Idle until [`start`](Self::start), Metering until
/// [`stop`](Self::stop).
pub struct AmplitudeMeter {
    shared: Arc<MeterShared>,
    tick_interval: Duration,
    task: Option<PeriodicTask>,
}

impl AmplitudeMeter {
    /// Creates an idle meter with an all-zero window of `capacity` samples.
    pub fn new(curve: NormalizationCurve, capacity: usize, tick_interval: Duration) -> Self {
        Self {
            shared: Arc::new(MeterShared {
                curve,
                state: Mutex::new(MeterWindow {
                    window: AmplitudeWindow::new(capacity),
                    active: false,
                }),
            }),
            tick_interval,
            task: None,
        }
    }

    /// Starts polling `source` once per tick interval.
    ///
    /// Does nothing if the meter is already metering. Must be called from
    /// within a Tokio runtime.
    pub fn start(&mut self, source: Arc<dyn PowerSource>) {
        if self.task.is_some() {
            tracing::debug!("Meter already running, start ignored");
            return;
        }

        self.shared.state.lock().active = true;

        let shared = Arc::clone(&self.shared);
        self.task = Some(PeriodicTask::spawn(
            "amplitude-meter",
            self.tick_interval,
            move || shared.tick(source.as_ref()),
        ));

        tracing::debug!(
            "Meter started: capacity={}, tick={:?}",
            self.capacity(),
            self.tick_interval
        );
    }

    /// Stops ticking and clears the window history.
    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
            tracing::debug!("Meter stopped");
        }

        let mut state = self.shared.state.lock();
        state.active = false;
        state.window.reset();
    }

    pub fn state(&self) -> MeterState {
        if self.task.is_some() {
            MeterState::Metering
        } else {
            MeterState::Idle
        }
    }

    /// Returns a copy of the current window; all zeros while idle.
    pub fn snapshot(&self) -> Vec<f32> {
        self.shared.snapshot()
    }

    pub fn reader(&self) -> WindowReader {
        WindowReader {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn capacity(&self) -> usize {
        self.shared.state.lock().window.capacity()
    }

    pub fn curve(&self) -> &NormalizationCurve {
        &self.shared.curve
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Runs one tick synchronously against `source`, as the timer would.
    #[cfg(test)]
    fn tick_now(&self, source: &dyn PowerSource) {
        self.shared.tick(source);
    }

    #[cfg(test)]
    fn activate(&self) {
        self.shared.state.lock().active = true;
    }
}

impl Drop for AmplitudeMeter {
    fn drop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct ConstantSource(f32);

    impl PowerSource for ConstantSource {
        fn current_power_db(&self) -> Result<f32, SourceUnavailable> {
            Ok(self.0)
        }
    }

    struct FlakySource {
        available: AtomicBool,
        db: f32,
    }

    impl PowerSource for FlakySource {
        fn current_power_db(&self) -> Result<f32, SourceUnavailable> {
            if self.available.load(Ordering::SeqCst) {
                Ok(self.db)
            } else {
                Err(SourceUnavailable::new("not recording"))
            }
        }
    }

    fn meter(capacity: usize) -> AmplitudeMeter {
        AmplitudeMeter::new(
            NormalizationCurve::default(),
            capacity,
            Duration::from_millis(30),
        )
    }

    #[test]
    fn test_idle_meter_snapshot_is_all_zero() {
        let meter = meter(30);
        assert_eq!(meter.state(), MeterState::Idle);
        assert_eq!(meter.snapshot(), vec![0.0; 30]);
    }

    #[test]
    fn test_silence_for_ten_ticks_fills_tail_with_floor() {
        let meter = meter(30);
        meter.activate();
        let source = ConstantSource(-60.0);

        for _ in 0..10 {
            meter.tick_now(&source);
            assert_eq!(meter.snapshot().len(), 30);
        }

        let snapshot = meter.snapshot();
        let floor = meter.curve().floor();
        assert!(snapshot[..20].iter().all(|&s| s == 0.0));
        assert!(snapshot[20..].iter().all(|&s| s == floor));
    }

    #[test]
    fn test_constant_power_fills_whole_window_fifo() {
        let meter = meter(5);
        meter.activate();

        for _ in 0..5 {
            meter.tick_now(&ConstantSource(-60.0));
        }
        for _ in 0..8 {
            meter.tick_now(&ConstantSource(-30.0));
        }

        let expected = meter.curve().normalize_db(-30.0);
        assert_eq!(meter.snapshot(), vec![expected; 5]);
    }

    #[test]
    fn test_unavailable_source_substitutes_silence() {
        let meter = meter(4);
        meter.activate();
        let source = FlakySource {
            available: AtomicBool::new(true),
            db: 0.0,
        };

        meter.tick_now(&source);
        source.available.store(false, Ordering::SeqCst);
        meter.tick_now(&source);

        let floor = meter.curve().floor();
        assert_eq!(meter.snapshot(), vec![0.0, 0.0, 1.0, floor]);
    }

    #[test]
    fn test_ticks_after_stop_are_discarded() {
        let mut meter = meter(3);
        meter.activate();
        meter.tick_now(&ConstantSource(0.0));
        meter.stop();
        meter.tick_now(&ConstantSource(0.0));
        assert_eq!(meter.snapshot(), vec![0.0; 3]);
    }

    #[test]
    fn test_reader_sees_same_window() {
        let meter = meter(3);
        meter.activate();
        let reader = meter.reader();
        meter.tick_now(&ConstantSource(0.0));
        assert_eq!(reader.snapshot(), meter.snapshot());
        assert_eq!(reader.latest(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_ticks_and_stop_resets() {
        let mut meter = meter(30);
        let reader = meter.reader();
        meter.start(Arc::new(ConstantSource(0.0)));
        assert_eq!(meter.state(), MeterState::Metering);

        // Ticks at 0, 30, ..., 300 ms.
        tokio::time::sleep(Duration::from_millis(310)).await;
        let filled = reader.snapshot().iter().filter(|&&s| s == 1.0).count();
        assert_eq!(filled, 11);
        assert_eq!(reader.snapshot().len(), 30);

        meter.stop();
        assert_eq!(meter.state(), MeterState::Idle);
        assert_eq!(reader.snapshot(), vec![0.0; 30]);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(reader.snapshot(), vec![0.0; 30]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent_and_restart_begins_fresh() {
        let mut meter = meter(10);
        meter.start(Arc::new(ConstantSource(0.0)));
        meter.start(Arc::new(ConstantSource(-60.0)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(meter.snapshot().iter().all(|&s| s == 0.0 || s == 1.0));

        meter.stop();
        meter.stop();
        meter.start(Arc::new(ConstantSource(-60.0)));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let snapshot = meter.snapshot();
        assert_eq!(snapshot[9], meter.curve().floor());
        assert!(snapshot[..9].iter().all(|&s| s == 0.0));
    }
}
