use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic readings, expressed as time since an arbitrary origin
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Production time source backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven time source for tests; clones share the same reading
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Rc<Cell<Duration>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Stopwatch for a single trial
#[derive(Debug, Clone)]
pub struct TrialClock<S: TimeSource = MonotonicTime> {
    source: S,
    epoch: Option<Duration>,
    stopped_at: Option<Duration>,
}

impl TrialClock<MonotonicTime> {
    pub fn new() -> Self {
        Self::with_source(MonotonicTime::new())
    }
}

impl Default for TrialClock<MonotonicTime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> TrialClock<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            epoch: None,
            stopped_at: None,
        }
    }

    /// Reset the epoch to now and resume live readings.
    pub fn start_from_zero(&mut self) {
        self.epoch = Some(self.source.now());
        self.stopped_at = None;
    }

    /// Freeze the elapsed time. Stopping an idle clock freezes at zero.
    pub fn stop(&mut self) {
        let elapsed = self.live_elapsed();
        self.stopped_at = Some(elapsed);
    }

    pub fn is_running(&self) -> bool {
        self.epoch.is_some() && self.stopped_at.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        match self.stopped_at {
            Some(frozen) => frozen,
            None => self.live_elapsed(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    fn live_elapsed(&self) -> Duration {
        let Some(epoch) = self.epoch else {
            return Duration::ZERO;
        };
        let now = self.source.now();
        match now.checked_sub(epoch) {
            Some(elapsed) => elapsed,
            None => panic!("time source went backwards: epoch {epoch:?}, now {now:?}"),
        }
    }
}
