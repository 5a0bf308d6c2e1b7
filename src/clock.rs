use ::once_cell::sync::Lazy;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of the time readings used by `WaitTimeNode` and `LimiterTimeNode`.
///
/// Readings are durations since an arbitrary epoch; only differences between two
/// readings are meaningful.
pub trait Clock {
    fn now(&self) -> Duration;
}

static PROCESS_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Wall clock, measured from the first time any `SystemClock` is read.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        PROCESS_START.elapsed()
    }
}

/// A clock that only moves when told to. Useful for fixed-step simulations and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
