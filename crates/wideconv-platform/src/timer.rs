//! Monotonic high-resolution clock with a lazily captured baseline.
use std::{
    sync::OnceLock,
    time::{Duration, Instant},
};

/// Monotonic clock measuring time since its first use.
///
/// The baseline is captured on the first reading, not at construction, so a
/// `Clock` can live in a `static`. Readings from any thread share the same
/// baseline.
#[derive(Debug, Default)]
pub struct Clock {
    baseline: OnceLock<Instant>,
}

static GLOBAL: Clock = Clock::new();

impl Clock {
    /// Creates a clock whose baseline is not captured yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            baseline: OnceLock::new(),
        }
    }

    /// The process-wide clock.
    #[must_use]
    pub fn global() -> &'static Clock {
        &GLOBAL
    }

    /// Time elapsed since the baseline.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.baseline.get_or_init(Instant::now).elapsed()
    }

    /// Nanoseconds since the baseline, saturating at `i64::MAX`.
    #[must_use]
    pub fn nano_time(&self) -> i64 {
        i64::try_from(self.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    /// Milliseconds since the baseline, with sub-millisecond precision.
    #[must_use]
    pub fn milli_time_f(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}
