use std::time::{Duration, Instant};

use crate::error::{ConfigError, Result};

use super::{TickSource, TimingMode};

/// Below this, `precision_sleep_until` spins instead of sleeping.
const SPIN_THRESHOLD: Duration = Duration::from_micros(1500);

/// Paces ticks with a timer at a fixed refresh rate.
///
/// Used when the host cannot provide a vsync signal. Deadlines advance by
/// exactly one interval per tick; if a deadline is missed entirely the
/// schedule re-anchors on the current time instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct FixedIntervalSource {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl FixedIntervalSource {
    /// Creates a source ticking every `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
        }
    }

    /// Creates a source for a display refreshing at `hz`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `hz` is not a positive, finite rate.
    pub fn from_refresh_rate(hz: f64) -> Result<Self> {
        let interval = interval_for_rate(hz)?;
        Ok(Self::new(interval))
    }
}

/// Converts a refresh rate in Hz to a frame interval.
pub(crate) fn interval_for_rate(hz: f64) -> Result<Duration> {
    if !hz.is_finite() || hz <= 0.0 {
        return Err(ConfigError::Invalid(format!("refresh rate must be positive, got {hz}")).into());
    }
    Duration::try_from_secs_f64(hz.recip())
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| ConfigError::Invalid(format!("refresh rate {hz} Hz is out of range")).into())
}

impl TickSource for FixedIntervalSource {
    fn mode(&self) -> TimingMode {
        TimingMode::FixedInterval
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn start(&mut self, now: Instant) {
        self.next_deadline = Some(now + self.interval);
    }

    fn stop(&mut self) {
        self.next_deadline = None;
    }

    fn wait_next(&mut self) -> Instant {
        let deadline = self
            .next_deadline
            .unwrap_or_else(|| Instant::now() + self.interval);
        precision_sleep_until(deadline);

        let now = Instant::now();
        let next = deadline + self.interval;
        self.next_deadline = Some(if next <= now { now + self.interval } else { next });
        now
    }
}

/// Sleeps until `deadline`, spinning for the last stretch.
///
/// `thread::sleep` overshoots by up to a millisecond or so; sleeping for the
/// bulk of the wait and spinning for the rest lands close to the deadline.
pub(crate) fn precision_sleep_until(deadline: Instant) {
    let now = Instant::now();
    if deadline <= now {
        return;
    }
    if let Some(coarse) = (deadline - now).checked_sub(SPIN_THRESHOLD) {
        std::thread::sleep(coarse);
    }
    while Instant::now() < deadline {
        std::hint::spin_loop();
    }
}
