use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::fixed::precision_sleep_until;
use super::{TickSource, TimingMode};

/// Refresh signal pushed by the host's display callback.
///
/// The host calls [`VsyncSignal::notify`] from its display-link (or
/// equivalent) callback once per vertical refresh; [`VsyncSource`] waits on
/// it from the tick thread.
#[derive(Debug, Default)]
pub struct VsyncSignal {
    frames: Mutex<u64>,
    condvar: Condvar,
}

impl VsyncSignal {
    /// Creates a new signal, shareable between the host callback and a
    /// [`VsyncSource`].
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Records one vertical refresh and wakes the waiting tick thread.
    pub fn notify(&self) {
        let mut frames = self.frames.lock().unwrap_or_else(PoisonError::into_inner);
        *frames = frames.wrapping_add(1);
        self.condvar.notify_all();
    }

    /// Waits for the next refresh after the call. Returns `false` on timeout.
    fn wait(&self, timeout: Duration) -> bool {
        let guard = self.frames.lock().unwrap_or_else(PoisonError::into_inner);
        let seen = *guard;
        let (_guard, result) = self
            .condvar
            .wait_timeout_while(guard, timeout, |frames| *frames == seen)
            .unwrap_or_else(PoisonError::into_inner);
        !result.timed_out()
    }
}

/// Ticks on the host's vertical refresh, degrading to a fixed-interval
/// timer while the signal stalls.
///
/// A wait longer than two nominal intervals switches to degraded mode: the
/// transition is logged once, and from then on each tick is paced by the
/// timer while still listening for the signal. The first refresh that
/// arrives in time restores vsync mode.
#[derive(Debug)]
pub struct VsyncSource {
    signal: Arc<VsyncSignal>,
    interval: Duration,
    degraded: bool,
    last_tick: Option<Instant>,
}

impl VsyncSource {
    /// Creates a source waiting on `signal`, expecting one refresh per
    /// `interval`.
    #[must_use]
    pub fn new(signal: Arc<VsyncSignal>, interval: Duration) -> Self {
        Self {
            signal,
            interval,
            degraded: false,
            last_tick: None,
        }
    }

    /// Returns whether the source is currently pacing ticks by timer.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

impl TickSource for VsyncSource {
    fn mode(&self) -> TimingMode {
        if self.degraded {
            TimingMode::FixedInterval
        } else {
            TimingMode::Vsync
        }
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn start(&mut self, now: Instant) {
        self.last_tick = Some(now);
    }

    fn stop(&mut self) {
        self.last_tick = None;
    }

    fn wait_next(&mut self) -> Instant {
        if self.degraded {
            let deadline = self.last_tick.unwrap_or_else(Instant::now) + self.interval;
            let budget = deadline.saturating_duration_since(Instant::now());
            if self.signal.wait(budget) {
                self.degraded = false;
                info!("vsync signal resumed");
            } else {
                precision_sleep_until(deadline);
            }
        } else if !self.signal.wait(self.interval * 2) {
            self.degraded = true;
            warn!(
                interval_us = self.interval.as_micros(),
                "vsync signal stalled, falling back to fixed-interval timing"
            );
        }

        let now = Instant::now();
        self.last_tick = Some(now);
        now
    }
}
