mod fixed;
mod vsync;

pub use fixed::FixedIntervalSource;
pub(crate) use fixed::interval_for_rate;
pub use vsync::{VsyncSignal, VsyncSource};

use std::time::{Duration, Instant};

use tracing::{debug, info};

/// Where tick timing comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingMode {
    /// Ticks follow the display's vertical refresh signal.
    Vsync,
    /// Ticks are paced by a timer at the expected refresh rate.
    FixedInterval,
}

/// One display refresh, as seen by the animation controller.
///
/// `timestamp` is measured from the clock's origin and is monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTick {
    pub timestamp: Duration,
    pub interval: Duration,
}

/// Lifecycle of a [`DisplayClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// A source of refresh-aligned wake-ups.
pub trait TickSource: Send {
    /// Returns the timing mode currently in effect.
    fn mode(&self) -> TimingMode;

    /// Returns the nominal interval between ticks.
    fn interval(&self) -> Duration;

    /// Called when the clock transitions to running.
    fn start(&mut self, now: Instant);

    /// Called when the clock transitions to stopped.
    fn stop(&mut self);

    /// Blocks until the next tick and returns when it happened.
    fn wait_next(&mut self) -> Instant;
}

/// Refresh-synchronized tick generator with an explicit run state.
///
/// The clock only produces ticks while running; the owner starts it when the
/// first animation is registered and stops it once none remain, so an idle
/// engine does no periodic work at all.
pub struct DisplayClock {
    source: Box<dyn TickSource>,
    origin: Instant,
    state: ClockState,
}

impl DisplayClock {
    /// Creates a stopped clock driven by `source`.
    #[must_use]
    pub fn new(source: Box<dyn TickSource>) -> Self {
        Self {
            source,
            origin: Instant::now(),
            state: ClockState::Stopped,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Returns whether the clock is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Returns the timing mode of the underlying source.
    #[must_use]
    pub fn timing_mode(&self) -> TimingMode {
        self.source.mode()
    }

    /// Returns the nominal refresh interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.source.interval()
    }

    /// Returns the time elapsed since the clock was created, on the same
    /// timeline as tick timestamps.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Transitions Stopped → Running. No-op if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.source.start(Instant::now());
        self.state = ClockState::Running;
        info!(
            mode = ?self.source.mode(),
            interval_us = self.source.interval().as_micros(),
            "display clock started"
        );
    }

    /// Transitions Running → Stopped. No-op if already stopped.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.source.stop();
        self.state = ClockState::Stopped;
        debug!("display clock stopped");
    }

    /// Waits for the next refresh and returns it, or `None` while stopped.
    pub fn next_tick(&mut self) -> Option<DisplayTick> {
        if !self.is_running() {
            return None;
        }
        let at = self.source.wait_next();
        Some(DisplayTick {
            timestamp: at.saturating_duration_since(self.origin),
            interval: self.source.interval(),
        })
    }
}

impl std::fmt::Debug for DisplayClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayClock")
            .field("mode", &self.source.mode())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn clock() -> DisplayClock {
        DisplayClock::new(Box::new(FixedIntervalSource::new(Duration::from_millis(1))))
    }

    #[test]
    fn starts_stopped_and_yields_nothing() {
        let mut clock = clock();
        assert_eq!(clock.state(), ClockState::Stopped);
        assert!(clock.next_tick().is_none());
    }

    #[test]
    fn running_clock_ticks_monotonically() {
        let mut clock = clock();
        clock.start();
        let a = clock.next_tick().unwrap();
        let b = clock.next_tick().unwrap();
        assert!(b.timestamp > a.timestamp);
        assert_eq!(a.interval, Duration::from_millis(1));
        assert_eq!(clock.timing_mode(), TimingMode::FixedInterval);
    }

    #[test]
    fn stop_returns_to_stopped() {
        let mut clock = clock();
        clock.start();
        clock.start();
        assert!(clock.is_running());
        clock.stop();
        assert_eq!(clock.state(), ClockState::Stopped);
        assert!(clock.next_tick().is_none());
        clock.start();
        assert!(clock.next_tick().is_some());
    }

    #[test]
    fn tick_timestamps_share_the_now_timeline() {
        let mut clock = clock();
        clock.start();
        let before = clock.now();
        let tick = clock.next_tick().unwrap();
        assert!(tick.timestamp >= before);
    }
}
