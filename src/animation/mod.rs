mod controller;
mod event;

pub use controller::AnimationController;
pub use event::{Axis, Channel, EventSink, InputEvent, MotionEvent};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::accumulator::VectorSubPixelAccumulator;
use crate::curve::{CurveCache, CurveSpec, FittedCurve};
use crate::error::{AnimationError, Result};
use crate::math::Vector2;

slotmap::new_key_type! {
    /// Arena key of a live animation inside the controller.
    pub struct AnimationKey;
}

/// Largest accepted distance per axis, in pixels (2^53).
///
/// Every whole pixel count up to this bound is exact in both `f64` and
/// `i64`, so the terminal flush can always land on `round(distance)`.
pub const MAX_DISTANCE: f64 = 9_007_199_254_740_992.0;

/// Stable identifier of a started animation.
///
/// Handles are never reused, so a handle kept past its animation's end is
/// simply stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(u64);

impl AnimationHandle {
    /// Returns the raw serial number.
    #[must_use]
    pub fn serial(self) -> u64 {
        self.0
    }
}

/// Thread-safe source of fresh [`AnimationHandle`]s.
#[derive(Debug, Clone, Default)]
pub struct HandleAllocator {
    next: Arc<AtomicU64>,
}

impl HandleAllocator {
    /// Returns a handle no other call has returned.
    #[must_use]
    pub fn next(&self) -> AnimationHandle {
        AnimationHandle(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// How easing curves map onto the two axes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AxisMode {
    /// One curve drives both axes in proportion to their distances.
    #[default]
    Proportional,
    /// The request curve drives x; `y_curve` drives y.
    Decoupled { y_curve: CurveSpec },
}

/// Parameters of a new animation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub channel: Channel,
    /// Signed total distance per axis, in pixels.
    pub distance: Vector2,
    pub duration: Duration,
    pub curve: CurveSpec,
    pub axis_mode: AxisMode,
}

impl AnimationRequest {
    /// Creates a request with proportional axes.
    #[must_use]
    pub fn new(channel: Channel, distance: Vector2, duration: Duration, curve: CurveSpec) -> Self {
        Self {
            channel,
            distance,
            duration,
            curve,
            axis_mode: AxisMode::Proportional,
        }
    }

    /// Sets the axis mode.
    #[must_use]
    pub fn with_axis_mode(mut self, axis_mode: AxisMode) -> Self {
        self.axis_mode = axis_mode;
        self
    }
}

/// A validated, fitted animation that has not been registered yet.
///
/// Produced on the caller's thread so that every error surfaces there; the
/// tick thread only ever receives animations that are known to be sound.
#[derive(Debug, Clone)]
pub struct PreparedAnimation {
    handle: AnimationHandle,
    channel: Channel,
    distance: Vector2,
    duration: Duration,
    x_curve: Arc<FittedCurve>,
    y_curve: Arc<FittedCurve>,
}

impl PreparedAnimation {
    /// Validates `request` and resolves its curves through `cache`.
    ///
    /// # Errors
    ///
    /// - [`AnimationError::InvalidDuration`] for a zero duration.
    /// - [`AnimationError::InvalidDistance`] for a non-finite distance, or
    ///   one larger than [`MAX_DISTANCE`] on either axis.
    /// - Any fit error from the request's curves.
    pub fn prepare(
        request: &AnimationRequest,
        cache: &mut CurveCache,
        handle: AnimationHandle,
    ) -> Result<Self> {
        if request.duration.is_zero() {
            return Err(AnimationError::InvalidDuration { millis: 0.0 }.into());
        }
        if !request.distance.iter().all(|d| d.abs() <= MAX_DISTANCE) {
            return Err(AnimationError::InvalidDistance.into());
        }

        let x_curve = cache.get_or_fit(&request.curve)?;
        let y_curve = match &request.axis_mode {
            AxisMode::Proportional => Arc::clone(&x_curve),
            AxisMode::Decoupled { y_curve } => cache.get_or_fit(y_curve)?,
        };

        Ok(Self {
            handle,
            channel: request.channel,
            distance: request.distance,
            duration: request.duration,
            x_curve,
            y_curve,
        })
    }

    /// Returns the handle the animation will run under.
    #[must_use]
    pub fn handle(&self) -> AnimationHandle {
        self.handle
    }

    /// Returns the channel the animation will run on.
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

/// Pixels produced by one animation on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    pub pixels: (i64, i64),
    pub finished: bool,
}

/// One in-flight motion task.
#[derive(Debug)]
pub struct Animation {
    handle: AnimationHandle,
    channel: Channel,
    start: Duration,
    duration: Duration,
    distance: Vector2,
    target: (i64, i64),
    x_curve: Arc<FittedCurve>,
    y_curve: Arc<FittedCurve>,
    fraction: f64,
    /// Curve values at the previous fraction, per axis.
    progress: Vector2,
    accumulator: VectorSubPixelAccumulator,
}

impl Animation {
    pub(crate) fn begin(prepared: PreparedAnimation, start: Duration) -> Self {
        let progress = Vector2::new(prepared.x_curve.evaluate(0.0), prepared.y_curve.evaluate(0.0));
        #[allow(clippy::cast_possible_truncation)]
        let target = (
            prepared.distance.x.round() as i64,
            prepared.distance.y.round() as i64,
        );
        Self {
            handle: prepared.handle,
            channel: prepared.channel,
            start,
            duration: prepared.duration,
            distance: prepared.distance,
            target,
            x_curve: prepared.x_curve,
            y_curve: prepared.y_curve,
            fraction: 0.0,
            progress,
            accumulator: VectorSubPixelAccumulator::new(),
        }
    }

    /// Advances to `timestamp` and returns the whole pixels to emit.
    ///
    /// The fraction is derived from absolute time, so late or missed ticks
    /// never stretch the animation. On the final tick the output is flushed
    /// so the cumulative total equals the rounded distance exactly.
    pub(crate) fn advance(&mut self, timestamp: Duration) -> Step {
        let elapsed = timestamp.saturating_sub(self.start);
        let fraction = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        self.fraction = self.fraction.max(fraction);

        if self.fraction >= 1.0 {
            return Step {
                pixels: self.accumulator.flush_to(self.target),
                finished: true,
            };
        }

        let value = Vector2::new(
            self.x_curve.evaluate(self.fraction),
            self.y_curve.evaluate(self.fraction),
        );
        let delta = self.distance.component_mul(&(value - self.progress));
        self.progress = value;
        Step {
            pixels: self.accumulator.consume(delta),
            finished: false,
        }
    }

    /// Returns this animation's handle.
    #[must_use]
    pub fn handle(&self) -> AnimationHandle {
        self.handle
    }

    /// Returns the channel this animation runs on.
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Returns the timestamp the animation started at.
    #[must_use]
    pub fn start(&self) -> Duration {
        self.start
    }

    /// Returns the total duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns the signed total distance per axis.
    #[must_use]
    pub fn distance(&self) -> Vector2 {
        self.distance
    }

    /// Returns the elapsed fraction reached by the last tick.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Returns the whole pixels emitted so far per axis.
    #[must_use]
    pub fn emitted(&self) -> (i64, i64) {
        self.accumulator.emitted()
    }

    /// Returns the carried sub-pixel remainder per axis.
    #[must_use]
    pub fn remainder(&self) -> Vector2 {
        self.accumulator.remainder()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::ControlPoint;
    use crate::error::MotionError;

    fn request(duration: Duration) -> AnimationRequest {
        AnimationRequest::new(
            Channel::Scroll,
            Vector2::new(0.0, 100.0),
            duration,
            CurveSpec::linear(),
        )
    }

    fn prepare(request: &AnimationRequest, cache: &mut CurveCache) -> Result<PreparedAnimation> {
        PreparedAnimation::prepare(request, cache, HandleAllocator::default().next())
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut cache = CurveCache::new();
        let err = prepare(&request(Duration::ZERO), &mut cache).unwrap_err();
        assert!(matches!(
            err,
            MotionError::Animation(AnimationError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn non_finite_distance_is_rejected() {
        let mut cache = CurveCache::new();
        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut req = request(Duration::from_millis(100));
            req.distance.y = bad;
            let err = prepare(&req, &mut cache).unwrap_err();
            assert!(matches!(
                err,
                MotionError::Animation(AnimationError::InvalidDistance)
            ));
        }
    }

    #[test]
    fn unrepresentable_distance_is_rejected_on_either_axis() {
        let mut cache = CurveCache::new();
        for distance in [
            Vector2::new(2e19, 0.0),
            Vector2::new(0.0, -2e19),
            Vector2::new(MAX_DISTANCE * 2.0, 1.0),
            Vector2::new(1.0, -MAX_DISTANCE * 2.0),
        ] {
            let mut req = request(Duration::from_millis(200));
            req.distance = distance;
            let err = prepare(&req, &mut cache).unwrap_err();
            assert!(
                matches!(err, MotionError::Animation(AnimationError::InvalidDistance)),
                "distance {distance:?} was accepted"
            );
        }
    }

    #[test]
    fn largest_distance_lands_exactly() {
        let mut cache = CurveCache::new();
        let mut req = request(Duration::from_millis(200));
        req.distance = Vector2::new(-MAX_DISTANCE, MAX_DISTANCE);
        let mut anim = Animation::begin(prepare(&req, &mut cache).unwrap(), Duration::ZERO);
        for i in 1..=12 {
            anim.advance(Duration::from_micros(16_667 * i));
        }
        let end = anim.advance(Duration::from_millis(250));
        assert!(end.finished);
        assert_eq!(anim.emitted(), (-(1_i64 << 53), 1_i64 << 53));
    }

    #[test]
    fn decoupled_y_curve_fit_errors_surface() {
        let mut cache = CurveCache::new();
        let req = request(Duration::from_millis(100)).with_axis_mode(AxisMode::Decoupled {
            y_curve: CurveSpec::polynomial(vec![ControlPoint::new(0.0, 0.0)], 2),
        });
        let err = prepare(&req, &mut cache).unwrap_err();
        assert!(matches!(err, MotionError::Fit(_)));
    }

    #[test]
    fn proportional_axes_share_one_curve() {
        let mut cache = CurveCache::new();
        let prepared = prepare(&request(Duration::from_millis(100)), &mut cache).unwrap();
        assert!(Arc::ptr_eq(&prepared.x_curve, &prepared.y_curve));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn handles_are_unique_across_clones() {
        let a = HandleAllocator::default();
        let b = a.clone();
        let h1 = a.next();
        let h2 = b.next();
        assert_ne!(h1, h2);
    }

    #[test]
    fn late_ticks_do_not_stretch_duration() {
        let mut cache = CurveCache::new();
        let prepared = prepare(&request(Duration::from_millis(100)), &mut cache).unwrap();
        let mut anim = Animation::begin(prepared, Duration::from_millis(10));
        // One tick in the middle, then a long stall past the end.
        let mid = anim.advance(Duration::from_millis(60));
        assert!((49..=50).contains(&mid.pixels.1), "mid={mid:?}");
        assert!(!mid.finished);
        let end = anim.advance(Duration::from_millis(400));
        assert_eq!(end.pixels.1, 100 - mid.pixels.1);
        assert!(end.finished);
        assert_eq!(anim.emitted(), (0, 100));
    }

    #[test]
    fn early_tick_before_start_emits_nothing() {
        let mut cache = CurveCache::new();
        let prepared = prepare(&request(Duration::from_millis(100)), &mut cache).unwrap();
        let mut anim = Animation::begin(prepared, Duration::from_millis(50));
        let step = anim.advance(Duration::from_millis(20));
        assert_eq!(step.pixels, (0, 0));
        assert!(anim.fraction().abs() < 1e-12);
    }
}
