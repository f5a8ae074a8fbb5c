use std::collections::HashMap;
use std::time::Duration;

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::curve::CurveCache;
use crate::error::Result;

use super::{
    Animation, AnimationHandle, AnimationKey, AnimationRequest, Axis, Channel, EventSink,
    HandleAllocator, MotionEvent, PreparedAnimation,
};

/// Owns every in-flight animation and advances them on display ticks.
///
/// Each channel carries at most one animation: starting a new one on a busy
/// channel cancels the old one first. The controller is single-threaded;
/// cross-thread use goes through [`MotionEngine`](crate::engine::MotionEngine).
#[derive(Debug, Default)]
pub struct AnimationController {
    animations: SlotMap<AnimationKey, Animation>,
    channels: HashMap<Channel, AnimationKey>,
    cache: CurveCache,
    handles: HandleAllocator,
}

impl AnimationController {
    /// Creates an empty controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and registers a new animation starting at `now`.
    ///
    /// Curves are fitted through the controller's cache, so repeated gestures
    /// with the same curve spec reuse one fit. Any animation already running
    /// on the request's channel is canceled.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration is zero, the distance is not finite,
    /// or a curve cannot be fitted. Nothing is registered on error.
    pub fn start_animation(
        &mut self,
        request: &AnimationRequest,
        now: Duration,
    ) -> Result<AnimationHandle> {
        let prepared = PreparedAnimation::prepare(request, &mut self.cache, self.handles.next())?;
        Ok(self.register(prepared, now))
    }

    /// Registers an already prepared animation starting at `now`.
    pub fn register(&mut self, prepared: PreparedAnimation, now: Duration) -> AnimationHandle {
        let channel = prepared.channel();
        if let Some(previous) = self.cancel_channel(channel) {
            debug!(?channel, superseded = previous.serial(), "gesture superseded");
        }

        let animation = Animation::begin(prepared, now);
        let handle = animation.handle();
        debug!(
            handle = handle.serial(),
            ?channel,
            distance_x = animation.distance().x,
            distance_y = animation.distance().y,
            duration_ms = animation.duration().as_secs_f64() * 1e3,
            "animation started"
        );
        let key = self.animations.insert(animation);
        self.channels.insert(channel, key);
        handle
    }

    /// Advances every animation to `timestamp`, emitting whole-pixel deltas.
    ///
    /// Finished animations are removed before returning.
    pub fn on_tick<S: EventSink + ?Sized>(&mut self, timestamp: Duration, sink: &mut S) {
        let mut finished = Vec::new();

        for (key, animation) in &mut self.animations {
            let step = animation.advance(timestamp);
            for (axis, delta) in [(Axis::X, step.pixels.0), (Axis::Y, step.pixels.1)] {
                if delta != 0 {
                    sink.emit(MotionEvent {
                        handle: animation.handle(),
                        channel: animation.channel(),
                        axis,
                        delta,
                        timestamp,
                    });
                }
            }
            trace!(
                handle = animation.handle().serial(),
                fraction = animation.fraction(),
                dx = step.pixels.0,
                dy = step.pixels.1,
                "tick"
            );
            if step.finished {
                finished.push(key);
            }
        }

        for key in finished {
            if let Some(animation) = self.remove(key) {
                debug!(
                    handle = animation.handle().serial(),
                    emitted_x = animation.emitted().0,
                    emitted_y = animation.emitted().1,
                    "animation finished"
                );
            }
        }
    }

    /// Removes the animation behind `handle` immediately, discarding its
    /// remainder. Returns `false` if the handle is stale.
    pub fn cancel(&mut self, handle: AnimationHandle) -> bool {
        let key = self
            .animations
            .iter()
            .find_map(|(key, a)| (a.handle() == handle).then_some(key));
        match key.and_then(|key| self.remove(key)) {
            Some(_) => {
                debug!(handle = handle.serial(), "animation canceled");
                true
            }
            None => false,
        }
    }

    /// Cancels whatever runs on `channel`, returning its handle.
    pub fn cancel_channel(&mut self, channel: Channel) -> Option<AnimationHandle> {
        let key = self.channels.get(&channel).copied()?;
        let animation = self.remove(key)?;
        debug!(handle = animation.handle().serial(), ?channel, "channel canceled");
        Some(animation.handle())
    }

    fn remove(&mut self, key: AnimationKey) -> Option<Animation> {
        let animation = self.animations.remove(key)?;
        if self.channels.get(&animation.channel()) == Some(&key) {
            self.channels.remove(&animation.channel());
        }
        Some(animation)
    }

    /// Returns the live animation behind `handle`, if any.
    #[must_use]
    pub fn animation(&self, handle: AnimationHandle) -> Option<&Animation> {
        self.animations.values().find(|a| a.handle() == handle)
    }

    /// Returns the animation currently running on `channel`, if any.
    #[must_use]
    pub fn animation_on(&self, channel: Channel) -> Option<&Animation> {
        self.channels
            .get(&channel)
            .and_then(|&key| self.animations.get(key))
    }

    /// Returns the number of live animations.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.animations.len()
    }

    /// Returns whether no animation is live.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.animations.is_empty()
    }

    /// Returns the controller's curve cache.
    #[must_use]
    pub fn curve_cache(&self) -> &CurveCache {
        &self.cache
    }
}
