use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::trace;

use crate::math::Vector2;

use super::AnimationHandle;

/// Logical input channel. A new gesture on a channel supersedes whatever
/// animation is running on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Scroll,
    Pointer,
}

/// Output axis of a synthesized motion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// A raw input event from the host's event tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub channel: Channel,
    /// Raw delta magnitude, before sensitivity scaling.
    pub delta: Vector2,
    /// Host timestamp of the event.
    pub timestamp: Duration,
}

impl InputEvent {
    /// Creates a new input event.
    #[must_use]
    pub fn new(channel: Channel, delta: Vector2, timestamp: Duration) -> Self {
        Self {
            channel,
            delta,
            timestamp,
        }
    }
}

/// A synthesized whole-pixel motion step for the host's event injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    pub handle: AnimationHandle,
    pub channel: Channel,
    pub axis: Axis,
    pub delta: i64,
    /// Tick timestamp on the display clock's timeline.
    pub timestamp: Duration,
}

/// Receiver of synthesized motion events.
///
/// Called on the tick thread; implementations must not block.
pub trait EventSink {
    fn emit(&mut self, event: MotionEvent);
}

impl EventSink for Vec<MotionEvent> {
    fn emit(&mut self, event: MotionEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<MotionEvent> {
    fn emit(&mut self, event: MotionEvent) {
        if self.send(event).is_err() {
            trace!("motion event dropped: receiver closed");
        }
    }
}
