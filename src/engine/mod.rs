mod tick_loop;

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::animation::{
    AnimationController, AnimationHandle, AnimationRequest, Channel, EventSink, HandleAllocator,
    InputEvent, PreparedAnimation,
};
use crate::clock::{DisplayClock, TickSource, TimingMode};
use crate::config::MotionConfig;
use crate::curve::CurveCache;
use crate::error::{EngineError, Result};

use tick_loop::TickLoop;

/// Name of the dedicated tick thread.
pub const TICK_THREAD_NAME: &str = "glidepath-tick";

/// Work handed from input threads to the tick thread.
#[derive(Debug)]
pub(crate) enum Command {
    Start(PreparedAnimation),
    Cancel(AnimationHandle),
    CancelChannel(Channel),
    Shutdown,
}

/// Cloneable, thread-safe entry point for input threads.
///
/// Validation and curve fitting run on the calling thread, so errors are
/// returned synchronously; only sound animations are queued. Nothing here
/// touches animation state directly.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: Sender<Command>,
    cache: Arc<Mutex<CurveCache>>,
    handles: HandleAllocator,
    config: Arc<MotionConfig>,
}

impl EngineHandle {
    /// Queues a new animation and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns a validation or fit error for a bad request, or
    /// [`EngineError::Stopped`] if the tick thread is gone.
    pub fn start_animation(&self, request: &AnimationRequest) -> Result<AnimationHandle> {
        let prepared = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            PreparedAnimation::prepare(request, &mut cache, self.handles.next())?
        };
        let handle = prepared.handle();
        self.send(Command::Start(prepared))?;
        Ok(handle)
    }

    /// Starts an animation for a raw input event using the channel's
    /// configured profile.
    ///
    /// # Errors
    ///
    /// Same as [`EngineHandle::start_animation`].
    pub fn submit(&self, event: &InputEvent) -> Result<AnimationHandle> {
        let request = self.config.profile(event.channel).request(event)?;
        self.start_animation(&request)
    }

    /// Cancels an animation. Takes effect on or before the next tick; a stale
    /// handle is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Stopped`] if the tick thread is gone.
    pub fn cancel(&self, handle: AnimationHandle) -> Result<()> {
        self.send(Command::Cancel(handle))
    }

    /// Cancels whatever runs on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Stopped`] if the tick thread is gone.
    pub fn cancel_channel(&self, channel: Channel) -> Result<()> {
        self.send(Command::CancelChannel(channel))
    }

    /// Returns the configuration the engine was started with.
    #[must_use]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| EngineError::Stopped.into())
    }
}

/// Owns the tick thread that drives every animation.
///
/// The thread blocks on its command queue while no animation is active, and
/// runs the display clock only while there is work. Dropping the engine
/// shuts the thread down and joins it.
#[derive(Debug)]
pub struct MotionEngine {
    handle: EngineHandle,
    thread: Option<JoinHandle<()>>,
    timing_mode: TimingMode,
}

impl MotionEngine {
    /// Validates `config`, pre-fits its curves and spawns the tick thread.
    ///
    /// Motion events are delivered to `sink` on the tick thread.
    ///
    /// # Errors
    ///
    /// Returns a configuration or fit error if `config` is invalid, or
    /// [`EngineError::Spawn`] if the thread cannot be created.
    pub fn spawn<S>(config: MotionConfig, source: Box<dyn TickSource>, sink: S) -> Result<Self>
    where
        S: EventSink + Send + 'static,
    {
        let mut cache = CurveCache::new();
        config.validate(&mut cache)?;

        let clock = DisplayClock::new(source);
        let timing_mode = clock.timing_mode();
        let (commands, receiver) = mpsc::channel();

        let tick_loop = TickLoop {
            commands: receiver,
            controller: AnimationController::new(),
            clock,
            sink,
        };
        let thread = thread::Builder::new()
            .name(TICK_THREAD_NAME.into())
            .spawn(move || tick_loop.run())
            .map_err(EngineError::Spawn)?;

        info!(?timing_mode, curves = cache.len(), "motion engine started");
        Ok(Self {
            handle: EngineHandle {
                commands,
                cache: Arc::new(Mutex::new(cache)),
                handles: HandleAllocator::default(),
                config: Arc::new(config),
            },
            thread: Some(thread),
            timing_mode,
        })
    }

    /// Returns a handle for input threads.
    #[must_use]
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Returns the timing mode the clock was created with.
    #[must_use]
    pub fn timing_mode(&self) -> TimingMode {
        self.timing_mode
    }

    /// Stops the tick thread, discarding running animations, and waits for
    /// it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TickThreadPanicked`] if the thread panicked.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop_thread()
    }

    fn stop_thread(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        // The thread may already be gone; joining reports how it ended.
        let _ = self.handle.commands.send(Command::Shutdown);
        thread
            .join()
            .map_err(|_| EngineError::TickThreadPanicked.into())
    }
}

impl Drop for MotionEngine {
    fn drop(&mut self) {
        if let Err(err) = self.stop_thread() {
            warn!(%err, "motion engine did not shut down cleanly");
        }
    }
}
