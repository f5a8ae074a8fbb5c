use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::{debug, info};

use crate::animation::{AnimationController, EventSink};
use crate::clock::DisplayClock;

use super::Command;

/// State owned by the tick thread. Nothing here is shared.
pub(super) struct TickLoop<S> {
    pub commands: Receiver<Command>,
    pub controller: AnimationController,
    pub clock: DisplayClock,
    pub sink: S,
}

impl<S: EventSink> TickLoop<S> {
    pub fn run(mut self) {
        info!(mode = ?self.clock.timing_mode(), "tick thread running");
        let mut senders_gone = false;

        loop {
            if self.controller.is_idle() {
                self.clock.stop();
                if senders_gone {
                    break;
                }
                // Idle: sleep on the queue until a command arrives.
                match self.commands.recv() {
                    Ok(command) => {
                        if self.apply(command).is_break() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }

            match self.drain() {
                ControlFlow::Break(()) => break,
                ControlFlow::Continue(open) => senders_gone |= !open,
            }

            if self.controller.is_idle() {
                continue;
            }
            self.clock.start();
            if let Some(tick) = self.clock.next_tick() {
                self.controller.on_tick(tick.timestamp, &mut self.sink);
            }
        }

        self.clock.stop();
        info!("tick thread exiting");
    }

    /// Applies every queued command. Continues with `false` once all senders
    /// are gone.
    fn drain(&mut self) -> ControlFlow<(), bool> {
        loop {
            match self.commands.try_recv() {
                Ok(command) => self.apply(command)?,
                Err(TryRecvError::Empty) => return ControlFlow::Continue(true),
                Err(TryRecvError::Disconnected) => return ControlFlow::Continue(false),
            }
        }
    }

    fn apply(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Start(prepared) => {
                let now = self.clock.now();
                self.controller.register(prepared, now);
            }
            Command::Cancel(handle) => {
                self.controller.cancel(handle);
            }
            Command::CancelChannel(channel) => {
                self.controller.cancel_channel(channel);
            }
            Command::Shutdown => {
                debug!(active = self.controller.active_count(), "shutdown requested");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}
