use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::ExplorerApp;
use crate::kernel::services::KernelMessage;
use crate::kernel::{Action, AppState};

const PUMP_SLICE: Duration = Duration::from_millis(10);

impl ExplorerApp {
    /// Applies everything that arrived since the last tick without blocking.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        changed |= self.poll_kernel_bus();
        changed |= self.poll_file_watcher();
        changed
    }

    pub fn poll_kernel_bus(&mut self) -> bool {
        let mut changed = false;
        let mut drained = 0usize;
        loop {
            if drained >= super::MAX_KERNEL_BUS_DRAIN_PER_TICK {
                break;
            }
            match self.kernel_services.try_recv() {
                Ok(KernelMessage::Action(action)) => {
                    drained += 1;
                    changed |= self.dispatch_kernel(action);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    fn poll_file_watcher(&mut self) -> bool {
        let Some(watcher) = self.file_watcher.as_mut() else {
            return false;
        };
        let events = watcher.drain_events();
        let mut changed = false;
        for event in events {
            tracing::debug!(event = event.name(), "applying watcher event");
            changed |= self.dispatch_kernel(Action::Remote(event));
        }
        changed
    }

    /// Waits up to `timeout` for the next result, then drains what is queued.
    pub fn pump(&mut self, timeout: Duration) -> bool {
        match self.kernel_services.recv_timeout(timeout) {
            Ok(KernelMessage::Action(action)) => {
                let mut changed = self.dispatch_kernel(action);
                changed |= self.tick();
                changed
            }
            Err(_) => self.poll_file_watcher(),
        }
    }

    /// Pumps until `done` holds for the state or `timeout` elapses. Returns
    /// whether the condition was met.
    pub fn run_until<F>(&mut self, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut(&AppState) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if done(self.store.state()) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            self.pump(remaining.min(PUMP_SLICE));
        }
    }

    /// Pumps until no remote mutation is awaiting an answer.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        self.run_until(timeout, |state| state.pending.is_empty())
    }
}
