use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::interaction::InteractionKey;

/// What a scheduled frame callback does when it fires. One entry point per
/// controller; no stored closures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickTarget {
    Inertia(InteractionKey),
    SmoothEnd(InteractionKey),
    AutoScroll,
}

/// Handle to one pending frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickHandle(u64);

/// Queue of callbacks to run once before the next display refresh.
///
/// The host drains it once per refresh via `Scope::run_frame`. A request
/// made while the frame is being dispatched lands in the following frame;
/// a cancel made while it is being dispatched still prevents the cancelled
/// tick from running.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Vec<(TickHandle, TickTarget)>,
    next_handle: u64,
}

impl FrameScheduler {
    pub fn request(&mut self, target: TickTarget) -> TickHandle {
        self.next_handle += 1;
        let handle = TickHandle(self.next_handle);
        self.pending.push((handle, target));
        handle
    }

    /// Removes a pending tick. Cancelling an already-fired or never-set
    /// handle is a no-op.
    pub fn cancel(&mut self, handle: TickHandle) {
        self.pending.retain(|(pending, _)| *pending != handle);
    }

    /// Handles pending right now; the frame dispatch snapshot.
    pub fn due(&self) -> Vec<TickHandle> {
        self.pending.iter().map(|(handle, _)| *handle).collect()
    }

    /// Claims one pending tick for dispatch; `None` if it was cancelled.
    pub fn take(&mut self, handle: TickHandle) -> Option<TickTarget> {
        let index = self
            .pending
            .iter()
            .position(|(pending, _)| *pending == handle)?;
        Some(self.pending.remove(index).1)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Time source for the simulations, in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Monotonic clock anchored at construction.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock for deterministic hosts and tests. Cloning
/// shares the underlying time cell; everything here runs on one thread.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, by_ms: f64) {
        self.now.set(self.now.get() + by_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
