//! Platform abstraction for scheduling frames.
//!
//! The runtime never renders on its own. When reactive state changes it asks
//! the host platform for a frame and the host decides when to call
//! [`Composition::recompose`](crate::Composition::recompose).

use std::sync::atomic::{AtomicBool, Ordering};

/// Schedules work for the runtime.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}

/// Scheduler that ignores frame requests. Callers poll
/// [`Composition::should_render`](crate::Composition::should_render) instead.
#[derive(Debug, Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

/// Scheduler that records frame requests for a host loop to poll.
#[derive(Debug)]
pub struct StdScheduler {
    frame_requested: AtomicBool,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            frame_requested: AtomicBool::new(false),
        }
    }

    /// Returns whether a frame has been requested since the last call.
    pub fn take_frame_request(&self) -> bool {
        self.frame_requested.swap(false, Ordering::SeqCst)
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_frame(&self) {
        self.frame_requested.store(true, Ordering::SeqCst);
    }
}
