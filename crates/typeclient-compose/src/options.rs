use std::fmt;
use std::sync::Arc;

use typeclient_ui::RuntimeScheduler;

pub const DEFAULT_FLUSH_LIMIT: usize = 8;

/// Settings for a [`ComposeApplication`](crate::ComposeApplication).
#[derive(Clone)]
pub struct ComposeOptions {
    flush_limit: usize,
    scheduler: Option<Arc<dyn RuntimeScheduler>>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            flush_limit: DEFAULT_FLUSH_LIMIT,
            scheduler: None,
        }
    }
}

impl ComposeOptions {
    /// Maximum passes a single [`flush`](crate::ComposeApplication::flush) runs.
    pub fn with_flush_limit(mut self, limit: usize) -> Self {
        self.flush_limit = limit.max(1);
        self
    }

    /// Scheduler notified whenever the mounted tree needs a new frame.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn flush_limit(&self) -> usize {
        self.flush_limit
    }

    pub fn scheduler(&self) -> Option<&Arc<dyn RuntimeScheduler>> {
        self.scheduler.as_ref()
    }
}

impl fmt::Debug for ComposeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeOptions")
            .field("flush_limit", &self.flush_limit)
            .field("scheduler", &self.scheduler.is_some())
            .finish()
    }
}
