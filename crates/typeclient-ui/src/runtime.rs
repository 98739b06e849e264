use std::cell::Cell;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::collections::map::HashSet;
use crate::platform::{DefaultScheduler, RuntimeScheduler};

pub(crate) type ScopeId = usize;

static NEXT_SCOPE_ID: AtomicUsize = AtomicUsize::new(1);

fn next_scope_id() -> ScopeId {
    NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed)
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    invalid_scopes: RefCell<HashSet<ScopeId>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            invalid_scopes: RefCell::new(HashSet::default()),
        }
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn register_invalid_scope(&self, id: ScopeId) {
        let inserted = self.invalid_scopes.borrow_mut().insert(id);
        if inserted {
            self.schedule();
        }
    }

    fn mark_scope_recomposed(&self, id: ScopeId) {
        let mut invalid = self.invalid_scopes.borrow_mut();
        invalid.remove(&id);
        if invalid.is_empty() {
            self.needs_frame.set(false);
        }
    }
}

#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub(crate) fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(DefaultScheduler))
    }
}

#[derive(Clone)]
pub(crate) struct RuntimeHandle(Weak<RuntimeInner>);

impl RuntimeHandle {
    pub(crate) fn register_invalid_scope(&self, id: ScopeId) {
        if let Some(inner) = self.0.upgrade() {
            inner.register_invalid_scope(id);
        }
    }

    pub(crate) fn mark_scope_recomposed(&self, id: ScopeId) {
        if let Some(inner) = self.0.upgrade() {
            inner.mark_scope_recomposed(id);
        }
    }
}

pub(crate) struct RecomposeScopeInner {
    id: ScopeId,
    runtime: RuntimeHandle,
    invalid: Cell<bool>,
}

/// Subscription target for reactive reads made during a render pass.
#[derive(Clone)]
pub(crate) struct RecomposeScope {
    inner: Rc<RecomposeScopeInner>,
}

impl RecomposeScope {
    pub(crate) fn new(runtime: RuntimeHandle) -> Self {
        Self {
            inner: Rc::new(RecomposeScopeInner {
                id: next_scope_id(),
                runtime,
                invalid: Cell::new(false),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<RecomposeScopeInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn id(&self) -> ScopeId {
        self.inner.id
    }

    pub(crate) fn is_invalid(&self) -> bool {
        self.inner.invalid.get()
    }

    pub(crate) fn invalidate(&self) {
        if !self.inner.invalid.replace(true) {
            self.inner.runtime.register_invalid_scope(self.inner.id);
        }
    }

    /// Clears the invalid flag before a pass. Writes made during the pass
    /// invalidate the scope again and schedule another frame.
    pub(crate) fn begin_pass(&self) {
        if self.inner.invalid.replace(false) {
            self.inner.runtime.mark_scope_recomposed(self.inner.id);
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<RecomposeScopeInner> {
        Rc::downgrade(&self.inner)
    }
}

impl RecomposeScopeInner {
    pub(crate) fn id(&self) -> ScopeId {
        self.id
    }
}
