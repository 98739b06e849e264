use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{ApplicationError, Controller, StateInit, StateRecord};

/// Props passed to the before-context-create hook. The hook must call
/// `next` exactly once with the state the context should be built from.
pub struct BeforeContextCreate {
    pub controller: Controller,
    pub key: String,
    pub state: StateInit,
    pub next: Box<dyn FnOnce(StateRecord)>,
}

impl fmt::Debug for BeforeContextCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeforeContextCreate")
            .field("controller", &self.controller)
            .field("key", &self.key)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

type BeforeContextCreateHook = Rc<dyn Fn(BeforeContextCreate) -> Result<(), ApplicationError>>;

/// Interceptors the application runtime calls at fixed points of a render
/// request.
#[derive(Default)]
pub struct LifecycleHooks {
    before_context_create: RefCell<Option<BeforeContextCreateHook>>,
}

impl LifecycleHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the before-context-create hook, replacing any previous one.
    pub fn set_before_context_create(
        &self,
        hook: impl Fn(BeforeContextCreate) -> Result<(), ApplicationError> + 'static,
    ) {
        *self.before_context_create.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn has_before_context_create(&self) -> bool {
        self.before_context_create.borrow().is_some()
    }

    /// Runs the hook and returns the state it passed to `next`. Without a
    /// hook the incoming state is resolved and returned as is.
    pub fn run_before_context_create(
        &self,
        controller: &Controller,
        key: &str,
        state: StateInit,
    ) -> Result<StateRecord, ApplicationError> {
        let hook = self.before_context_create.borrow().clone();
        let Some(hook) = hook else {
            return Ok(state.resolve());
        };
        let produced: Rc<RefCell<Option<StateRecord>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&produced);
        hook(BeforeContextCreate {
            controller: controller.clone(),
            key: key.to_string(),
            state,
            next: Box::new(move |record| {
                sink.borrow_mut().replace(record);
            }),
        })?;
        let record = produced.borrow_mut().take();
        record.ok_or_else(|| ApplicationError::NextNotCalled {
            key: key.to_string(),
        })
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("before_context_create", &self.has_before_context_create())
            .finish()
    }
}
