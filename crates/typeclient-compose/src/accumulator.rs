use std::cell::RefCell;
use std::fmt;

use typeclient_core::{ApplicationError, BeforeContextCreate, StateRecord};

use crate::renderer::{Renderer, RendererCache};

struct Accumulated {
    renderer: Renderer,
    state: StateRecord,
}

/// Keeps the state of the most recently rendered method.
///
/// Consecutive requests that resolve to the same [`Renderer`] merge their
/// state into the record kept so far (later keys win). A request for any
/// other renderer starts over from its own state.
#[derive(Default)]
pub struct StateAccumulator {
    slot: RefCell<Option<Accumulated>>,
}

impl StateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds `incoming` into the accumulated record and returns a snapshot
    /// of the result.
    pub fn accumulate(&self, renderer: &Renderer, incoming: StateRecord) -> StateRecord {
        let replaced = {
            let mut slot = self.slot.borrow_mut();
            match slot.as_mut() {
                Some(current) if current.renderer == *renderer => {
                    current.state.extend(incoming);
                    return current.state.clone();
                }
                _ => {
                    log::debug!("state reset for renderer `{}`", renderer.key());
                    slot.replace(Accumulated {
                        renderer: renderer.clone(),
                        state: incoming.clone(),
                    })
                }
            }
        };
        drop(replaced);
        incoming
    }

    /// Before-context-create hook body: resolves the renderer for the
    /// request, accumulates its state and passes the result to `next`.
    pub fn before_context_create(
        &self,
        cache: &RendererCache,
        props: BeforeContextCreate,
    ) -> Result<(), ApplicationError> {
        let BeforeContextCreate {
            controller,
            key,
            state,
            next,
        } = props;
        let renderer = cache.resolve(&controller, &key)?;
        let record = self.accumulate(&renderer, state.resolve());
        next(record);
        Ok(())
    }

    /// Snapshot of the accumulated record, if any request was seen.
    pub fn current(&self) -> Option<StateRecord> {
        self.slot
            .borrow()
            .as_ref()
            .map(|current| current.state.clone())
    }

    pub fn renderer(&self) -> Option<Renderer> {
        self.slot
            .borrow()
            .as_ref()
            .map(|current| current.renderer.clone())
    }

    pub fn clear(&self) {
        let cleared = self.slot.borrow_mut().take();
        drop(cleared);
    }
}

impl fmt::Debug for StateAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("StateAccumulator")
            .field("renderer", &slot.as_ref().map(|current| &current.renderer))
            .field("state", &slot.as_ref().map(|current| &current.state))
            .finish()
    }
}
