use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use typeclient_core::{
    AnnotationMethod, ApplicationError, ApplicationLifecycle, Context, Controller, LifecycleHooks,
};
use typeclient_ui::{Composition, Host, Node, Runtime};

use crate::accumulator::StateAccumulator;
use crate::global::global_component;
use crate::namespace::template_of;
use crate::options::ComposeOptions;
use crate::portal::{PortalChannel, PortalPayload};
use crate::renderer::RendererCache;
use crate::slots::SlotState;

/// Lifecycle integration mounting a single root component and routing every
/// render request to it through the portal.
pub struct ComposeApplication {
    options: ComposeOptions,
    runtime: Runtime,
    host: RefCell<Option<Box<dyn Host>>>,
    composition: RefCell<Option<Composition>>,
    rendering: Cell<bool>,
    unmount_pending: Cell<bool>,
    renderers: Rc<RendererCache>,
    accumulator: Rc<StateAccumulator>,
    portal: Rc<PortalChannel<PortalPayload>>,
    slots: SlotState,
}

impl ComposeApplication {
    pub fn new(host: impl Host + 'static, options: ComposeOptions) -> Self {
        let runtime = match options.scheduler() {
            Some(scheduler) => Runtime::new(Arc::clone(scheduler)),
            None => Runtime::default(),
        };
        let host: Box<dyn Host> = Box::new(host);
        Self {
            options,
            runtime,
            host: RefCell::new(Some(host)),
            composition: RefCell::new(None),
            rendering: Cell::new(false),
            unmount_pending: Cell::new(false),
            renderers: Rc::new(RendererCache::new()),
            accumulator: Rc::new(StateAccumulator::new()),
            portal: Rc::new(PortalChannel::new()),
            slots: SlotState::new(),
        }
    }

    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// Registers `receiver` for render payloads. Ignored when the root (or
    /// an earlier call) already registered one.
    pub fn set_portal_receiver(&self, receiver: impl Fn(PortalPayload) + 'static) -> &Self {
        self.portal.register(receiver);
        self
    }

    pub fn portal(&self) -> &PortalChannel<PortalPayload> {
        &self.portal
    }

    pub fn renderers(&self) -> &RendererCache {
        &self.renderers
    }

    pub fn accumulator(&self) -> &StateAccumulator {
        &self.accumulator
    }

    pub fn slot_state(&self) -> &SlotState {
        &self.slots
    }

    pub fn is_mounted(&self) -> bool {
        self.rendering.get() || self.composition.borrow().is_some()
    }

    /// Whether state read by the mounted tree changed since its last pass.
    pub fn should_render(&self) -> bool {
        self.composition
            .borrow()
            .as_ref()
            .is_some_and(Composition::should_render)
    }

    /// Runs one pass if the mounted tree is stale. Returns whether a pass ran.
    ///
    /// The composition is taken out of its cell for the pass, so components
    /// may call back into the application while rendering. Such calls see no
    /// committed tree, and an [`unmount`](Self::unmount) made during the pass
    /// takes effect once it ends.
    pub fn update(&self) -> bool {
        let taken = self.composition.borrow_mut().take();
        let Some(mut composition) = taken else {
            return false;
        };
        self.rendering.set(true);
        let ran = composition.recompose();
        self.rendering.set(false);
        if self.unmount_pending.replace(false) {
            log::debug!("unmounting application root after render pass");
            composition.dispose();
        } else {
            *self.composition.borrow_mut() = Some(composition);
        }
        ran
    }

    /// Re-renders until the tree settles or the configured pass limit is
    /// reached. Returns the number of passes run.
    pub fn flush(&self) -> usize {
        let limit = self.options.flush_limit();
        let mut passes = 0;
        while passes < limit && self.update() {
            passes += 1;
        }
        if passes == limit && self.should_render() {
            log::warn!("tree still invalid after {limit} passes, deferring");
        }
        passes
    }

    /// Last tree committed to the host.
    pub fn tree(&self) -> Option<Node> {
        self.composition
            .borrow()
            .as_ref()
            .map(|composition| composition.tree().clone())
    }

    pub fn mount_count(&self) -> u64 {
        self.composition
            .borrow()
            .as_ref()
            .map_or(0, Composition::mount_count)
    }

    /// Disposes the mounted tree and clears the host.
    pub fn unmount(&self) {
        if self.rendering.get() {
            self.unmount_pending.set(true);
            return;
        }
        let composition = self.composition.borrow_mut().take();
        if let Some(composition) = composition {
            log::debug!("unmounting application root");
            composition.dispose();
        }
    }
}

impl ApplicationLifecycle for ComposeApplication {
    fn install(&self, hooks: &LifecycleHooks) {
        let renderers = Rc::clone(&self.renderers);
        let accumulator = Rc::clone(&self.accumulator);
        hooks.set_before_context_create(move |props| {
            accumulator.before_context_create(&renderers, props)
        });
    }

    fn application_initialize(&self, next: Box<dyn FnOnce()>) -> Result<(), ApplicationError> {
        let host = self.host.borrow_mut().take();
        match host {
            Some(host) => {
                let root = global_component(Rc::clone(&self.portal), self.slots.clone());
                let composition =
                    Composition::mount(self.runtime.clone(), host, move || root.render(&()));
                *self.composition.borrow_mut() = Some(composition);
                log::debug!("mounted application root");
            }
            None => log::debug!("application root already mounted or disposed"),
        }
        next();
        Ok(())
    }

    fn application_component_render(
        &self,
        ctx: &Context,
        controller: &Controller,
        key: &str,
        metadata: &AnnotationMethod,
    ) -> Result<(), ApplicationError> {
        let template = template_of(&metadata.meta.parent);
        let renderer = self.renderers.resolve(controller, key)?;
        self.portal
            .dispatch(PortalPayload::render(ctx.clone(), template, renderer));
        Ok(())
    }

    fn application_error_render(&self, node: Node) {
        self.portal.dispatch(PortalPayload::error(node));
    }
}

impl fmt::Debug for ComposeApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeApplication")
            .field("options", &self.options)
            .field("mounted", &self.is_mounted())
            .field("renderers", &self.renderers)
            .field("portal", &self.portal)
            .finish()
    }
}
