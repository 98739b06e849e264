use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use typeclient_ui::Node;

use crate::metadata::{AnnotationMethod, MethodMeta};
use crate::{
    ApplicationError, ApplicationLifecycle, Context, Controller, LifecycleHooks, StateInit,
};

#[derive(Debug, Clone)]
pub struct ApplicationOptions {
    name: String,
}

impl Default for ApplicationOptions {
    fn default() -> Self {
        Self {
            name: "TypeClient".to_string(),
        }
    }
}

impl ApplicationOptions {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A controller method checked to exist when the route was declared.
#[derive(Clone, Debug)]
pub struct Route {
    controller: Controller,
    metadata: AnnotationMethod,
}

impl Route {
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn key(&self) -> &str {
        &self.metadata.key
    }
}

/// Application runtime: owns the lifecycle integration and its hooks, and
/// turns render requests into contexts.
pub struct Application<L: ApplicationLifecycle> {
    options: ApplicationOptions,
    lifecycle: Rc<L>,
    hooks: LifecycleHooks,
    started: Rc<Cell<bool>>,
    next_context_id: Cell<u64>,
}

impl<L: ApplicationLifecycle> Application<L> {
    pub fn new(options: ApplicationOptions, lifecycle: L) -> Self {
        let hooks = LifecycleHooks::new();
        lifecycle.install(&hooks);
        Self {
            options,
            lifecycle: Rc::new(lifecycle),
            hooks,
            started: Rc::new(Cell::new(false)),
            next_context_id: Cell::new(1),
        }
    }

    pub fn options(&self) -> &ApplicationOptions {
        &self.options
    }

    pub fn lifecycle(&self) -> &Rc<L> {
        &self.lifecycle
    }

    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    /// Runs the lifecycle's one-time initialization. Later calls are no-ops.
    pub fn start(&self) -> Result<(), ApplicationError> {
        if self.started.get() {
            log::debug!("application `{}` already started", self.options.name);
            return Ok(());
        }
        let started = Rc::clone(&self.started);
        let name = self.options.name.clone();
        self.lifecycle.application_initialize(Box::new(move || {
            log::info!("application `{name}` ready");
            started.set(true);
        }))
    }

    /// Declares a render target. Fails when the controller has no render
    /// method named `key`.
    pub fn route(&self, controller: &Controller, key: &str) -> Result<Route, ApplicationError> {
        if !controller.class().has_method(key) {
            return Err(ApplicationError::MissingMethod {
                class: controller.name().to_string(),
                key: key.to_string(),
            });
        }
        Ok(Route {
            controller: controller.clone(),
            metadata: AnnotationMethod {
                key: key.to_string(),
                meta: MethodMeta {
                    parent: Rc::clone(controller.class().metadata()),
                },
            },
        })
    }

    /// Handles one render request: runs the before-context-create hook,
    /// builds the context from the state it produced and hands everything
    /// to the lifecycle. Returns the context so callers can drive its
    /// status afterwards.
    pub fn render(
        &self,
        route: &Route,
        state: impl Into<StateInit>,
    ) -> Result<Context, ApplicationError> {
        let record = self.hooks.run_before_context_create(
            &route.controller,
            route.key(),
            state.into(),
        )?;
        let id = self.next_context_id.get();
        self.next_context_id.set(id + 1);
        let ctx = Context::new(id, route.controller.name(), route.key(), record);
        log::debug!(
            "render request #{id} for {}::{}",
            route.controller.name(),
            route.key()
        );
        self.lifecycle.application_component_render(
            &ctx,
            &route.controller,
            route.key(),
            &route.metadata,
        )?;
        Ok(ctx)
    }

    /// Reports a fatal error to the lifecycle, replacing whatever is shown.
    pub fn render_error(&self, node: impl Into<Node>) {
        log::warn!("application `{}` rendering fatal error", self.options.name);
        self.lifecycle.application_error_render(node.into());
    }
}

impl<L: ApplicationLifecycle> fmt::Debug for Application<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("options", &self.options)
            .field("hooks", &self.hooks)
            .field("started", &self.started.get())
            .finish()
    }
}
