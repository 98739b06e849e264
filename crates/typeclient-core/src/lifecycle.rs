use typeclient_ui::Node;

use crate::{AnnotationMethod, ApplicationError, Context, Controller, LifecycleHooks};

/// Entry points a rendering integration implements. The [`Application`](crate::Application)
/// calls them at startup, for every render request and on fatal errors.
pub trait ApplicationLifecycle {
    /// Registers hooks. Called once while the application is constructed.
    fn install(&self, hooks: &LifecycleHooks) {
        let _ = hooks;
    }

    /// One-time setup. Implementations call `next` once they are ready.
    fn application_initialize(&self, next: Box<dyn FnOnce()>) -> Result<(), ApplicationError>;

    fn application_component_render(
        &self,
        ctx: &Context,
        controller: &Controller,
        key: &str,
        metadata: &AnnotationMethod,
    ) -> Result<(), ApplicationError>;

    fn application_error_render(&self, node: Node);
}
