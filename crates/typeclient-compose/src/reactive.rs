//! Context access and reactive reads for components rendered by a
//! [`Renderer`](crate::Renderer).

use typeclient_core::{Context, StateRecord};
use typeclient_ui::{compositionLocalOf, CompositionLocal};

thread_local! {
    static CONTEXT: CompositionLocal<Option<Context>> = compositionLocalOf(|| None);
}

fn context_local() -> CompositionLocal<Option<Context>> {
    CONTEXT.with(CompositionLocal::clone)
}

/// Makes `ctx` the context seen by [`use_context`] inside `content`.
pub fn provide_context<R>(ctx: Context, content: impl FnOnce() -> R) -> R {
    context_local().provide(Some(ctx), content)
}

/// Context of the nearest enclosing renderer, if any.
pub fn use_context() -> Option<Context> {
    context_local().current()
}

/// Evaluates `read` so that every reactive cell it reads re-renders the
/// calling component when it changes.
pub fn use_reactive_state<T>(read: impl FnOnce() -> T) -> T {
    read()
}

/// Projects the current context's state record. Returns `None` outside a
/// renderer.
pub fn use_context_state<T>(select: impl FnOnce(&StateRecord) -> T) -> Option<T> {
    let ctx = use_context()?;
    Some(use_reactive_state(|| ctx.state().with(select)))
}
