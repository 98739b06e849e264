//! Single-receiver channel carrying render payloads to the mounted root.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use typeclient_core::Context;
use typeclient_ui::{Component, Node};

use crate::renderer::Renderer;

/// Layout component wrapped around whatever a controller method renders.
/// It receives the rendered slot as its props.
pub type Template = Component<Node>;

/// What the root renders inside the template.
#[derive(Clone, Debug, PartialEq)]
pub enum PortalSlot {
    /// A controller method, rendered against the payload context.
    Renderer(Renderer),
    /// Fixed content, used for fatal errors.
    Fixed(Component<()>),
}

/// Everything the root component needs for one render: the context, an
/// optional template and the slot. The default payload renders nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortalPayload {
    pub context: Option<Context>,
    pub template: Option<Template>,
    pub slot: Option<PortalSlot>,
}

impl PortalPayload {
    pub fn render(context: Context, template: Option<Template>, renderer: Renderer) -> Self {
        Self {
            context: Some(context),
            template,
            slot: Some(PortalSlot::Renderer(renderer)),
        }
    }

    /// Payload replacing the screen with `node` and no template.
    pub fn error(node: Node) -> Self {
        let slot = Component::new("Error", move |_: &()| node.clone());
        Self {
            context: None,
            template: None,
            slot: Some(PortalSlot::Fixed(slot)),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.slot, Some(PortalSlot::Fixed(_)))
    }

    /// Renders the slot, wrapped in the template when one is set.
    pub fn view(&self) -> Node {
        let slot = match (&self.slot, &self.context) {
            (Some(PortalSlot::Renderer(renderer)), Some(ctx)) => renderer.render(ctx),
            (Some(PortalSlot::Fixed(content)), _) => content.render(&()),
            _ => Node::Empty,
        };
        match &self.template {
            Some(template) => template.render(&slot),
            None => slot,
        }
    }
}

type Receiver<P> = Rc<dyn Fn(P)>;

/// Channel with at most one receiver. The first registration wins and is
/// never replaced; dispatches made while nothing is registered are dropped.
pub struct PortalChannel<P: 'static> {
    receiver: RefCell<Option<Receiver<P>>>,
    delivered: Cell<u64>,
    dropped: Cell<u64>,
}

impl<P: 'static> Default for PortalChannel<P> {
    fn default() -> Self {
        Self {
            receiver: RefCell::new(None),
            delivered: Cell::new(0),
            dropped: Cell::new(0),
        }
    }
}

impl<P: 'static> PortalChannel<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `receiver` unless one is already set. Returns whether it
    /// was accepted.
    pub fn register(&self, receiver: impl Fn(P) + 'static) -> bool {
        let mut slot = self.receiver.borrow_mut();
        if slot.is_some() {
            log::trace!("portal receiver already registered, ignoring");
            return false;
        }
        *slot = Some(Rc::new(receiver));
        true
    }

    pub fn is_registered(&self) -> bool {
        self.receiver.borrow().is_some()
    }

    /// Hands `payload` to the receiver. Returns `false` when it was dropped.
    pub fn dispatch(&self, payload: P) -> bool {
        let receiver = self.receiver.borrow().clone();
        match receiver {
            Some(receiver) => {
                self.delivered.set(self.delivered.get() + 1);
                receiver(payload);
                true
            }
            None => {
                self.dropped.set(self.dropped.get() + 1);
                log::trace!("no portal receiver registered, dropping payload");
                false
            }
        }
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.get()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }
}

impl<P: 'static> fmt::Debug for PortalChannel<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalChannel")
            .field("registered", &self.is_registered())
            .field("delivered", &self.delivered.get())
            .field("dropped", &self.dropped.get())
            .finish()
    }
}
