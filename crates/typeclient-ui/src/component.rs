use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::composer;
use crate::Node;

pub type ComponentId = usize;

static NEXT_COMPONENT_ID: AtomicUsize = AtomicUsize::new(1);

struct ComponentInner<P: 'static> {
    id: ComponentId,
    name: Rc<str>,
    render: Box<dyn Fn(&P) -> Node>,
}

/// Function component with reference identity.
///
/// Two clones of the same component compare equal; two components built from
/// identical closures do not. The composition keys its groups by this
/// identity, so handing it a freshly built component at the same position
/// remounts that subtree.
pub struct Component<P: 'static> {
    inner: Rc<ComponentInner<P>>,
}

impl<P: 'static> Component<P> {
    pub fn new(name: impl Into<Rc<str>>, render: impl Fn(&P) -> Node + 'static) -> Self {
        Self {
            inner: Rc::new(ComponentInner {
                id: NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed),
                name: name.into(),
                render: Box::new(render),
            }),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Renders the component. Inside a render pass this opens a group so
    /// `remember` calls made by the component are kept across passes.
    pub fn render(&self, props: &P) -> Node {
        let entered = composer::enter_group(self.inner.id, &self.inner.name);
        let node = (self.inner.render)(props);
        if entered {
            composer::exit_group();
        }
        node
    }
}

impl<P: 'static> Clone for Component<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: 'static> PartialEq for Component<P> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<P: 'static> Eq for Component<P> {}

impl<P: 'static> fmt::Debug for Component<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .finish()
    }
}
