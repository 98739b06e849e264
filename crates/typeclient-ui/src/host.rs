use std::cell::RefCell;
use std::rc::Rc;

use crate::Node;

/// Mount point receiving every tree a [`Composition`](crate::Composition) commits.
pub trait Host {
    fn commit(&mut self, tree: &Node);

    /// Called once when the composition is disposed.
    fn clear(&mut self) {}
}

#[derive(Debug, Default)]
struct MemoryHostState {
    tree: Node,
    commits: usize,
    cleared: bool,
}

/// In-memory host. Clones share the same mount point, so a test can keep one
/// handle while the composition owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    state: Rc<RefCell<MemoryHostState>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> Node {
        self.state.borrow().tree.clone()
    }

    pub fn markup(&self) -> String {
        self.state.borrow().tree.to_markup()
    }

    pub fn commits(&self) -> usize {
        self.state.borrow().commits
    }

    pub fn is_cleared(&self) -> bool {
        self.state.borrow().cleared
    }
}

impl Host for MemoryHost {
    fn commit(&mut self, tree: &Node) {
        let mut state = self.state.borrow_mut();
        state.tree = tree.clone();
        state.commits += 1;
        state.cleared = false;
    }

    fn clear(&mut self) {
        let mut state = self.state.borrow_mut();
        state.tree = Node::Empty;
        state.cleared = true;
    }
}

impl<H: Host + ?Sized> Host for Box<H> {
    fn commit(&mut self, tree: &Node) {
        (**self).commit(tree);
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}
