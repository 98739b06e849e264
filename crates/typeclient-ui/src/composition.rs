use std::fmt;

use crate::composer::{self, Group};
use crate::host::Host;
use crate::runtime::{RecomposeScope, Runtime};
use crate::Node;

/// A mounted tree: root content, the host it commits into and the group
/// state kept between passes.
pub struct Composition {
    runtime: Runtime,
    scope: RecomposeScope,
    root: Option<Group>,
    content: Box<dyn Fn() -> Node>,
    host: Box<dyn Host>,
    tree: Node,
    mounts: u64,
    passes: u64,
}

impl Composition {
    /// Renders `content` once and commits the result into `host`.
    pub fn mount(
        runtime: Runtime,
        host: impl Host + 'static,
        content: impl Fn() -> Node + 'static,
    ) -> Self {
        let scope = RecomposeScope::new(runtime.handle());
        let mut composition = Self {
            runtime,
            scope,
            root: Some(Group::root()),
            content: Box::new(content),
            host: Box::new(host),
            tree: Node::Empty,
            mounts: 0,
            passes: 0,
        };
        composition.render();
        composition
    }

    /// Runs a full pass regardless of invalidation.
    pub fn render(&mut self) {
        self.scope.begin_pass();
        let root = self.root.take().unwrap_or_else(Group::root);
        let output = composer::run_pass(self.scope.clone(), root, || (self.content)());
        self.root = Some(output.root);
        self.mounts += output.mounts;
        self.passes += 1;
        self.host.commit(&output.tree);
        self.tree = output.tree;
    }

    pub fn should_render(&self) -> bool {
        self.scope.is_invalid()
    }

    /// Re-renders when state read by the last pass has changed since.
    /// Returns whether a pass ran.
    pub fn recompose(&mut self) -> bool {
        if !self.should_render() {
            return false;
        }
        self.render();
        true
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    /// Components mounted over the lifetime of this composition.
    pub fn mount_count(&self) -> u64 {
        self.mounts
    }

    pub fn pass_count(&self) -> u64 {
        self.passes
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Drops every remembered value (running disposers) and clears the host.
    pub fn dispose(mut self) {
        drop(self.root.take());
        self.host.clear();
    }
}

impl fmt::Debug for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composition")
            .field("tree", &self.tree)
            .field("mounts", &self.mounts)
            .field("passes", &self.passes)
            .finish()
    }
}
