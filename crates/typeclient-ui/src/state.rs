use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::composer;
use crate::runtime::{RecomposeScope, RecomposeScopeInner};

struct MutableStateInner<T: 'static> {
    value: RefCell<T>,
    watchers: RefCell<Vec<Weak<RecomposeScopeInner>>>,
}

/// Read-only view of a [`MutableState`].
pub struct State<T: 'static> {
    inner: Rc<MutableStateInner<T>>,
}

/// Reactive cell. Reads made inside a render pass subscribe the composition,
/// writes invalidate every subscribed composition.
///
/// Closures passed to [`MutableState::with`] and [`MutableState::update`]
/// must not touch the same cell again.
pub struct MutableState<T: 'static> {
    inner: Rc<MutableStateInner<T>>,
}

impl<T: 'static> PartialEq for State<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Eq for State<T> {}

impl<T: 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> PartialEq for MutableState<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Eq for MutableState<T> {}

impl<T: Default + 'static> Default for MutableState<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: 'static> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> MutableState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(MutableStateInner {
                value: RefCell::new(value),
                watchers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn as_state(&self) -> State<T> {
        State {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.as_state().with(f)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value)
        };
        self.notify_watchers();
        result
    }

    pub fn replace(&self, value: T) -> T {
        let previous = self.inner.value.replace(value);
        self.notify_watchers();
        previous
    }

    pub fn set(&self, value: T) {
        drop(self.replace(value));
    }

    /// Number of live compositions currently subscribed to this cell.
    pub fn watcher_count(&self) -> usize {
        let mut watchers = self.inner.watchers.borrow_mut();
        watchers.retain(|w| w.strong_count() > 0);
        watchers.len()
    }

    fn notify_watchers(&self) {
        let watchers: Vec<RecomposeScope> = {
            let mut watchers = self.inner.watchers.borrow_mut();
            watchers.retain(|w| w.strong_count() > 0);
            watchers
                .iter()
                .filter_map(|w| w.upgrade())
                .map(RecomposeScope::from_inner)
                .collect()
        };

        for watcher in watchers {
            watcher.invalidate();
        }
    }
}

impl<T: Clone + 'static> MutableState<T> {
    pub fn value(&self) -> T {
        self.as_state().value()
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

impl<T: 'static> State<T> {
    fn subscribe_current_scope(&self) {
        if let Some(scope) = composer::current_scope() {
            let mut watchers = self.inner.watchers.borrow_mut();
            watchers.retain(|w| w.strong_count() > 0);
            let id = scope.id();
            let already_registered = watchers
                .iter()
                .any(|w| w.upgrade().map(|inner| inner.id() == id).unwrap_or(false));
            if !already_registered {
                watchers.push(scope.downgrade());
            }
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.subscribe_current_scope();
        let value = self.inner.value.borrow();
        f(&value)
    }
}

impl<T: Clone + 'static> State<T> {
    pub fn value(&self) -> T {
        self.with(T::clone)
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}
