use std::any::Any;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::composer::{self, LocalKey};

static NEXT_LOCAL_KEY: AtomicUsize = AtomicUsize::new(1);

/// Value handed down the component tree without threading it through props.
#[derive(Clone)]
pub struct CompositionLocal<T: Clone + 'static> {
    key: LocalKey,
    default: Rc<dyn Fn() -> T>,
}

impl<T: Clone + 'static> PartialEq for CompositionLocal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: Clone + 'static> Eq for CompositionLocal<T> {}

impl<T: Clone + 'static> CompositionLocal<T> {
    /// Makes `value` the current value for everything rendered by `content`.
    pub fn provide<R>(&self, value: T, content: impl FnOnce() -> R) -> R {
        let pushed = composer::push_local(self.key, Rc::new(value) as Rc<dyn Any>);
        let result = content();
        if pushed {
            composer::pop_local();
        }
        result
    }

    pub fn current(&self) -> T {
        composer::read_local(self.key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
            .unwrap_or_else(|| self.default_value())
    }

    pub fn default_value(&self) -> T {
        (self.default)()
    }
}

#[allow(non_snake_case)]
pub fn compositionLocalOf<T: Clone + 'static>(
    default: impl Fn() -> T + 'static,
) -> CompositionLocal<T> {
    CompositionLocal {
        key: NEXT_LOCAL_KEY.fetch_add(1, Ordering::Relaxed),
        default: Rc::new(default),
    }
}
