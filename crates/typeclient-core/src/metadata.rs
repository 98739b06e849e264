use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Namespaced key/value store attached to a controller class. Renderer
/// integrations define their own keys (for example a template component).
#[derive(Default)]
pub struct MetaStore {
    values: IndexMap<&'static str, Rc<dyn Any>>,
}

impl MetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: 'static>(&mut self, key: &'static str, value: V) {
        self.values.insert(key, Rc::new(value));
    }

    /// Value stored under `key`, or `default` when absent or of another type.
    pub fn got<V: Clone + 'static>(&self, key: &str, default: V) -> V {
        self.values
            .get(key)
            .and_then(|value| value.downcast_ref::<V>())
            .cloned()
            .unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }
}

impl fmt::Debug for MetaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

#[derive(Clone, Debug)]
pub struct MethodMeta {
    /// Metadata of the controller class declaring the method.
    pub parent: Rc<MetaStore>,
}

/// Scanned description of one render method, passed to the lifecycle on
/// every render request.
#[derive(Clone, Debug)]
pub struct AnnotationMethod {
    pub key: String,
    pub meta: MethodMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn got_falls_back_to_default() {
        let mut store = MetaStore::new();
        store.set("title", "Inbox".to_string());

        assert_eq!(store.got("title", String::new()), "Inbox");
        assert_eq!(store.got("missing", 7u32), 7);
        assert_eq!(store.got("title", 0u8), 0);
        assert!(store.contains("title"));
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["title"]);
    }
}
