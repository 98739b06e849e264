//! Memoized renderers, one per controller class and render method.
//!
//! A renderer is a [`Component`] and the composition keys its groups by
//! component identity, so handing the portal the same renderer for repeated
//! requests keeps the mounted subtree (and everything it remembered) alive.
//! Building a new renderer per request would remount on every navigation.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use typeclient_core::{ApplicationError, Context, Controller, ControllerClass, STATUS_FATAL};
use typeclient_ui::collections::map::HashMap;
use typeclient_ui::{Component, ComponentId, Node};

use crate::reactive::{provide_context, use_reactive_state};

/// Stable component rendering one controller method against a [`Context`].
///
/// The outer layer makes the context available to descendants, the middle
/// layer tracks `status` and `error`, and the inner layer calls the method.
/// While the context status is [`STATUS_FATAL`] the method is not called.
#[derive(Clone)]
pub struct Renderer {
    component: Component<Context>,
    key: Rc<str>,
}

impl Renderer {
    fn build(controller: &Controller, key: &str) -> Result<Self, ApplicationError> {
        let method = controller.bind(key)?;
        let label = format!("{}::{}", controller.name(), key);

        let view = Component::new(label.as_str(), move |ctx: &Context| method(ctx));
        let checker = Component::new(format!("{label}#checker"), move |ctx: &Context| {
            let (status, error) =
                use_reactive_state(|| (ctx.status().value(), ctx.error().value()));
            if status == STATUS_FATAL {
                error.unwrap_or_default()
            } else {
                view.render(ctx)
            }
        });
        let component = Component::new(label.as_str(), move |ctx: &Context| {
            provide_context(ctx.clone(), || checker.render(ctx))
        });

        Ok(Self {
            component,
            key: Rc::from(key),
        })
    }

    pub fn render(&self, ctx: &Context) -> Node {
        self.component.render(ctx)
    }

    pub fn id(&self) -> ComponentId {
        self.component.id()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.component.ptr_eq(&other.component)
    }
}

impl PartialEq for Renderer {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Renderer {}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("id", &self.component.id())
            .field("name", &self.component.name())
            .finish()
    }
}

struct ClassEntry {
    class: Weak<ControllerClass>,
    renderers: HashMap<String, Renderer>,
}

impl ClassEntry {
    fn new(class: &Rc<ControllerClass>) -> Self {
        Self {
            class: Rc::downgrade(class),
            renderers: HashMap::default(),
        }
    }

    fn is_for(&self, class: &Rc<ControllerClass>) -> bool {
        self.class
            .upgrade()
            .is_some_and(|live| Rc::ptr_eq(&live, class))
    }
}

/// Cache from controller class identity to method key to [`Renderer`].
///
/// Classes are held weakly: once the last strong reference to a class is
/// gone its entry is swept on the next miss and its renderers are released.
/// The renderer for a method binds the controller instance seen on the first
/// request; later instances of the same class reuse it.
#[derive(Default)]
pub struct RendererCache {
    classes: RefCell<HashMap<usize, ClassEntry>>,
}

impl RendererCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer for `controller`'s method `key`, built on first use.
    pub fn resolve(&self, controller: &Controller, key: &str) -> Result<Renderer, ApplicationError> {
        let class = controller.class();
        let slot = class_slot(class);
        if let Some(renderer) = self.lookup(class, slot, key) {
            return Ok(renderer);
        }

        let renderer = Renderer::build(controller, key)?;
        log::debug!(
            "built renderer #{} for {}::{key}",
            renderer.id(),
            controller.name()
        );

        let released = {
            let mut classes = self.classes.borrow_mut();
            let mut released = sweep(&mut classes);
            let entry = classes
                .entry(slot)
                .or_insert_with(|| ClassEntry::new(class));
            if !entry.is_for(class) {
                released.push(std::mem::replace(entry, ClassEntry::new(class)));
            }
            entry.renderers.insert(key.to_string(), renderer.clone());
            released
        };
        drop(released);
        Ok(renderer)
    }

    /// Cached renderer without building one.
    pub fn get(&self, controller: &Controller, key: &str) -> Option<Renderer> {
        let class = controller.class();
        self.lookup(class, class_slot(class), key)
    }

    /// Drops every renderer cached for `class`. Returns whether any existed.
    pub fn evict(&self, class: &Rc<ControllerClass>) -> bool {
        let removed = {
            let mut classes = self.classes.borrow_mut();
            match classes.get(&class_slot(class)) {
                Some(entry) if entry.is_for(class) => classes.remove(&class_slot(class)),
                _ => None,
            }
        };
        removed.is_some()
    }

    /// Number of classes with live cache entries.
    pub fn class_count(&self) -> usize {
        self.classes
            .borrow()
            .values()
            .filter(|entry| entry.class.strong_count() > 0)
            .count()
    }

    pub fn renderer_count(&self) -> usize {
        self.classes
            .borrow()
            .values()
            .filter(|entry| entry.class.strong_count() > 0)
            .map(|entry| entry.renderers.len())
            .sum()
    }

    #[cfg(test)]
    pub(crate) fn entry_count(&self) -> usize {
        self.classes.borrow().len()
    }

    fn lookup(&self, class: &Rc<ControllerClass>, slot: usize, key: &str) -> Option<Renderer> {
        let classes = self.classes.borrow();
        let entry = classes.get(&slot)?;
        if !entry.is_for(class) {
            return None;
        }
        entry.renderers.get(key).cloned()
    }
}

impl fmt::Debug for RendererCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererCache")
            .field("classes", &self.class_count())
            .field("renderers", &self.renderer_count())
            .finish()
    }
}

fn class_slot(class: &Rc<ControllerClass>) -> usize {
    Rc::as_ptr(class) as usize
}

fn sweep(classes: &mut HashMap<usize, ClassEntry>) -> Vec<ClassEntry> {
    let dead: Vec<usize> = classes
        .iter()
        .filter(|(_, entry)| entry.class.strong_count() == 0)
        .map(|(slot, _)| *slot)
        .collect();
    if !dead.is_empty() {
        log::debug!("releasing renderers of {} dropped controller classes", dead.len());
    }
    dead.iter().filter_map(|slot| classes.remove(slot)).collect()
}
