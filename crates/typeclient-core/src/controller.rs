//! Controller classes and their render-method capability tables.
//!
//! A [`ControllerClass`] is the identity the render bridge caches against.
//! Its render methods are registered up front through
//! [`ControllerClassBuilder::render`], so a route naming an unknown method is
//! rejected when the route is declared rather than when it first renders.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use indexmap::IndexMap;
use typeclient_ui::Node;

use crate::metadata::MetaStore;
use crate::{ApplicationError, Context};

/// Render method bound to one controller instance.
pub type BoundMethod = Rc<dyn Fn(&Context) -> Node>;

type ErasedMethod = Rc<dyn Fn(Rc<dyn Any>) -> Option<BoundMethod>>;

#[derive(Default)]
pub struct RenderMethods {
    methods: IndexMap<String, ErasedMethod>,
}

impl RenderMethods {
    pub fn contains(&self, key: &str) -> bool {
        self.methods.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.methods.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    fn get(&self, key: &str) -> Option<&ErasedMethod> {
        self.methods.get(key)
    }
}

impl fmt::Debug for RenderMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.methods.keys()).finish()
    }
}

pub struct ControllerClass {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    methods: RenderMethods,
    metadata: Rc<MetaStore>,
}

impl ControllerClass {
    pub fn builder<T: 'static>(name: impl Into<String>) -> ControllerClassBuilder<T> {
        ControllerClassBuilder {
            name: name.into(),
            methods: IndexMap::new(),
            metadata: MetaStore::new(),
            duplicate: None,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &RenderMethods {
        &self.methods
    }

    pub fn has_method(&self, key: &str) -> bool {
        self.methods.contains(key)
    }

    pub fn metadata(&self) -> &Rc<MetaStore> {
        &self.metadata
    }

    /// Wraps `value` as an instance of this class.
    pub fn instantiate<T: 'static>(
        self: &Rc<Self>,
        value: T,
    ) -> Result<Controller, ApplicationError> {
        if TypeId::of::<T>() != self.type_id {
            return Err(ApplicationError::InstanceMismatch {
                class: self.name.clone(),
                expected: self.type_name,
            });
        }
        Ok(Controller {
            class: Rc::clone(self),
            instance: Rc::new(value),
        })
    }
}

impl fmt::Debug for ControllerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerClass")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("methods", &self.methods)
            .field("metadata", &self.metadata)
            .finish()
    }
}

pub struct ControllerClassBuilder<T> {
    name: String,
    methods: IndexMap<String, ErasedMethod>,
    metadata: MetaStore,
    duplicate: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> ControllerClassBuilder<T> {
    pub fn render(
        mut self,
        key: impl Into<String>,
        method: impl Fn(&T, &Context) -> Node + 'static,
    ) -> Self {
        let key = key.into();
        let method = Rc::new(method);
        let erased: ErasedMethod = Rc::new(move |instance: Rc<dyn Any>| {
            let instance = instance.downcast::<T>().ok()?;
            let method = Rc::clone(&method);
            let bound: BoundMethod = Rc::new(move |ctx: &Context| method(&*instance, ctx));
            Some(bound)
        });
        if self.methods.insert(key.clone(), erased).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(key);
        }
        self
    }

    pub fn meta<V: 'static>(mut self, key: &'static str, value: V) -> Self {
        self.metadata.set(key, value);
        self
    }

    pub fn build(self) -> Result<Rc<ControllerClass>, ApplicationError> {
        if let Some(key) = self.duplicate {
            return Err(ApplicationError::DuplicateMethod {
                class: self.name,
                key,
            });
        }
        Ok(Rc::new(ControllerClass {
            name: self.name,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            methods: RenderMethods {
                methods: self.methods,
            },
            metadata: Rc::new(self.metadata),
        }))
    }
}

/// Controller instance together with the class it was created from.
#[derive(Clone)]
pub struct Controller {
    class: Rc<ControllerClass>,
    instance: Rc<dyn Any>,
}

impl Controller {
    pub fn class(&self) -> &Rc<ControllerClass> {
        &self.class
    }

    pub fn name(&self) -> &str {
        self.class.name()
    }

    /// Binds the render method `key` to this instance.
    pub fn bind(&self, key: &str) -> Result<BoundMethod, ApplicationError> {
        let method = self
            .class
            .methods
            .get(key)
            .ok_or_else(|| ApplicationError::MissingMethod {
                class: self.class.name.clone(),
                key: key.to_string(),
            })?;
        method(Rc::clone(&self.instance)).ok_or_else(|| ApplicationError::InstanceMismatch {
            class: self.class.name.clone(),
            expected: self.class.type_name,
        })
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("class", &self.class.name)
            .finish()
    }
}
