#![doc = r"Application lifecycle runtime: controllers, contexts, hooks and the lifecycle contract rendering integrations implement."]

mod application;
mod context;
pub mod controller;
mod error;
mod hooks;
mod lifecycle;
pub mod metadata;

pub use application::{Application, ApplicationOptions, Route};
pub use context::{state_from, Context, StateInit, StateRecord, STATUS_FATAL, STATUS_OK};
pub use controller::{
    BoundMethod, Controller, ControllerClass, ControllerClassBuilder, RenderMethods,
};
pub use error::ApplicationError;
pub use hooks::{BeforeContextCreate, LifecycleHooks};
pub use lifecycle::ApplicationLifecycle;
pub use metadata::{AnnotationMethod, MetaStore, MethodMeta};
