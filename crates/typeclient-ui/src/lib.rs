#![doc = r"Reactive cells, function components and compositions used by the TypeClient render bridge."]

pub mod collections;
mod component;
mod composer;
mod composition;
mod host;
mod local;
mod node;
pub mod platform;
mod runtime;
mod state;

pub use component::{Component, ComponentId};
pub use composer::{
    is_composing, remember, useState, use_state, DisposableEffect, DisposableEffectResult,
    DisposableEffectScope,
};
pub use composition::Composition;
pub use host::{Host, MemoryHost};
pub use local::{compositionLocalOf, CompositionLocal};
pub use node::Node;
pub use platform::{DefaultScheduler, RuntimeScheduler, StdScheduler};
pub use runtime::Runtime;
pub use state::{MutableState, State};

#[cfg(test)]
#[path = "tests/composition_tests.rs"]
mod composition_tests;
