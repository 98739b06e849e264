#![doc = r"Render bridge between the TypeClient application lifecycle and a reactive component tree."]

mod accumulator;
mod application;
mod global;
mod namespace;
mod options;
mod portal;
pub mod reactive;
mod renderer;
pub mod slots;

pub use accumulator::StateAccumulator;
pub use application::ComposeApplication;
pub use namespace::{template_of, TemplateExt, TEMPLATE};
pub use options::{ComposeOptions, DEFAULT_FLUSH_LIMIT};
pub use portal::{PortalChannel, PortalPayload, PortalSlot, Template};
pub use reactive::{provide_context, use_context, use_context_state, use_reactive_state};
pub use renderer::{Renderer, RendererCache};
pub use slots::{provide_slot, slot, use_slots, SlotState};

#[cfg(test)]
#[path = "tests/renderer_cache_tests.rs"]
mod renderer_cache_tests;

#[cfg(test)]
#[path = "tests/portal_tests.rs"]
mod portal_tests;

#[cfg(test)]
#[path = "tests/accumulator_tests.rs"]
mod accumulator_tests;

#[cfg(test)]
#[path = "tests/slots_tests.rs"]
mod slots_tests;
