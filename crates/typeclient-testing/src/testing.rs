use std::rc::Rc;

use serde_json::Value;
use typeclient_compose::{ComposeApplication, ComposeOptions};
use typeclient_core::{
    Application, ApplicationError, ApplicationOptions, Context, Route, StateInit, StateRecord,
};
use typeclient_ui::{MemoryHost, Node};

/// Headless harness running an [`Application`] over a [`ComposeApplication`]
/// that commits into a [`MemoryHost`].
///
/// Render helpers pump the mounted tree until it settles so assertions see
/// the committed output of the request they just made.
pub struct ApplicationTestRule {
    app: Application<ComposeApplication>,
    host: MemoryHost,
}

impl ApplicationTestRule {
    pub fn new() -> Self {
        Self::with_options(ComposeOptions::default())
    }

    pub fn with_options(options: ComposeOptions) -> Self {
        let host = MemoryHost::new();
        let bridge = ComposeApplication::new(host.clone(), options);
        Self {
            app: Application::new(ApplicationOptions::default().with_name("test"), bridge),
            host,
        }
    }

    /// Mounts the root tree.
    pub fn start(&self) -> Result<(), ApplicationError> {
        self.app.start()?;
        self.pump_until_idle();
        Ok(())
    }

    pub fn render(
        &self,
        route: &Route,
        state: impl Into<StateInit>,
    ) -> Result<Context, ApplicationError> {
        let ctx = self.app.render(route, state)?;
        self.pump_until_idle();
        Ok(ctx)
    }

    pub fn render_error(&self, node: impl Into<Node>) {
        self.app.render_error(node);
        self.pump_until_idle();
    }

    /// Re-renders until the mounted tree stops changing. Returns the passes run.
    pub fn pump_until_idle(&self) -> usize {
        self.bridge().flush()
    }

    pub fn app(&self) -> &Application<ComposeApplication> {
        &self.app
    }

    pub fn bridge(&self) -> &Rc<ComposeApplication> {
        self.app.lifecycle()
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    /// Markup of the tree last committed to the host.
    pub fn markup(&self) -> String {
        self.host.markup()
    }

    pub fn mount_count(&self) -> u64 {
        self.bridge().mount_count()
    }
}

impl Default for ApplicationTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to an
/// [`ApplicationTestRule`].
pub fn run_test_application<R>(f: impl FnOnce(&ApplicationTestRule) -> R) -> R {
    let rule = ApplicationTestRule::new();
    f(&rule)
}

/// Builds a state record from a JSON object literal. Anything other than an
/// object yields an empty record.
pub fn record(value: Value) -> StateRecord {
    match value {
        Value::Object(record) => record,
        _ => StateRecord::new(),
    }
}
