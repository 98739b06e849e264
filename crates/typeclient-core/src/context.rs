use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use typeclient_ui::{MutableState, Node};

use crate::ApplicationError;

/// Status a context starts with.
pub const STATUS_OK: u16 = 200;
/// Status that makes renderers show the context error instead of the controller output.
pub const STATUS_FATAL: u16 = 500;

/// String-keyed record fed into context construction.
pub type StateRecord = serde_json::Map<String, Value>;

/// Serializes `value` into a [`StateRecord`]. Only values that serialize to
/// a JSON object are accepted.
pub fn state_from<T: Serialize + ?Sized>(value: &T) -> Result<StateRecord, ApplicationError> {
    match serde_json::to_value(value)? {
        Value::Object(record) => Ok(record),
        other => Err(ApplicationError::StateNotObject {
            kind: value_kind(&other),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// State handed to the before-context-create hook: either a record or a
/// producer invoked lazily by the hook.
pub enum StateInit {
    Value(StateRecord),
    Producer(Box<dyn FnOnce() -> StateRecord>),
}

impl StateInit {
    pub fn producer(produce: impl FnOnce() -> StateRecord + 'static) -> Self {
        StateInit::Producer(Box::new(produce))
    }

    pub fn resolve(self) -> StateRecord {
        match self {
            StateInit::Value(record) => record,
            StateInit::Producer(produce) => produce(),
        }
    }
}

impl Default for StateInit {
    fn default() -> Self {
        StateInit::Value(StateRecord::new())
    }
}

impl From<StateRecord> for StateInit {
    fn from(record: StateRecord) -> Self {
        StateInit::Value(record)
    }
}

impl fmt::Debug for StateInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateInit::Value(record) => f.debug_tuple("Value").field(record).finish(),
            StateInit::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

struct ContextInner {
    id: u64,
    controller: String,
    key: String,
    status: MutableState<u16>,
    error: MutableState<Option<Node>>,
    state: MutableState<StateRecord>,
}

/// Request-scoped value owned by the application runtime. `status`, `error`
/// and `state` are reactive cells; renderers that read them re-render when
/// they change.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

impl Context {
    pub fn new(
        id: u64,
        controller: impl Into<String>,
        key: impl Into<String>,
        state: StateRecord,
    ) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                id,
                controller: controller.into(),
                key: key.into(),
                status: MutableState::new(STATUS_OK),
                error: MutableState::new(None),
                state: MutableState::new(state),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Name of the controller class this context was created for.
    pub fn controller(&self) -> &str {
        &self.inner.controller
    }

    /// Render method key this context was created for.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn status(&self) -> &MutableState<u16> {
        &self.inner.status
    }

    pub fn error(&self) -> &MutableState<Option<Node>> {
        &self.inner.error
    }

    pub fn state(&self) -> &MutableState<StateRecord> {
        &self.inner.state
    }

    /// Records `error` and switches to `status`. The error is written first
    /// so a renderer never observes the fatal status without its error.
    pub fn fail(&self, status: u16, error: impl Into<Node>) {
        self.inner.error.set(Some(error.into()));
        self.inner.status.set(status);
    }

    pub fn recover(&self) {
        self.inner.status.set(STATUS_OK);
        self.inner.error.set(None);
    }

    pub fn is_fatal(&self) -> bool {
        self.inner.status.value() == STATUS_FATAL
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("controller", &self.inner.controller)
            .field("key", &self.inner.key)
            .field("status", &self.inner.status)
            .finish()
    }
}
