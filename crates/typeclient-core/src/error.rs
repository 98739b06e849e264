use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("controller `{class}` has no render method `{key}`")]
    MissingMethod { class: String, key: String },
    #[error("controller `{class}` declares render method `{key}` more than once")]
    DuplicateMethod { class: String, key: String },
    #[error("controller `{class}` expects an instance of `{expected}`")]
    InstanceMismatch {
        class: String,
        expected: &'static str,
    },
    #[error("before-context-create hook for `{key}` returned without calling next")]
    NextNotCalled { key: String },
    #[error("state must serialize to an object, got {kind}")]
    StateNotObject { kind: &'static str },
    #[error("failed to serialize state: {0}")]
    State(#[from] serde_json::Error),
}
