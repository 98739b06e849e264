use super::*;
use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use typeclient_core::{
    BeforeContextCreate, Context, Controller, ControllerClass, StateInit, StateRecord,
};
use typeclient_ui::Node;

struct Blog;

fn blog() -> Controller {
    ControllerClass::builder::<Blog>("Blog")
        .render("list", |_: &Blog, _: &Context| Node::text("list"))
        .render("post", |_: &Blog, _: &Context| Node::text("post"))
        .build()
        .expect("class builds")
        .instantiate(Blog)
        .expect("blog instance")
}

fn record(value: serde_json::Value) -> StateRecord {
    match value {
        serde_json::Value::Object(record) => record,
        _ => StateRecord::new(),
    }
}

fn run(
    accumulator: &StateAccumulator,
    cache: &RendererCache,
    controller: &Controller,
    key: &str,
    state: StateInit,
) -> StateRecord {
    let produced = Rc::new(RefCell::new(None));
    let sink = produced.clone();
    accumulator
        .before_context_create(
            cache,
            BeforeContextCreate {
                controller: controller.clone(),
                key: key.to_string(),
                state,
                next: Box::new(move |record| {
                    sink.borrow_mut().replace(record);
                }),
            },
        )
        .expect("hook succeeds");
    let record = produced.borrow_mut().take();
    record.expect("next called")
}

#[test]
fn same_renderer_merges_and_later_keys_win() {
    let accumulator = StateAccumulator::new();
    let cache = RendererCache::new();
    let controller = blog();

    let first = run(
        &accumulator,
        &cache,
        &controller,
        "list",
        record(json!({ "page": 1, "query": "rust" })).into(),
    );
    assert_eq!(first, record(json!({ "page": 1, "query": "rust" })));

    let second = run(
        &accumulator,
        &cache,
        &controller,
        "list",
        record(json!({ "page": 2 })).into(),
    );
    assert_eq!(second, record(json!({ "page": 2, "query": "rust" })));
    assert_eq!(accumulator.current(), Some(second));
}

#[test]
fn switching_renderer_resets_state() {
    let accumulator = StateAccumulator::new();
    let cache = RendererCache::new();
    let controller = blog();

    run(
        &accumulator,
        &cache,
        &controller,
        "list",
        record(json!({ "page": 3 })).into(),
    );
    let post = run(
        &accumulator,
        &cache,
        &controller,
        "post",
        record(json!({ "slug": "hello" })).into(),
    );
    assert_eq!(post, record(json!({ "slug": "hello" })));

    let back = run(
        &accumulator,
        &cache,
        &controller,
        "list",
        StateInit::default(),
    );
    assert!(back.is_empty());
}

#[test]
fn producer_state_is_resolved_before_merging() {
    let accumulator = StateAccumulator::new();
    let cache = RendererCache::new();
    let controller = blog();

    run(
        &accumulator,
        &cache,
        &controller,
        "list",
        record(json!({ "page": 1 })).into(),
    );
    let merged = run(
        &accumulator,
        &cache,
        &controller,
        "list",
        StateInit::producer(|| record(json!({ "sort": "new" }))),
    );
    assert_eq!(merged, record(json!({ "page": 1, "sort": "new" })));
}

#[test]
fn snapshots_are_independent_of_later_merges() {
    let accumulator = StateAccumulator::new();
    let cache = RendererCache::new();
    let controller = blog();
    let renderer = cache.resolve(&controller, "list").expect("renderer");

    let mut snapshot = accumulator.accumulate(&renderer, record(json!({ "a": 1 })));
    snapshot.insert("local".into(), json!(true));

    let merged = accumulator.accumulate(&renderer, record(json!({ "b": 2 })));
    assert_eq!(merged, record(json!({ "a": 1, "b": 2 })));
    assert_eq!(accumulator.renderer(), Some(renderer));
}

#[test]
fn clear_forgets_accumulated_state() {
    let accumulator = StateAccumulator::new();
    let cache = RendererCache::new();
    let controller = blog();
    let renderer = cache.resolve(&controller, "list").expect("renderer");

    accumulator.accumulate(&renderer, record(json!({ "a": 1 })));
    accumulator.clear();
    assert!(accumulator.current().is_none());

    let fresh = accumulator.accumulate(&renderer, record(json!({ "b": 2 })));
    assert_eq!(fresh, record(json!({ "b": 2 })));
}
