use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use serde_json::{json, Value};
use typeclient_compose::{
    provide_slot, slot, use_context, use_context_state, ComposeApplication, ComposeOptions, Template,
    TemplateExt,
};
use typeclient_core::{Context, Controller, ControllerClass, Route, StateRecord, STATUS_FATAL};
use typeclient_testing::{record, run_test_application, ApplicationTestRule};
use typeclient_ui::{remember, use_state, Component, Node, StdScheduler};

struct Mailbox {
    calls: Rc<Cell<u32>>,
}

impl Mailbox {
    fn inbox(&self, ctx: &Context) -> Node {
        self.calls.set(self.calls.get() + 1);
        let mounted_at = remember(|| ctx.id());
        let query = use_context_state(|state| {
            state
                .get("query")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .flatten()
        .unwrap_or_default();
        Node::text(format!(
            "inbox mounted #{mounted_at} showing #{} query={query}",
            ctx.id()
        ))
    }

    fn compose(&self, ctx: &Context) -> Node {
        provide_slot("title", Node::text("New message"));
        let seen = use_context().map(|current| current.ptr_eq(ctx));
        Node::text(format!("compose sees own context: {}", seen == Some(true)))
    }
}

fn mailbox_class(template: Option<Template>) -> Rc<ControllerClass> {
    let builder = ControllerClass::builder::<Mailbox>("Mailbox")
        .render("inbox", Mailbox::inbox)
        .render("compose", Mailbox::compose);
    let builder = match template {
        Some(template) => builder.template(template),
        None => builder,
    };
    builder.build().expect("mailbox class")
}

fn mailbox(template: Option<Template>) -> (Controller, Rc<Cell<u32>>) {
    let calls = Rc::new(Cell::new(0));
    let controller = mailbox_class(template)
        .instantiate(Mailbox {
            calls: calls.clone(),
        })
        .expect("mailbox instance");
    (controller, calls)
}

fn layout() -> Template {
    Component::new("Layout", |content: &Node| {
        Node::element(
            "main",
            [Node::element("h1", [slot("title")]), content.clone()],
        )
    })
}

fn routes(rule: &ApplicationTestRule, controller: &Controller) -> (Route, Route) {
    let inbox = rule.app().route(controller, "inbox").expect("inbox route");
    let compose = rule.app().route(controller, "compose").expect("compose route");
    (inbox, compose)
}

#[test]
fn repeated_requests_keep_mounted_subtree() {
    run_test_application(|rule| {
        let (controller, calls) = mailbox(None);
        let (inbox, _) = routes(rule, &controller);
        rule.start().expect("start");

        rule.render(&inbox, StateRecord::new()).expect("first render");
        assert_eq!(rule.markup(), "inbox mounted #1 showing #1 query=");
        let mounts = rule.mount_count();

        rule.render(&inbox, StateRecord::new()).expect("second render");
        assert_eq!(rule.markup(), "inbox mounted #1 showing #2 query=");
        assert_eq!(rule.mount_count(), mounts);
        assert_eq!(calls.get(), 2);
    });
}

#[test]
fn switching_methods_remounts() {
    run_test_application(|rule| {
        let (controller, _) = mailbox(None);
        let (inbox, compose) = routes(rule, &controller);
        rule.start().expect("start");

        rule.render(&inbox, StateRecord::new()).expect("inbox");
        rule.render(&compose, StateRecord::new()).expect("compose");
        assert_eq!(rule.markup(), "compose sees own context: true");

        rule.render(&inbox, StateRecord::new()).expect("inbox again");
        assert_eq!(rule.markup(), "inbox mounted #3 showing #3 query=");
    });
}

#[test]
fn state_accumulates_for_the_same_method() {
    run_test_application(|rule| {
        let (controller, _) = mailbox(None);
        let (inbox, compose) = routes(rule, &controller);
        rule.start().expect("start");

        rule.render(&inbox, record(json!({ "query": "rust", "page": 1 })))
            .expect("first page");
        let ctx = rule
            .render(&inbox, record(json!({ "page": 2 })))
            .expect("second page");
        assert_eq!(
            ctx.state().value(),
            record(json!({ "query": "rust", "page": 2 }))
        );
        assert_eq!(rule.markup(), "inbox mounted #1 showing #2 query=rust");

        assert_eq!(
            rule.bridge().accumulator().current(),
            Some(record(json!({ "query": "rust", "page": 2 })))
        );

        rule.render(&compose, record(json!({ "to": "ana" })))
            .expect("compose");
        let ctx = rule.render(&inbox, StateRecord::new()).expect("inbox again");
        assert!(ctx.state().value().is_empty());
        assert_eq!(rule.bridge().renderers().class_count(), 1);
        assert_eq!(rule.bridge().renderers().renderer_count(), 2);
    });
}

#[test]
fn context_state_writes_rerender() {
    run_test_application(|rule| {
        let (controller, _) = mailbox(None);
        let (inbox, _) = routes(rule, &controller);
        rule.start().expect("start");

        let ctx = rule.render(&inbox, StateRecord::new()).expect("inbox");
        ctx.state()
            .update(|state| state.insert("query".into(), json!("unread")));
        assert!(rule.bridge().should_render());
        rule.pump_until_idle();
        assert_eq!(rule.markup(), "inbox mounted #1 showing #1 query=unread");
    });
}

#[test]
fn requests_before_mount_are_dropped() {
    let rule = ApplicationTestRule::new();
    let (controller, calls) = mailbox(None);
    let (inbox, _) = routes(&rule, &controller);

    rule.render(&inbox, StateRecord::new()).expect("early render");
    assert_eq!(rule.bridge().portal().dropped(), 1);
    assert_eq!(calls.get(), 0);

    rule.start().expect("start");
    assert_eq!(rule.markup(), "");
    assert_eq!(rule.host().commits(), 1);

    rule.render(&inbox, StateRecord::new()).expect("render");
    assert_eq!(rule.markup(), "inbox mounted #2 showing #2 query=");
}

#[test]
fn first_portal_receiver_wins() {
    let rule = ApplicationTestRule::new();
    let (controller, _) = mailbox(None);
    let (inbox, _) = routes(&rule, &controller);
    let seen = Rc::new(RefCell::new(Vec::new()));
    rule.bridge().set_portal_receiver({
        let seen = seen.clone();
        move |payload| seen.borrow_mut().push(payload.is_error())
    });

    rule.start().expect("start");
    rule.render(&inbox, StateRecord::new()).expect("render");
    rule.render_error("offline");

    assert_eq!(*seen.borrow(), vec![false, true]);
    assert_eq!(rule.markup(), "");
}

#[test]
fn fatal_status_bypasses_method() {
    run_test_application(|rule| {
        let (controller, calls) = mailbox(Some(layout()));
        let (inbox, _) = routes(rule, &controller);
        rule.start().expect("start");

        let ctx = rule.render(&inbox, StateRecord::new()).expect("inbox");
        assert_eq!(calls.get(), 1);

        ctx.fail(STATUS_FATAL, Node::element("p", [Node::text("mail server down")]));
        rule.pump_until_idle();
        assert_eq!(rule.markup(), "<main><h1></h1><p>mail server down</p></main>");
        assert_eq!(calls.get(), 1);

        ctx.recover();
        rule.pump_until_idle();
        assert_eq!(
            rule.markup(),
            "<main><h1></h1>inbox mounted #1 showing #1 query=</main>"
        );
        assert_eq!(calls.get(), 2);
    });
}

#[test]
fn error_render_replaces_screen_without_template() {
    run_test_application(|rule| {
        let (controller, _) = mailbox(Some(layout()));
        let (inbox, _) = routes(rule, &controller);
        rule.start().expect("start");
        rule.render(&inbox, StateRecord::new()).expect("inbox");

        rule.render_error(Node::element("pre", [Node::text("crashed")]));
        assert_eq!(rule.markup(), "<pre>crashed</pre>");

        rule.render(&inbox, StateRecord::new()).expect("recovered");
        assert_eq!(
            rule.markup(),
            "<main><h1></h1>inbox mounted #2 showing #2 query=</main>"
        );
    });
}

#[test]
fn template_shows_slots_while_provider_is_mounted() {
    run_test_application(|rule| {
        let (controller, _) = mailbox(Some(layout()));
        let (inbox, compose) = routes(rule, &controller);
        rule.start().expect("start");

        rule.render(&compose, StateRecord::new()).expect("compose");
        assert_eq!(
            rule.markup(),
            "<main><h1>New message</h1>compose sees own context: true</main>"
        );
        assert_eq!(rule.bridge().slot_state().names(), vec!["title".to_string()]);

        rule.render(&inbox, StateRecord::new()).expect("inbox");
        assert_eq!(
            rule.markup(),
            "<main><h1></h1>inbox mounted #2 showing #2 query=</main>"
        );
        assert!(rule.bridge().slot_state().is_empty());
    });
}

#[test]
fn start_is_idempotent() {
    run_test_application(|rule| {
        rule.start().expect("start");
        rule.start().expect("second start");
        assert!(rule.app().is_started());
        assert!(rule.bridge().is_mounted());
        assert_eq!(rule.host().commits(), 1);
    });
}

#[test]
fn unknown_route_is_rejected_at_declaration() {
    run_test_application(|rule| {
        let (controller, _) = mailbox(None);
        assert!(rule.app().route(&controller, "archive").is_err());
    });
}

#[test]
fn scheduler_is_asked_for_a_frame_on_dispatch() {
    let scheduler = Arc::new(StdScheduler::new());
    let rule =
        ApplicationTestRule::with_options(ComposeOptions::default().with_scheduler(scheduler.clone()));
    let (controller, _) = mailbox(None);
    let (inbox, _) = routes(&rule, &controller);
    rule.start().expect("start");
    assert!(!scheduler.take_frame_request());

    rule.app().render(&inbox, StateRecord::new()).expect("render");
    assert!(scheduler.take_frame_request());
    assert_eq!(rule.pump_until_idle(), 1);
}

struct Restless;

#[test]
fn flush_stops_at_pass_limit() {
    let class = ControllerClass::builder::<Restless>("Restless")
        .render("spin", |_: &Restless, _: &Context| {
            let ticks = use_state(|| 0u32);
            let next = ticks.value() + 1;
            ticks.set(next);
            Node::text(next.to_string())
        })
        .build()
        .expect("restless class");
    let controller = class.instantiate(Restless).expect("restless instance");
    let rule = ApplicationTestRule::with_options(ComposeOptions::default().with_flush_limit(3));
    let spin = rule.app().route(&controller, "spin").expect("spin route");
    rule.start().expect("start");

    assert_eq!(rule.bridge().options().flush_limit(), 3);
    rule.app().render(&spin, StateRecord::new()).expect("render");
    assert_eq!(rule.pump_until_idle(), 3);
    assert!(rule.bridge().should_render());
}

#[derive(Debug, PartialEq)]
struct Observed {
    mounted: bool,
    stale: bool,
    has_tree: bool,
    mount_count: u64,
    nested_passes: usize,
}

struct Inspector {
    bridge: Rc<RefCell<Weak<ComposeApplication>>>,
    observed: Observations,
    unmount: Rc<Cell<bool>>,
}

impl Inspector {
    fn look(&self, _: &Context) -> Node {
        let bridge = self.bridge.borrow().upgrade();
        if let Some(bridge) = bridge {
            self.observed.borrow_mut().push(Observed {
                mounted: bridge.is_mounted(),
                stale: bridge.should_render(),
                has_tree: bridge.tree().is_some(),
                mount_count: bridge.mount_count(),
                nested_passes: bridge.flush(),
            });
            if self.unmount.get() {
                bridge.unmount();
            }
        }
        Node::text("looked")
    }
}

type Observations = Rc<RefCell<Vec<Observed>>>;

fn inspector(rule: &ApplicationTestRule) -> (Route, Observations, Rc<Cell<bool>>) {
    let observed = Rc::new(RefCell::new(Vec::new()));
    let unmount = Rc::new(Cell::new(false));
    let class = ControllerClass::builder::<Inspector>("Inspector")
        .render("look", Inspector::look)
        .build()
        .expect("inspector class");
    let controller = class
        .instantiate(Inspector {
            bridge: Rc::new(RefCell::new(Rc::downgrade(rule.bridge()))),
            observed: observed.clone(),
            unmount: unmount.clone(),
        })
        .expect("inspector instance");
    let route = rule.app().route(&controller, "look").expect("look route");
    (route, observed, unmount)
}

#[test]
fn methods_may_query_the_bridge_while_rendering() {
    run_test_application(|rule| {
        let (look, observed, _) = inspector(rule);
        rule.start().expect("start");

        rule.render(&look, StateRecord::new()).expect("render");
        assert_eq!(rule.markup(), "looked");
        assert_eq!(
            *observed.borrow(),
            vec![Observed {
                mounted: true,
                stale: false,
                has_tree: false,
                mount_count: 0,
                nested_passes: 0,
            }]
        );
        assert!(rule.bridge().tree().is_some());
        assert!(rule.bridge().mount_count() > 0);
    });
}

#[test]
fn unmount_during_render_applies_after_the_pass() {
    let rule = ApplicationTestRule::new();
    let (look, observed, unmount) = inspector(&rule);
    rule.start().expect("start");
    unmount.set(true);

    rule.render(&look, StateRecord::new()).expect("render");
    assert_eq!(observed.borrow().len(), 1);
    assert!(!rule.bridge().is_mounted());
    assert!(rule.bridge().tree().is_none());
    assert_eq!(rule.markup(), "");

    rule.render(&look, StateRecord::new()).expect("render after unmount");
    assert_eq!(observed.borrow().len(), 1);
}
