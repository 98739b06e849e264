use super::*;

use typeclient_ui::{Component, Composition, MemoryHost, MutableState, Node, Runtime};

use crate::slots::provide_slots;

fn provider(name: &'static str, text: &'static str) -> Component<()> {
    Component::new(name, move |_: &()| {
        provide_slot("title", Node::text(text));
        Node::Empty
    })
}

fn mount(
    slots: &SlotState,
    host: &MemoryHost,
    body: impl Fn() -> Node + 'static,
) -> Composition {
    let slots = slots.clone();
    Composition::mount(Runtime::default(), host.clone(), move || {
        provide_slots(slots.clone(), || {
            Node::fragment([Node::element("h1", [slot("title")]), body()])
        })
    })
}

fn settle(composition: &mut Composition) -> usize {
    let mut passes = 0;
    while passes < 10 && composition.recompose() {
        passes += 1;
    }
    passes
}

#[test]
fn competing_providers_settle_on_the_first() {
    let slots = SlotState::new();
    let host = MemoryHost::new();
    let first = provider("First", "first");
    let second = provider("Second", "second");
    let mut composition = mount(&slots, &host, move || {
        Node::fragment([first.render(&()), second.render(&())])
    });

    assert!(settle(&mut composition) < 10);
    assert!(!composition.should_render());
    assert_eq!(slots.get("title"), Some(Node::text("first")));
    assert_eq!(host.markup(), "<h1>first</h1>");
}

#[test]
fn unmounting_provider_hands_the_name_over() {
    let slots = SlotState::new();
    let host = MemoryHost::new();
    let visible = MutableState::new(true);
    let first = provider("First", "first");
    let second = provider("Second", "second");
    let mut composition = mount(&slots, &host, {
        let visible = visible.clone();
        move || {
            let head = if visible.value() {
                first.render(&())
            } else {
                Node::Empty
            };
            Node::fragment([head, second.render(&())])
        }
    });
    settle(&mut composition);
    assert_eq!(slots.get("title"), Some(Node::text("first")));

    visible.set(false);
    settle(&mut composition);
    assert_eq!(slots.get("title"), Some(Node::text("second")));
    assert_eq!(slots.names(), vec!["title".to_string()]);
    assert_eq!(host.markup(), "<h1>second</h1>");
}

#[test]
fn replaced_provider_does_not_remove_its_successor() {
    let slots = SlotState::new();
    let host = MemoryHost::new();
    let first = provider("First", "first");
    let current = MutableState::new(first);
    let mut composition = mount(&slots, &host, {
        let current = current.clone();
        move || current.value().render(&())
    });
    settle(&mut composition);
    assert_eq!(slots.get("title"), Some(Node::text("first")));

    current.set(provider("Second", "second"));
    settle(&mut composition);
    assert_eq!(slots.get("title"), Some(Node::text("second")));

    current.set(Component::new("Plain", |_: &()| Node::text("plain")));
    settle(&mut composition);
    assert!(slots.is_empty());
    assert_eq!(host.markup(), "<h1></h1>plain");
}

#[test]
fn release_only_removes_the_holders_entry() {
    let slots = SlotState::new();
    assert!(slots.claim(1, "title", Node::text("a")));
    assert!(!slots.claim(2, "title", Node::text("b")));
    assert!(!slots.claim(1, "title", Node::text("a")));

    assert_eq!(slots.release(2, "title"), None);
    assert_eq!(slots.get("title"), Some(Node::text("a")));
    assert_eq!(slots.release(1, "title"), Some(Node::text("a")));
    assert!(slots.is_empty());

    assert!(slots.insert("title", Node::text("manual")));
    assert_eq!(slots.release(1, "title"), None);
    assert!(slots.claim(3, "title", Node::text("c")));
    assert_eq!(slots.get("title"), Some(Node::text("c")));
}
