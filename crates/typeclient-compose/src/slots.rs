//! Named slots shared between the root component and descendants.
//!
//! A descendant calls [`provide_slot`] to publish content under a name and
//! the layout calls [`slot`] to render it. Each provider owns the names it
//! publishes: the first mounted provider of a name keeps it, and the entry is
//! removed only when that provider unmounts.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use typeclient_ui::{
    compositionLocalOf, remember, CompositionLocal, DisposableEffect, MutableState, Node,
};

type SlotOwner = usize;

/// Owner of entries written through [`SlotState::insert`].
const UNOWNED: SlotOwner = 0;

static NEXT_SLOT_OWNER: AtomicUsize = AtomicUsize::new(1);

#[derive(Clone, PartialEq)]
struct SlotEntry {
    owner: SlotOwner,
    node: Node,
}

/// Reactive name to content map owned by a compose application.
#[derive(Clone, Default, PartialEq)]
pub struct SlotState {
    slots: MutableState<IndexMap<String, SlotEntry>>,
}

impl SlotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Node> {
        self.slots
            .with(|slots| slots.get(name).map(|entry| entry.node.clone()))
    }

    /// Stores `node` under `name`, taking the entry away from whichever
    /// provider held it. Writes, and so invalidates readers, only when the
    /// entry changed.
    pub fn insert(&self, name: &str, node: Node) -> bool {
        self.write(name, SlotEntry { owner: UNOWNED, node })
    }

    pub fn remove(&self, name: &str) -> Option<Node> {
        if !self.slots.with(|slots| slots.contains_key(name)) {
            return None;
        }
        self.slots
            .update(|slots| slots.shift_remove(name))
            .map(|entry| entry.node)
    }

    /// Writes `node` for `owner` when `name` is free, unowned or already
    /// held by `owner`. Returns whether the entry changed.
    pub(crate) fn claim(&self, owner: SlotOwner, name: &str, node: Node) -> bool {
        let holder = self
            .slots
            .with(|slots| slots.get(name).map(|entry| entry.owner));
        match holder {
            Some(holder) if holder != owner && holder != UNOWNED => {
                log::trace!("slot `{name}` already provided by #{holder}");
                false
            }
            _ => self.write(name, SlotEntry { owner, node }),
        }
    }

    /// Removes `name` only if `owner` still holds it.
    pub(crate) fn release(&self, owner: SlotOwner, name: &str) -> Option<Node> {
        let held = self
            .slots
            .with(|slots| slots.get(name).is_some_and(|entry| entry.owner == owner));
        if !held {
            return None;
        }
        self.remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.slots.with(|slots| slots.keys().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.slots.with(IndexMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, name: &str, entry: SlotEntry) -> bool {
        if self.slots.with(|slots| slots.get(name) == Some(&entry)) {
            return false;
        }
        self.slots
            .update(|slots| slots.insert(name.to_string(), entry));
        true
    }
}

impl fmt::Debug for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotState")
            .field("names", &self.names())
            .finish()
    }
}

thread_local! {
    static SLOTS: CompositionLocal<Option<SlotState>> = compositionLocalOf(|| None);
}

fn slots_local() -> CompositionLocal<Option<SlotState>> {
    SLOTS.with(CompositionLocal::clone)
}

pub(crate) fn provide_slots<R>(slots: SlotState, content: impl FnOnce() -> R) -> R {
    slots_local().provide(Some(slots), content)
}

/// Slot state of the enclosing application root.
pub fn use_slots() -> Option<SlotState> {
    slots_local().current()
}

/// Content published under `name`, or an empty node.
pub fn slot(name: &str) -> Node {
    use_slots()
        .and_then(|slots| slots.get(name))
        .unwrap_or_default()
}

/// Publishes `node` under `name` for as long as the calling component stays
/// mounted. A name already published by another mounted component is left
/// alone until that component unmounts.
pub fn provide_slot(name: &str, node: Node) {
    let Some(slots) = use_slots() else {
        log::trace!("provide_slot(`{name}`) outside an application root");
        return;
    };
    let owner = *remember(|| NEXT_SLOT_OWNER.fetch_add(1, Ordering::Relaxed));
    let owned = name.to_string();
    let cleanup_slots = slots.clone();
    DisposableEffect(owned.clone(), move |scope| {
        scope.on_dispose(move || {
            cleanup_slots.release(owner, &owned);
        })
    });
    slots.claim(owner, name, node);
}
