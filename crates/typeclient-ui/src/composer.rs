//! Positional group tree driving `remember`, remounts and composition locals.
//!
//! Every [`Component`](crate::Component) render opens a group. Groups are
//! matched against the previous pass by position and component identity; a
//! mismatch drops the old group (running its disposers) and mounts a fresh
//! one.

use std::any::Any;
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use crate::runtime::RecomposeScope;
use crate::state::MutableState;
use crate::Node;

pub(crate) type GroupKey = usize;
pub(crate) type LocalKey = usize;

const ROOT_GROUP: GroupKey = 0;

pub(crate) struct Group {
    key: GroupKey,
    name: Rc<str>,
    slots: Vec<Rc<dyn Any>>,
    children: Vec<Group>,
}

impl Group {
    fn new(key: GroupKey, name: Rc<str>) -> Self {
        Self {
            key,
            name,
            slots: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(ROOT_GROUP, Rc::from("root"))
    }
}

struct Frame {
    group: Group,
    slot_cursor: usize,
    previous: Vec<Option<Group>>,
    children: Vec<Group>,
}

type Discarded = (Vec<Rc<dyn Any>>, Vec<Group>);

impl Frame {
    fn open(mut group: Group) -> Self {
        let previous = mem::take(&mut group.children)
            .into_iter()
            .map(Some)
            .collect();
        Self {
            group,
            slot_cursor: 0,
            previous,
            children: Vec::new(),
        }
    }

    fn close(mut self) -> (Group, Discarded) {
        let cursor = self.slot_cursor.min(self.group.slots.len());
        let stale_slots = self.group.slots.split_off(cursor);
        let stale_children: Vec<Group> = self.previous.into_iter().flatten().collect();
        for child in &stale_children {
            log::debug!("unmounting component `{}`", child.name);
        }
        self.group.children = self.children;
        (self.group, (stale_slots, stale_children))
    }
}

struct ComposerState {
    scope: RecomposeScope,
    frames: Vec<Frame>,
    locals: Vec<(LocalKey, Rc<dyn Any>)>,
    mounts: u64,
}

thread_local! {
    static COMPOSER: RefCell<Option<ComposerState>> = const { RefCell::new(None) };
}

pub(crate) struct PassOutput {
    pub(crate) root: Group,
    pub(crate) tree: Node,
    pub(crate) mounts: u64,
}

/// Runs one render pass over `root`. Values dropped by the pass are released
/// after the composer is uninstalled so their `Drop` impls may read state.
pub(crate) fn run_pass(
    scope: RecomposeScope,
    root: Group,
    content: impl FnOnce() -> Node,
) -> PassOutput {
    let installed = ComposerState {
        scope,
        frames: vec![Frame::open(root)],
        locals: Vec::new(),
        mounts: 0,
    };
    let outer = COMPOSER.with(|slot| slot.replace(Some(installed)));
    let tree = content();
    let finished = COMPOSER.with(|slot| slot.replace(outer));

    let Some(mut state) = finished else {
        return PassOutput {
            root: Group::root(),
            tree,
            mounts: 0,
        };
    };
    let mut discarded = Vec::new();
    while state.frames.len() > 1 {
        if let Some(frame) = state.frames.pop() {
            let (group, stale) = frame.close();
            discarded.push(stale);
            if let Some(parent) = state.frames.last_mut() {
                parent.children.push(group);
            }
        }
    }
    let root = match state.frames.pop() {
        Some(frame) => {
            let (group, stale) = frame.close();
            discarded.push(stale);
            group
        }
        None => Group::root(),
    };
    let mounts = state.mounts;
    drop(state);
    drop(discarded);
    PassOutput { root, tree, mounts }
}

pub fn is_composing() -> bool {
    COMPOSER.with(|slot| {
        slot.try_borrow()
            .map(|state| state.is_some())
            .unwrap_or(true)
    })
}

pub(crate) fn current_scope() -> Option<RecomposeScope> {
    COMPOSER.with(|slot| {
        slot.try_borrow()
            .ok()
            .and_then(|state| state.as_ref().map(|state| state.scope.clone()))
    })
}

pub(crate) fn enter_group(key: GroupKey, name: &Rc<str>) -> bool {
    COMPOSER.with(|slot| {
        let mut slot = slot.borrow_mut();
        let Some(state) = slot.as_mut() else {
            return false;
        };
        let Some(parent) = state.frames.last_mut() else {
            return false;
        };
        let index = parent.children.len();
        let reused = match parent.previous.get_mut(index) {
            Some(previous) if previous.as_ref().map(|group| group.key) == Some(key) => {
                previous.take()
            }
            _ => None,
        };
        let group = match reused {
            Some(group) => group,
            None => {
                state.mounts += 1;
                log::debug!("mounting component `{name}`");
                Group::new(key, Rc::clone(name))
            }
        };
        state.frames.push(Frame::open(group));
        true
    })
}

pub(crate) fn exit_group() {
    let discarded = COMPOSER.with(|slot| {
        let mut slot = slot.borrow_mut();
        let state = slot.as_mut()?;
        if state.frames.len() < 2 {
            return None;
        }
        let frame = state.frames.pop()?;
        let (group, stale) = frame.close();
        if let Some(parent) = state.frames.last_mut() {
            parent.children.push(group);
        }
        Some(stale)
    });
    drop(discarded);
}

enum Lookup<T> {
    Hit(Rc<T>),
    Miss,
    Detached,
}

/// Returns the value remembered at the current position of the current
/// component, creating it with `init` on first use. Outside a render pass the
/// value is created fresh every call.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let lookup = COMPOSER.with(|slot| {
        let mut slot = slot.borrow_mut();
        let Some(frame) = slot.as_mut().and_then(|state| state.frames.last_mut()) else {
            return Lookup::Detached;
        };
        let cursor = frame.slot_cursor;
        match frame.group.slots.get(cursor).cloned().map(|slot| slot.downcast::<T>()) {
            Some(Ok(value)) => {
                frame.slot_cursor += 1;
                Lookup::Hit(value)
            }
            _ => Lookup::Miss,
        }
    });

    match lookup {
        Lookup::Hit(value) => value,
        Lookup::Detached => Rc::new(init()),
        Lookup::Miss => {
            let value = Rc::new(init());
            let entry: Rc<dyn Any> = value.clone();
            let replaced = COMPOSER.with(|slot| {
                let mut slot = slot.borrow_mut();
                let frame = slot.as_mut().and_then(|state| state.frames.last_mut())?;
                let cursor = frame.slot_cursor;
                frame.slot_cursor += 1;
                if cursor < frame.group.slots.len() {
                    Some(mem::replace(&mut frame.group.slots[cursor], entry))
                } else {
                    frame.group.slots.push(entry);
                    None
                }
            });
            drop(replaced);
            value
        }
    }
}

#[allow(non_snake_case)]
pub fn useState<T: 'static>(init: impl FnOnce() -> T) -> MutableState<T> {
    remember(|| MutableState::new(init())).as_ref().clone()
}

pub fn use_state<T: 'static>(init: impl FnOnce() -> T) -> MutableState<T> {
    useState(init)
}

struct DisposableEffectState<K> {
    key: Option<K>,
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl<K> Drop for DisposableEffectState<K> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DisposableEffectScope;

#[derive(Default)]
pub struct DisposableEffectResult {
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl DisposableEffectScope {
    pub fn on_dispose(&self, cleanup: impl FnOnce() + 'static) -> DisposableEffectResult {
        DisposableEffectResult {
            cleanup: Some(Box::new(cleanup)),
        }
    }
}

/// Runs `effect` when the component mounts and again whenever `key` changes.
/// The cleanup registered through [`DisposableEffectScope::on_dispose`] runs
/// before the next effect and when the component unmounts.
#[allow(non_snake_case)]
pub fn DisposableEffect<K: PartialEq + 'static>(
    key: K,
    effect: impl FnOnce(DisposableEffectScope) -> DisposableEffectResult,
) {
    let state = remember(|| {
        RefCell::new(DisposableEffectState::<K> {
            key: None,
            cleanup: None,
        })
    });
    let stale = {
        let mut current = state.borrow_mut();
        if current.key.as_ref() == Some(&key) {
            return;
        }
        current.key = Some(key);
        current.cleanup.take()
    };
    if let Some(cleanup) = stale {
        cleanup();
    }
    let result = effect(DisposableEffectScope);
    state.borrow_mut().cleanup = result.cleanup;
}

pub(crate) fn push_local(key: LocalKey, value: Rc<dyn Any>) -> bool {
    COMPOSER.with(|slot| match slot.borrow_mut().as_mut() {
        Some(state) => {
            state.locals.push((key, value));
            true
        }
        None => false,
    })
}

pub(crate) fn pop_local() {
    let popped = COMPOSER.with(|slot| {
        slot.borrow_mut()
            .as_mut()
            .and_then(|state| state.locals.pop())
    });
    drop(popped);
}

pub(crate) fn read_local(key: LocalKey) -> Option<Rc<dyn Any>> {
    COMPOSER.with(|slot| {
        let slot = slot.try_borrow().ok()?;
        let state = slot.as_ref()?;
        state
            .locals
            .iter()
            .rev()
            .find(|(local, _)| *local == key)
            .map(|(_, value)| Rc::clone(value))
    })
}
