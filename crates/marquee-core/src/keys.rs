use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

/// A decoded key press fed into the router by the shell. Only the keys the
/// application binds are modeled; everything else stays in the shell's own
/// input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
    Backspace,
    Char(char),
}

/// A binding listens for at most this many keys.
pub const MAX_KEYS_PER_BINDING: usize = 2;

type Action = Arc<Mutex<dyn FnMut() + Send>>;

struct Binding {
    keys: [Option<Key>; MAX_KEYS_PER_BINDING],
    action: Action,
}

impl Binding {
    fn new(keys: &[Key], action: impl FnMut() + Send + 'static) -> Self {
        if keys.len() > MAX_KEYS_PER_BINDING {
            debug!(
                given = keys.len(),
                used = MAX_KEYS_PER_BINDING,
                "binding given more keys than supported, extras ignored"
            );
        }
        let mut slots = [None; MAX_KEYS_PER_BINDING];
        for (slot, key) in slots.iter_mut().zip(keys) {
            *slot = Some(*key);
        }
        Self {
            keys: slots,
            action: Arc::new(Mutex::new(action)),
        }
    }

    fn matches(&self, key: Key) -> bool {
        self.keys.iter().flatten().any(|k| *k == key)
    }
}

#[derive(Default)]
struct RouterInner {
    bindings: HashMap<u64, Binding>,
    next_id: u64,
}

/// Key dispatch owned by the shell. The shell decodes terminal events into
/// `Key` values and feeds them through `dispatch`; components register
/// actions with `bind` and drop the handle to unregister. Bindings are
/// replaced atomically under the router lock: a press is routed either
/// entirely against the old binding or entirely against the new one, never
/// both, and no press falls through in between.
#[derive(Clone, Default)]
pub struct KeyRouter {
    inner: Arc<Mutex<RouterInner>>,
}

impl KeyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for up to two keys. The returned handle unbinds
    /// on drop.
    pub fn bind(&self, keys: &[Key], action: impl FnMut() + Send + 'static) -> BindingHandle {
        let binding = Binding::new(keys, action);
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.bindings.insert(id, binding);
        BindingHandle {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Route one key press to every binding listening for it.
    pub fn dispatch(&self, key: Key) {
        // Matching actions are snapshotted under the lock and invoked
        // outside it, so an action may bind or rebind without deadlocking.
        let actions: Vec<Action> = {
            let inner = self.inner.lock().unwrap();
            inner
                .bindings
                .values()
                .filter(|binding| binding.matches(key))
                .map(|binding| Arc::clone(&binding.action))
                .collect()
        };
        for action in actions {
            (action.lock().unwrap())();
        }
    }
}

/// Ownership of one registered binding.
pub struct BindingHandle {
    id: u64,
    inner: Weak<Mutex<RouterInner>>,
}

impl BindingHandle {
    /// Atomically replace this binding's keys and action.
    pub fn rebind(&self, keys: &[Key], action: impl FnMut() + Send + 'static) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.lock().unwrap();
            inner.bindings.insert(self.id, Binding::new(keys, action));
        }
    }
}

impl Drop for BindingHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().bindings.remove(&self.id);
        }
    }
}
