//! Replay-portable identities for driver objects and recorded commands.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "log_key_lifetime")]
use log::trace;
use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::driver::NativeHandle;

/// Process-unique, monotonically assigned identity.
///
/// Key `0` is never handed out and stands for "no object" in resolved
/// arguments.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct Key(pub u32);

assert_eq_size!(Key, u32);

impl Key {
    pub const NONE: Key = Key(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

#[derive(Debug)]
struct RegistryState {
    next_object_key: u32,
    next_command_key: u32,
    live: HashMap<NativeHandle, Key>,
    retired: usize,
}

/// Maps native interface pointers to keys.
///
/// Allocation and the table update happen under one lock, so two threads
/// racing on the same fresh handle agree on its key.
#[derive(Debug)]
pub struct KeyRegistry {
    state: Mutex<RegistryState>,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                next_object_key: 1,
                next_command_key: 1,
                live: HashMap::new(),
                retired: 0,
            }),
        }
    }

    /// Returns the key of `handle` in its current generation, allocating the
    /// next one on first sight.
    pub fn key_for(&self, handle: NativeHandle) -> Key {
        assert!(!handle.is_null(), "null native handle passed to the key registry");

        let mut state = self.state.lock();
        if let Some(key) = state.live.get(&handle) {
            return *key;
        }

        let key = Key(state.next_object_key);
        state.next_object_key = state
            .next_object_key
            .checked_add(1)
            .expect("object key space exhausted");
        state.live.insert(handle, key);

        #[cfg(feature = "log_key_lifetime")]
        trace!("Assigned key {} to native handle {:#x}", key, handle.0);

        key
    }

    pub fn lookup(&self, handle: NativeHandle) -> Option<Key> {
        if handle.is_null() {
            return None;
        }
        self.state.lock().live.get(&handle).copied()
    }

    /// Ends the current generation of `handle`; a recycled handle value
    /// gets a fresh key afterwards.
    pub fn retire(&self, handle: NativeHandle) -> Option<Key> {
        let mut state = self.state.lock();
        let key = state.live.remove(&handle);
        if key.is_some() {
            state.retired += 1;
        }

        #[cfg(feature = "log_key_lifetime")]
        {
            if let Some(key) = key {
                trace!("Retired key {} of native handle {:#x}", key, handle.0);
            }
        }

        key
    }

    pub fn create_command_key(&self) -> Key {
        let mut state = self.state.lock();
        let key = Key(state.next_command_key);
        state.next_command_key = state
            .next_command_key
            .checked_add(1)
            .expect("command key space exhausted");
        key
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn retired_count(&self) -> usize {
        self.state.lock().retired
    }
}
