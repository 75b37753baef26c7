//! Fence completion values, wait registrations and poll deduplication.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use parking_lot::Mutex;

use crate::driver::{FenceObject, NativeHandle};
use crate::key_registry::Key;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WaitRegistration {
    pub target_value: u64,
    /// `HANDLE` of the event to signal; null means the call blocked.
    pub event: NativeHandle,
}

#[derive(Debug, Default, Clone)]
pub struct FenceRecord {
    pub completed_value: u64,
    pub waits: Vec<WaitRegistration>,
}

static NEXT_POLL_EPOCH: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // (epoch, fence, value) of this thread's latest `GetCompletedValue`.
    static LAST_POLL: Cell<Option<(u64, Key, u64)>> = Cell::new(None);
}

fn next_poll_epoch() -> u64 {
    NEXT_POLL_EPOCH.fetch_add(1, Ordering::Relaxed)
}

/// Tracks fences and dedupes busy polling of `GetCompletedValue`.
///
/// The poll memo lives in thread-local storage and dies with its thread. It
/// is tagged with an epoch unique to this service, so memos left by another
/// service or from before [`FenceService::reset`] never match.
#[derive(Debug)]
pub struct FenceService {
    fences: Mutex<HashMap<Key, FenceRecord>>,
    poll_epoch: AtomicU64,
}

impl Default for FenceService {
    fn default() -> Self {
        Self {
            fences: Mutex::new(HashMap::new()),
            poll_epoch: AtomicU64::new(next_poll_epoch()),
        }
    }
}

impl FenceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_fence(&self, key: Key, initial_value: u64) {
        self.fences.lock().insert(
            key,
            FenceRecord {
                completed_value: initial_value,
                waits: Vec::new(),
            },
        );
    }

    /// Records a wait registration. Fences created before tracking started
    /// are picked up here from their live completed value.
    pub fn set_event_on_completion(
        &self,
        fence: &dyn FenceObject,
        key: Key,
        target_value: u64,
        event: NativeHandle,
    ) {
        let live_value = fence.get_completed_value();
        let mut fences = self.fences.lock();
        let record = fences.entry(key).or_insert_with(|| FenceRecord {
            completed_value: live_value,
            waits: Vec::new(),
        });
        if record.completed_value >= target_value {
            debug!(
                "Fence {} already reached {}, wait on event {:#x} is satisfied",
                key, target_value, event.0
            );
            return;
        }
        record.waits.push(WaitRegistration {
            target_value,
            event,
        });
    }

    /// Advances the last known value and returns the waits it satisfies.
    pub fn signal(&self, key: Key, value: u64) -> Vec<WaitRegistration> {
        let mut fences = self.fences.lock();
        let record = fences.entry(key).or_default();
        if value > record.completed_value {
            record.completed_value = value;
        }

        let completed = record.completed_value;
        let (satisfied, pending) = record
            .waits
            .drain(..)
            .partition(|wait| wait.target_value <= completed);
        record.waits = pending;
        satisfied
    }

    pub fn completed_value(&self, key: Key) -> Option<u64> {
        self.fences.lock().get(&key).map(|record| record.completed_value)
    }

    pub fn pending_waits(&self, key: Key) -> Vec<WaitRegistration> {
        self.fences
            .lock()
            .get(&key)
            .map(|record| record.waits.clone())
            .unwrap_or_default()
    }

    /// True when the calling thread's previous poll saw the same fence at
    /// the same value. Always updates the memo.
    pub fn should_skip_poll(&self, key: Key, value: u64) -> bool {
        self.signal(key, value);
        let epoch = self.poll_epoch.load(Ordering::Relaxed);
        let previous = LAST_POLL.with(|last_poll| last_poll.replace(Some((epoch, key, value))));
        previous == Some((epoch, key, value))
    }

    /// Keys are never reused, so a memo naming a destroyed fence can't match
    /// a later poll.
    pub fn destroy_fence(&self, key: Key) -> bool {
        self.fences.lock().remove(&key).is_some()
    }

    pub fn reset(&self) {
        self.poll_epoch.store(next_poll_epoch(), Ordering::Relaxed);
        self.fences.lock().clear();
    }
}
