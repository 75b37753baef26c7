//! Hand-off of annotated calls to the trace writer.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::behavior::CaptureBehavior;
use crate::command::{Call, Command};
use crate::key_registry::Key;
use crate::layer::Layer;
use crate::utils::RestoreOverrides;

/// Trace writer collaborator.
///
/// Implementations must serialize [`crate::Overridable::recorded`] for
/// overridable arguments, never the driver-facing value.
pub trait Recorder: Send + Sync {
    fn record(&self, key: Key, command: &Command);

    /// The command under `key` must not appear in the trace.
    fn skip(&self, key: Key);
}

impl<R: Recorder + ?Sized> Recorder for Arc<R> {
    fn record(&self, key: Key, command: &Command) {
        (**self).record(key, command)
    }

    fn skip(&self, key: Key) {
        (**self).skip(key)
    }
}

/// Last layer of the pipeline: records every call while the capture
/// behavior says so. Meta-commands queued by earlier layers go first.
pub struct RecorderLayer<R> {
    recorder: R,
    behavior: Arc<CaptureBehavior>,
}

impl<R: Recorder> RecorderLayer<R> {
    pub fn new(recorder: R, behavior: Arc<CaptureBehavior>) -> Self {
        Self { recorder, behavior }
    }
}

impl<R: Recorder> Layer for RecorderLayer<R> {
    fn pre(&self, _call: &mut Call) {}

    fn post(&self, call: &mut Call) {
        if !self.behavior.is_capturing() {
            return;
        }
        for (key, command) in &call.prelude {
            self.recorder.record(*key, command);
        }
        if call.skip {
            self.recorder.skip(call.key);
        } else {
            self.recorder.record(call.key, &call.command);
        }
    }
}

#[derive(Clone, Debug)]
pub struct TraceEntry {
    pub key: Key,
    pub name: &'static str,
    /// The command as the application issued it.
    pub command: Command,
}

/// In-memory trace, ordered by command key.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    entries: Mutex<Vec<TraceEntry>>,
    skipped: Mutex<HashSet<Key>>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded entries without skipped keys, sorted by key.
    pub fn entries(&self) -> Vec<TraceEntry> {
        let skipped = self.skipped.lock();
        let mut entries: Vec<_> = self
            .entries
            .lock()
            .iter()
            .filter(|entry| !skipped.contains(&entry.key))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.key);
        entries
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries().iter().map(|entry| entry.name).collect()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.lock().len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        self.skipped.lock().clear();
    }
}

impl Recorder for TraceRecorder {
    fn record(&self, key: Key, command: &Command) {
        let mut command = command.clone();
        command.restore_overrides();
        self.entries.lock().push(TraceEntry {
            key,
            name: command.name(),
            command,
        });
    }

    fn skip(&self, key: Key) {
        self.skipped.lock().insert(key);
    }
}
