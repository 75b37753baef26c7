//! Resolution of CPU and GPU descriptor handles to `(descriptor heap, index)`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::debug;
use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::driver::{DescriptorHeapObject, DeviceObject};
use crate::key_registry::Key;
use crate::DescriptorHeapType;

/// CPU and GPU handles of the same descriptor live in separate address
/// spaces, so every lookup names the space it is asking about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HandleKind {
    Cpu,
    Gpu,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DescriptorHandleInfo {
    pub heap_key: Key,
    pub index: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DescriptorLookup {
    /// The handle was zero.
    NoDescriptor,
    Resolved(DescriptorHandleInfo),
    Unresolved,
}

impl DescriptorLookup {
    pub fn info(self) -> Option<DescriptorHandleInfo> {
        match self {
            DescriptorLookup::Resolved(info) => Some(info),
            _ => None,
        }
    }
}

#[derive(Copy, Clone)]
struct DescriptorHeapRecord {
    heap_type: DescriptorHeapType,
    increment: u64,
    cpu_base: u64,
    gpu_base: Option<u64>,
    capacity: u32,
}

impl fmt::Debug for DescriptorHeapRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorHeapRecord")
            .field("heap_type", &self.heap_type)
            .field("increment", &self.increment)
            .field("cpu_base", &format_args!("{:#x}", self.cpu_base))
            .field("gpu_base", &self.gpu_base.map(|base| format!("{:#x}", base)))
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl DescriptorHeapRecord {
    fn index_of(&self, base: u64, raw: u64) -> Option<u32> {
        let index = (raw - base) / self.increment;
        if index < self.capacity as u64 {
            Some(index as u32)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct DescriptorState {
    heaps: HashMap<Key, DescriptorHeapRecord>,
    cpu_bases: [BTreeMap<u64, Key>; DescriptorHeapType::COUNT],
    gpu_bases: [BTreeMap<u64, Key>; DescriptorHeapType::COUNT],
}

impl DescriptorState {
    fn bases(&self, heap_type: DescriptorHeapType, kind: HandleKind) -> &BTreeMap<u64, Key> {
        match kind {
            HandleKind::Cpu => &self.cpu_bases[heap_type.index()],
            HandleKind::Gpu => &self.gpu_bases[heap_type.index()],
        }
    }

    fn remove(&mut self, key: Key) -> Option<DescriptorHeapRecord> {
        let record = self.heaps.remove(&key)?;
        let slot = record.heap_type.index();
        if self.cpu_bases[slot].get(&record.cpu_base) == Some(&key) {
            self.cpu_bases[slot].remove(&record.cpu_base);
        }
        if let Some(gpu_base) = record.gpu_base {
            if self.gpu_bases[slot].get(&gpu_base) == Some(&key) {
                self.gpu_bases[slot].remove(&gpu_base);
            }
        }
        Some(record)
    }
}

/// Per-type index of live descriptor heaps by their start handles.
#[derive(Debug, Default)]
pub struct DescriptorHandleService {
    state: Mutex<DescriptorState>,
}

impl DescriptorHandleService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the heap's start handles and capacity, and the device's
    /// increment for its type. The GPU start is only recorded for
    /// shader-visible heaps.
    pub fn create_descriptor_heap(
        &self,
        key: Key,
        heap: &dyn DescriptorHeapObject,
        device: &dyn DeviceObject,
    ) {
        let desc = heap.get_desc();
        let heap_type = match desc.get_type() {
            Some(heap_type) => heap_type,
            None => {
                log_once!(
                    error,
                    "Descriptor heap {} has unknown type {}, handles into it stay unresolved",
                    key,
                    desc.0.Type
                );
                return;
            }
        };

        let increment = device.get_descriptor_handle_increment_size(heap_type) as u64;
        assert!(increment > 0, "device reported a zero descriptor increment");

        let record = DescriptorHeapRecord {
            heap_type,
            increment,
            cpu_base: heap.get_cpu_descriptor_handle_for_heap_start().ptr(),
            gpu_base: if desc.is_shader_visible() {
                Some(heap.get_gpu_descriptor_handle_for_heap_start().ptr())
            } else {
                None
            },
            capacity: desc.get_num_descriptors(),
        };
        debug!("Tracking descriptor heap {}: {:?}", key, record);

        let mut state = self.state.lock();
        state.remove(key);
        let slot = heap_type.index();
        state.cpu_bases[slot].insert(record.cpu_base, key);
        if let Some(gpu_base) = record.gpu_base {
            state.gpu_bases[slot].insert(gpu_base, key);
        }
        state.heaps.insert(key, record);
    }

    pub fn destroy_descriptor_heap(&self, key: Key) -> bool {
        self.state.lock().remove(key).is_some()
    }

    pub fn resolve(
        &self,
        heap_type: DescriptorHeapType,
        kind: HandleKind,
        raw: u64,
    ) -> DescriptorLookup {
        if raw == 0 {
            return DescriptorLookup::NoDescriptor;
        }

        let state = self.state.lock();
        let (base, key) = match state.bases(heap_type, kind).range(..=raw).next_back() {
            Some((base, key)) => (*base, *key),
            None => return DescriptorLookup::Unresolved,
        };
        let record = &state.heaps[&key];

        match record.index_of(base, raw) {
            Some(index) => DescriptorLookup::Resolved(DescriptorHandleInfo {
                heap_key: key,
                index,
            }),
            None => DescriptorLookup::Unresolved,
        }
    }

    pub fn heap_type_of(&self, key: Key) -> Option<DescriptorHeapType> {
        self.state.lock().heaps.get(&key).map(|record| record.heap_type)
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().heaps.len()
    }
}
