//! Resolution of raw GPU virtual addresses to `(resource, offset)` pairs.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::driver::{HeapObject, ResourceObject};
use crate::key_registry::Key;
use crate::GpuVirtualAddress;

/// Where a GPU virtual address points to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpuAddressInfo {
    pub resource_key: Key,
    pub offset: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct AddressRange {
    key: Key,
    end: u64,
    heap_key: Option<Key>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct HeapRange {
    start: u64,
    size: u64,
}

// Ranges are ordered by (start, creation sequence) so overlapping placements
// stay distinct entries and the newest one can be picked on lookup.
type RangeId = (u64, u64);

#[derive(Debug, Default)]
struct AddressState {
    ranges: BTreeMap<RangeId, AddressRange>,
    by_key: HashMap<Key, RangeId>,
    placed_by_heap: HashMap<Key, Vec<Key>>,
    heaps: HashMap<Key, HeapRange>,
    next_sequence: u64,
    // Upper bound of every live range size; bounds the backward scan.
    max_size: u64,
}

impl AddressState {
    fn insert(&mut self, key: Key, start: u64, size: u64, heap_key: Option<Key>) {
        self.remove_resource(key);

        let id = (start, self.next_sequence);
        self.next_sequence += 1;
        self.max_size = self.max_size.max(size);
        self.ranges.insert(
            id,
            AddressRange {
                key,
                end: start.saturating_add(size),
                heap_key,
            },
        );
        self.by_key.insert(key, id);
        if let Some(heap_key) = heap_key {
            self.placed_by_heap.entry(heap_key).or_default().push(key);
        }
    }

    fn remove_resource(&mut self, key: Key) -> bool {
        let id = match self.by_key.remove(&key) {
            Some(id) => id,
            None => return false,
        };
        if let Some(range) = self.ranges.remove(&id) {
            if let Some(heap_key) = range.heap_key {
                if let Some(placed) = self.placed_by_heap.get_mut(&heap_key) {
                    placed.retain(|placed_key| *placed_key != key);
                }
            }
            if range.end - id.0 >= self.max_size {
                self.max_size = self
                    .ranges
                    .iter()
                    .map(|((start, _), range)| range.end - start)
                    .max()
                    .unwrap_or(0);
            }
        }
        true
    }

    fn lookup(&self, address: u64) -> Option<GpuAddressInfo> {
        let lowest_start = address.saturating_sub(self.max_size);
        let mut best: Option<(u64, &AddressRange, u64)> = None;

        for ((start, sequence), range) in self.ranges.range(..=(address, u64::MAX)).rev() {
            if *start < lowest_start {
                break;
            }
            if address >= range.end {
                continue;
            }
            match best {
                Some((best_sequence, _, _)) if best_sequence > *sequence => {}
                _ => best = Some((*sequence, range, *start)),
            }
        }

        best.map(|(_, range, start)| GpuAddressInfo {
            resource_key: range.key,
            offset: address - start,
        })
    }
}

/// Range index over every live committed, placed and reserved buffer.
///
/// Placed resources may alias inside a heap; when several live ranges contain
/// an address, the most recently created one owns it.
#[derive(Debug, Default)]
pub struct GpuAddressService {
    state: Mutex<AddressState>,
}

impl GpuAddressService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a committed or reserved resource. The address and size are
    /// queried from the live object, since the driver may have adjusted
    /// them relative to the creation arguments.
    pub fn create_resource(&self, key: Key, resource: &dyn ResourceObject) {
        let address = resource.get_gpu_virtual_address();
        if address.is_null() {
            return;
        }
        let size = resource.get_desc().get_width();
        debug!("Tracking resource {} at {:#x}+{:#x}", key, address.0, size);
        self.state.lock().insert(key, address.0, size, None);
    }

    pub fn create_placed_resource(
        &self,
        key: Key,
        resource: &dyn ResourceObject,
        heap_key: Key,
        heap: &dyn HeapObject,
        heap_offset: u64,
    ) {
        let size = resource.get_desc().get_width();
        let mut state = self.state.lock();

        let heap_base = match state.heaps.get(&heap_key) {
            Some(heap_range) => Some(heap_range.start),
            None => heap.get_gpu_virtual_address().map(|address| address.0),
        };
        let start = match heap_base {
            Some(base) if base != 0 => base.saturating_add(heap_offset),
            _ => {
                let address = resource.get_gpu_virtual_address();
                if address.is_null() {
                    return;
                }
                address.0
            }
        };

        debug!(
            "Tracking placed resource {} at {:#x}+{:#x} (heap {} offset {:#x})",
            key, start, size, heap_key, heap_offset
        );
        state.insert(key, start, size, Some(heap_key));
    }

    /// Registers the mapped range of a heap. Heaps opened from a host
    /// allocation report the host pointer as their base.
    pub fn create_heap(&self, key: Key, heap: &dyn HeapObject) {
        let start = match heap.get_gpu_virtual_address() {
            Some(address) if !address.is_null() => address.0,
            _ => return,
        };
        let size = heap.get_desc().get_size_in_bytes().0;
        self.state
            .lock()
            .heaps
            .insert(key, HeapRange { start, size });
    }

    /// Forgets `key` and, if it is a heap, every resource placed in it.
    pub fn destroy_interface(&self, key: Key) {
        let mut state = self.state.lock();
        state.remove_resource(key);
        state.heaps.remove(&key);
        if let Some(placed) = state.placed_by_heap.remove(&key) {
            debug!(
                "Heap {} destroyed with {} placed resource(s) still tracked",
                key,
                placed.len()
            );
            for placed_key in placed {
                state.remove_resource(placed_key);
            }
        }
    }

    /// `None` when no live range contains `address`.
    pub fn resolve(&self, address: GpuVirtualAddress) -> Option<GpuAddressInfo> {
        if address.is_null() {
            return None;
        }
        self.state.lock().lookup(address.0)
    }

    /// The heap whose mapped range contains `address`, with the offset into it.
    pub fn heap_at(&self, address: GpuVirtualAddress) -> Option<(Key, u64)> {
        let state = self.state.lock();
        state
            .heaps
            .iter()
            .find(|(_, heap)| {
                address.0 >= heap.start && address.0 < heap.start.saturating_add(heap.size)
            })
            .map(|(key, heap)| (*key, address.0 - heap.start))
    }

    pub fn tracked_count(&self) -> usize {
        self.state.lock().ranges.len()
    }
}
