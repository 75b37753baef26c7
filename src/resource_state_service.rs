//! Shadow model of resource-to-heap ownership, heap allocations opened from
//! host memory, swapchain buffers and shared-handle promotion.

use std::collections::HashMap;

use log::debug;
use parking_lot::Mutex;

use crate::command::{Command, HandleArg, ObjectArg};
use crate::driver::{HeapObject, ResourceObject, SharedObject};
use crate::key_registry::Key;
use crate::raw_bindings::d3d12::*;
use crate::utils::Overridable;
use crate::{FenceFlags, InterfaceId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourcePlacement {
    /// Backed by its own implicit heap.
    Committed,
    Placed { heap_key: Key, offset: u64 },
    Reserved,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResourceRecord {
    pub key: Key,
    pub placement: ResourcePlacement,
    pub size: u64,
    pub mappable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapRecord {
    pub key: Key,
    pub size: u64,
    pub mappable: bool,
    /// Placed resources and their offsets, in placement order.
    pub placed: Vec<(Key, u64)>,
    /// Host allocation the heap was opened from.
    pub host_address: Option<usize>,
}

#[derive(Debug, Default)]
struct ResourceState {
    resources: HashMap<Key, ResourceRecord>,
    heaps: HashMap<Key, HeapRecord>,
    swapchain_buffers: HashMap<Key, HashMap<u32, Key>>,
}

#[derive(Debug, Default)]
pub struct ResourceStateService {
    state: Mutex<ResourceState>,
}

impl ResourceStateService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_committed_resource(&self, key: Key, resource: &dyn ResourceObject) {
        let mappable = resource
            .get_heap_properties()
            .map(|(properties, _)| properties.is_cpu_mappable())
            .unwrap_or(false);
        self.insert_resource(key, ResourcePlacement::Committed, resource, mappable);
    }

    pub fn create_reserved_resource(&self, key: Key, resource: &dyn ResourceObject) {
        self.insert_resource(key, ResourcePlacement::Reserved, resource, false);
    }

    pub fn create_placed_resource(
        &self,
        key: Key,
        resource: &dyn ResourceObject,
        heap_key: Key,
        heap: &dyn HeapObject,
        offset: u64,
    ) {
        let mut state = self.state.lock();
        let heap_record = state.heaps.entry(heap_key).or_insert_with(|| {
            let desc = heap.get_desc();
            HeapRecord {
                key: heap_key,
                size: desc.get_size_in_bytes().0,
                mappable: desc.get_properties().is_cpu_mappable(),
                placed: Vec::new(),
                host_address: None,
            }
        });
        heap_record.placed.push((key, offset));
        let mappable = heap_record.mappable;

        state.resources.insert(
            key,
            ResourceRecord {
                key,
                placement: ResourcePlacement::Placed { heap_key, offset },
                size: resource.get_desc().get_width(),
                mappable,
            },
        );
    }

    fn insert_resource(
        &self,
        key: Key,
        placement: ResourcePlacement,
        resource: &dyn ResourceObject,
        mappable: bool,
    ) {
        self.state.lock().resources.insert(
            key,
            ResourceRecord {
                key,
                placement,
                size: resource.get_desc().get_width(),
                mappable,
            },
        );
    }

    pub fn create_heap(&self, key: Key, heap: &dyn HeapObject) {
        let desc = heap.get_desc();
        self.state.lock().heaps.insert(
            key,
            HeapRecord {
                key,
                size: desc.get_size_in_bytes().0,
                mappable: desc.get_properties().is_cpu_mappable(),
                placed: Vec::new(),
                host_address: None,
            },
        );
    }

    /// Registers a heap opened from a host allocation and returns the
    /// meta-command that carries its current contents.
    ///
    /// # Safety
    /// `address` must point to at least the heap's size in readable bytes.
    pub unsafe fn create_heap_from_address(
        &self,
        key: Key,
        heap: &dyn HeapObject,
        address: usize,
    ) -> Command {
        let desc = heap.get_desc();
        let size = desc.get_size_in_bytes().0;
        self.state.lock().heaps.insert(
            key,
            HeapRecord {
                key,
                size,
                mappable: true,
                placed: Vec::new(),
                host_address: Some(address),
            },
        );

        let data = if address == 0 || size == 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(address as *const u8, size as usize).to_vec()
        };
        debug!(
            "Heap {} opened from host allocation {:#x}+{:#x}",
            key, address, size
        );
        Command::CreateHeapAllocationMeta {
            heap_key: key,
            address,
            data,
        }
    }

    /// Whether the memory behind `key` (a heap or a resource) can be mapped
    /// by the CPU.
    pub fn is_resource_heap_mappable(&self, key: Key) -> bool {
        let state = self.state.lock();
        if let Some(heap) = state.heaps.get(&key) {
            return heap.mappable;
        }
        state
            .resources
            .get(&key)
            .map(|resource| resource.mappable)
            .unwrap_or(false)
    }

    pub fn resource(&self, key: Key) -> Option<ResourceRecord> {
        self.state.lock().resources.get(&key).copied()
    }

    pub fn heap(&self, key: Key) -> Option<HeapRecord> {
        self.state.lock().heaps.get(&key).cloned()
    }

    pub fn set_swapchain_buffer(&self, swapchain_key: Key, index: u32, resource_key: Key) {
        self.state
            .lock()
            .swapchain_buffers
            .entry(swapchain_key)
            .or_default()
            .insert(index, resource_key);
    }

    pub fn swapchain_buffer(&self, swapchain_key: Key, index: u32) -> Option<Key> {
        self.state
            .lock()
            .swapchain_buffers
            .get(&swapchain_key)
            .and_then(|buffers| buffers.get(&index).copied())
    }

    /// Drops the buffer associations of a swapchain, e.g. on `ResizeBuffers`.
    pub fn clear_swapchain(&self, swapchain_key: Key) {
        self.state.lock().swapchain_buffers.remove(&swapchain_key);
    }

    /// Forgets `key`. A destroyed heap takes its placed resources' records
    /// with it.
    pub fn destroy(&self, key: Key) {
        let mut state = self.state.lock();
        if let Some(record) = state.resources.remove(&key) {
            if let ResourcePlacement::Placed { heap_key, .. } = record.placement {
                if let Some(heap) = state.heaps.get_mut(&heap_key) {
                    heap.placed.retain(|(placed_key, _)| *placed_key != key);
                }
            }
        }
        if let Some(heap) = state.heaps.remove(&key) {
            for (placed_key, _) in heap.placed {
                state.resources.remove(&placed_key);
            }
        }
        state.swapchain_buffers.remove(&key);
        for buffers in state.swapchain_buffers.values_mut() {
            buffers.retain(|_, resource_key| *resource_key != key);
        }
    }

    /// Builds the creation command a shared object is recorded as, so replay
    /// doesn't depend on a handle from another process. `key` is the key the
    /// opened object was given. Returns `None` for interfaces that can't be
    /// promoted.
    pub fn promote_open_shared_handle(
        &self,
        interface: InterfaceId,
        object: &SharedObject,
        key: Key,
    ) -> Option<Command> {
        match object {
            SharedObject::Resource(resource) if interface.is_resource() => {
                let (properties, flags) = match resource.get_heap_properties() {
                    Ok(heap) => heap,
                    Err(err) => {
                        log_once!(error, "Cannot promote shared resource {}: {}", key, err);
                        return None;
                    }
                };
                self.create_committed_resource(key, resource.as_ref());

                let mut created = ObjectArg::new(resource.clone());
                created.key = key;
                Some(Command::CreateCommittedResource {
                    interface_version: 0,
                    device: HandleArg::null(),
                    heap_properties: Overridable::new(properties),
                    heap_flags: Overridable::new(flags),
                    desc: resource.get_desc(),
                    initial_state: D3D12_RESOURCE_STATE_COMMON,
                    has_clear_value: false,
                    resource: created,
                })
            }
            SharedObject::Fence(fence) if interface.is_fence() => {
                let mut created = ObjectArg::new(fence.clone());
                created.key = key;
                Some(Command::CreateFence {
                    device: HandleArg::null(),
                    initial_value: fence.get_completed_value(),
                    flags: FenceFlags::Shared,
                    fence: created,
                })
            }
            _ => {
                log_once!(
                    error,
                    "OpenSharedHandle for interface {} is not supported, object {} is recorded as-is",
                    interface, key
                );
                None
            }
        }
    }
}
