//! Mapped-memory tracking: which resources are CPU-mapped right now, and the
//! bytes the application wrote into them.

use std::collections::HashMap;
use std::ops::Range;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::command::Command;
use crate::driver::ResourceObject;
use crate::key_registry::Key;
use crate::utils::Overridable;
use crate::write_watch::{default_tracker, DirtyPageTracker};
use crate::{CpuPageProperty, HeapFlags, HeapProperties, HeapType, MemoryPool};

/// Bytes written by the CPU into a mapped subresource, to be recorded ahead
/// of the GPU work that reads them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedDataUpdate {
    pub resource_key: Key,
    pub subresource: u32,
    pub offset: u64,
    pub data: Vec<u8>,
}

impl From<MappedDataUpdate> for Command {
    fn from(update: MappedDataUpdate) -> Self {
        Command::MappedDataMeta {
            resource_key: update.resource_key,
            subresource: update.subresource,
            offset: update.offset,
            data: update.data,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct MapRecord {
    pointer: usize,
    size: usize,
    map_count: u32,
}

pub struct MapTrackingService {
    write_watch: bool,
    tracker: Box<dyn DirtyPageTracker>,
    mapped: Mutex<HashMap<(Key, u32), MapRecord>>,
}

impl std::fmt::Debug for MapTrackingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapTrackingService")
            .field("write_watch", &self.write_watch)
            .field("mapped", &self.mapped.lock().len())
            .finish()
    }
}

impl MapTrackingService {
    pub fn new(use_write_watch: bool) -> Self {
        Self::with_tracker(
            use_write_watch && cfg!(windows),
            default_tracker(use_write_watch),
        )
    }

    /// `write_watch` tells whether heaps should be armed for OS write
    /// watching, which only helps a tracker that asks the OS.
    pub fn with_tracker(write_watch: bool, tracker: Box<dyn DirtyPageTracker>) -> Self {
        Self {
            write_watch,
            tracker,
            mapped: Mutex::new(HashMap::new()),
        }
    }

    /// Rewrites the heap description of a pending creation call so the OS
    /// can watch its pages. UPLOAD and READBACK heaps are restated as the
    /// equivalent CUSTOM heap, since write watch can't be combined with a
    /// preset type. Returns true if anything was overridden.
    pub fn enable_write_watch(
        &self,
        properties: &mut Overridable<HeapProperties>,
        flags: &mut Overridable<HeapFlags>,
    ) -> bool {
        if !self.write_watch || !properties.value.is_cpu_mappable() {
            return false;
        }

        properties.override_with(|properties| {
            let page_property = match properties.get_type() {
                Some(HeapType::Upload) => CpuPageProperty::WriteCombine,
                Some(HeapType::Readback) => CpuPageProperty::WriteBack,
                _ => return false,
            };
            *properties = properties
                .set_type(HeapType::Custom)
                .set_cpu_page_property(page_property)
                .set_memory_pool_preference(MemoryPool::L0);
            true
        });
        flags.override_with(|flags| {
            flags.insert(HeapFlags::AllowWriteWatch);
            true
        })
    }

    /// Starts tracking a `Map` that handed out `pointer`. Nested maps of the
    /// same subresource share one record.
    pub fn map_resource(
        &self,
        key: Key,
        resource: &dyn ResourceObject,
        subresource: u32,
        pointer: usize,
    ) {
        if pointer == 0 {
            return;
        }
        let mut mapped = self.mapped.lock();
        let record = mapped.entry((key, subresource)).or_insert_with(|| MapRecord {
            pointer,
            size: resource.get_mapped_size(subresource) as usize,
            map_count: 0,
        });
        record.map_count += 1;
        debug!(
            "Resource {} subresource {} mapped at {:#x} ({} active map(s))",
            key, subresource, pointer, record.map_count
        );
    }

    /// Ends one `Map`; the last one harvests the subresource.
    pub fn unmap_resource(&self, key: Key, subresource: u32) -> Vec<MappedDataUpdate> {
        let record = {
            let mut mapped = self.mapped.lock();
            let record = match mapped.get_mut(&(key, subresource)) {
                Some(record) => record,
                None => return Vec::new(),
            };
            record.map_count -= 1;
            if record.map_count > 0 {
                return Vec::new();
            }
            let record = *record;
            mapped.remove(&(key, subresource));
            record
        };

        let updates = self.harvest(key, subresource, &record);
        self.tracker.forget(record.pointer);
        updates
    }

    /// Harvests every mapped subresource at a submission boundary.
    pub fn execute_command_lists(&self) -> Vec<MappedDataUpdate> {
        let mut records: Vec<_> = self
            .mapped
            .lock()
            .iter()
            .map(|(id, record)| (*id, *record))
            .collect();
        records.sort_by_key(|(id, _)| *id);

        records
            .iter()
            .flat_map(|((key, subresource), record)| self.harvest(*key, *subresource, record))
            .collect()
    }

    pub fn destroy_resource(&self, key: Key) {
        let mut mapped = self.mapped.lock();
        let tracker = &self.tracker;
        mapped.retain(|(mapped_key, _), record| {
            if *mapped_key == key {
                tracker.forget(record.pointer);
                false
            } else {
                true
            }
        });
    }

    pub fn is_mapped(&self, key: Key, subresource: u32) -> bool {
        self.mapped.lock().contains_key(&(key, subresource))
    }

    fn harvest(&self, key: Key, subresource: u32, record: &MapRecord) -> Vec<MappedDataUpdate> {
        // The mapping stays valid until the application's Unmap is forwarded,
        // which happens after this hook returns.
        let ranges: Vec<Range<usize>> =
            match unsafe { self.tracker.collect(record.pointer, record.size) } {
                Ok(ranges) => ranges,
                Err(error) => {
                    warn!("{}, recording resource {} in full", error, key);
                    vec![0..record.size]
                }
            };

        ranges
            .into_iter()
            .map(|range| {
                let data = unsafe {
                    std::slice::from_raw_parts((record.pointer + range.start) as *const u8, range.len())
                };
                MappedDataUpdate {
                    resource_key: key,
                    subresource,
                    offset: range.start as u64,
                    data: data.to_vec(),
                }
            })
            .collect()
    }
}
