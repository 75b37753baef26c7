//! Read-only view of the driver objects the application created.
//!
//! The capture core never mutates driver state; everything it needs from a
//! live object goes through these introspection traits. Implementations wrap
//! the real COM interfaces, or stand-ins in tests.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    CpuDescriptorHandle, DescriptorHeapDesc, DescriptorHeapType, DxResult, GpuDescriptorHandle,
    GpuVirtualAddress, HeapDesc, HeapFlags, HeapProperties, ResourceDesc,
};

/// Raw interface pointer value of a driver object.
///
/// Drivers recycle these after the last `Release`, so a handle alone is not
/// an identity; see [`crate::KeyRegistry`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct NativeHandle(pub usize);

impl NativeHandle {
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

pub trait DriverObject: Send + Sync {
    fn native_handle(&self) -> NativeHandle;
}

pub trait ResourceObject: DriverObject {
    fn get_desc(&self) -> ResourceDesc;

    /// Zero for non-buffer resources.
    fn get_gpu_virtual_address(&self) -> GpuVirtualAddress;

    fn get_heap_properties(&self) -> DxResult<(HeapProperties, HeapFlags)>;

    /// Number of CPU-visible bytes `Map` exposes for `subresource`.
    fn get_mapped_size(&self, subresource: u32) -> u64;
}

pub trait HeapObject: DriverObject {
    fn get_desc(&self) -> HeapDesc;

    /// Base of the heap in the GPU virtual address space, when the driver
    /// exposes one. Heaps opened from a host allocation report the host
    /// pointer here.
    fn get_gpu_virtual_address(&self) -> Option<GpuVirtualAddress>;
}

pub trait DescriptorHeapObject: DriverObject {
    fn get_desc(&self) -> DescriptorHeapDesc;

    fn get_cpu_descriptor_handle_for_heap_start(&self) -> CpuDescriptorHandle;

    /// Only meaningful for shader-visible heaps.
    fn get_gpu_descriptor_handle_for_heap_start(&self) -> GpuDescriptorHandle;
}

pub trait FenceObject: DriverObject {
    fn get_completed_value(&self) -> u64;
}

pub trait DeviceObject: DriverObject {
    fn get_descriptor_handle_increment_size(&self, heap_type: DescriptorHeapType) -> u32;
}

/// The window a swapchain presents to.
pub trait WindowObject: DriverObject {
    /// Width and height of the client area.
    fn get_client_size(&self) -> DxResult<(u32, u32)>;
}

/// An object handed back by `OpenSharedHandle`, typed by the requested
/// interface.
#[derive(Clone)]
pub enum SharedObject {
    Resource(Arc<dyn ResourceObject>),
    Fence(Arc<dyn FenceObject>),
    Other(NativeHandle),
}

impl SharedObject {
    pub fn native_handle(&self) -> NativeHandle {
        match self {
            SharedObject::Resource(resource) => resource.native_handle(),
            SharedObject::Fence(fence) => fence.native_handle(),
            SharedObject::Other(handle) => *handle,
        }
    }
}

impl std::fmt::Debug for SharedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SharedObject::Resource(_) => write!(f, "Resource({:?})", self.native_handle()),
            SharedObject::Fence(_) => write!(f, "Fence({:?})", self.native_handle()),
            SharedObject::Other(handle) => write!(f, "Other({:?})", handle),
        }
    }
}
