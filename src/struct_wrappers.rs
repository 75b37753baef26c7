#![allow(non_upper_case_globals)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::const_wrappers::DEFAULT_RESOURCE_ALIGNMENT;
use crate::enum_wrappers::*;
use crate::raw_bindings::d3d12::*;
use crate::utils::*;

// Only newtypes for data structs live here; anything that carries
// capture-side state belongs to the owning service module.

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct GpuVirtualAddress(pub D3D12_GPU_VIRTUAL_ADDRESS);

impl GpuVirtualAddress {
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CpuDescriptorHandle(pub D3D12_CPU_DESCRIPTOR_HANDLE);

impl CpuDescriptorHandle {
    pub fn new(ptr: usize) -> Self {
        Self(D3D12_CPU_DESCRIPTOR_HANDLE { ptr })
    }

    pub fn ptr(&self) -> u64 {
        self.0.ptr as u64
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct GpuDescriptorHandle(pub D3D12_GPU_DESCRIPTOR_HANDLE);

impl GpuDescriptorHandle {
    pub fn new(ptr: u64) -> Self {
        Self(D3D12_GPU_DESCRIPTOR_HANDLE { ptr })
    }

    pub fn ptr(&self) -> u64 {
        self.0.ptr
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct HeapProperties(pub D3D12_HEAP_PROPERTIES);

impl Default for HeapProperties {
    fn default() -> Self {
        HeapProperties(D3D12_HEAP_PROPERTIES {
            Type: HeapType::Default as i32,
            CPUPageProperty: CpuPageProperty::Unknown as i32,
            MemoryPoolPreference: MemoryPool::Unknown as i32,
            CreationNodeMask: 0,
            VisibleNodeMask: 0,
        })
    }
}

impl HeapProperties {
    pub fn set_type(mut self, heap_type: HeapType) -> Self {
        self.0.Type = heap_type as i32;
        self
    }

    pub fn get_type(&self) -> Option<HeapType> {
        HeapType::from_raw(self.0.Type)
    }

    pub fn set_cpu_page_property(mut self, cpu_page_property: CpuPageProperty) -> Self {
        self.0.CPUPageProperty = cpu_page_property as i32;
        self
    }

    pub fn get_cpu_page_property(&self) -> Option<CpuPageProperty> {
        CpuPageProperty::from_raw(self.0.CPUPageProperty)
    }

    pub fn set_memory_pool_preference(mut self, memory_pool_preference: MemoryPool) -> Self {
        self.0.MemoryPoolPreference = memory_pool_preference as i32;
        self
    }

    pub fn get_memory_pool_preference(&self) -> Option<MemoryPool> {
        MemoryPool::from_raw(self.0.MemoryPoolPreference)
    }

    /// A heap is CPU-mappable unless it is a DEFAULT heap or its pages
    /// are explicitly not CPU-accessible.
    pub fn is_cpu_mappable(&self) -> bool {
        !(self.0.Type == D3D12_HEAP_TYPE_DEFAULT
            || self.0.CPUPageProperty == D3D12_CPU_PAGE_PROPERTY_NOT_AVAILABLE)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct HeapDesc(pub D3D12_HEAP_DESC);

impl HeapDesc {
    pub fn set_size_in_bytes(mut self, size: Bytes) -> Self {
        self.0.SizeInBytes = size.0;
        self
    }

    pub fn get_size_in_bytes(&self) -> Bytes {
        Bytes(self.0.SizeInBytes)
    }

    pub fn set_properties(mut self, properties: HeapProperties) -> Self {
        self.0.Properties = properties.0;
        self
    }

    pub fn get_properties(&self) -> HeapProperties {
        HeapProperties(self.0.Properties)
    }

    pub fn set_alignment(mut self, alignment: Bytes) -> Self {
        self.0.Alignment = alignment.0;
        self
    }

    pub fn set_flags(mut self, flags: HeapFlags) -> Self {
        self.0.Flags = flags.bits();
        self
    }

    pub fn get_flags(&self) -> HeapFlags {
        HeapFlags::from_bits_truncate(self.0.Flags)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct ResourceDesc(pub D3D12_RESOURCE_DESC);

impl Default for ResourceDesc {
    fn default() -> Self {
        ResourceDesc(D3D12_RESOURCE_DESC {
            Dimension: ResourceDimension::Unknown as i32,
            Alignment: DEFAULT_RESOURCE_ALIGNMENT.0,
            Width: 0,
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            Format: 0,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Layout: 0,
            Flags: 0,
        })
    }
}

impl ResourceDesc {
    pub fn set_dimension(mut self, dimension: ResourceDimension) -> Self {
        self.0.Dimension = dimension as i32;
        self
    }

    pub fn get_dimension(&self) -> ResourceDimension {
        ResourceDimension::from_raw(self.0.Dimension)
    }

    pub fn set_alignment(mut self, alignment: Bytes) -> Self {
        self.0.Alignment = alignment.0;
        self
    }

    pub fn set_width(mut self, width: u64) -> Self {
        self.0.Width = width;
        self
    }

    pub fn get_width(&self) -> u64 {
        self.0.Width
    }

    pub fn set_height(mut self, height: u32) -> Self {
        self.0.Height = height;
        self
    }

    pub fn set_depth_or_array_size(mut self, depth_or_array_size: u16) -> Self {
        self.0.DepthOrArraySize = depth_or_array_size;
        self
    }

    pub fn set_mip_levels(mut self, mip_levels: u16) -> Self {
        self.0.MipLevels = mip_levels;
        self
    }

    pub fn set_format(mut self, format: i32) -> Self {
        self.0.Format = format;
        self
    }

    pub fn is_buffer(&self) -> bool {
        self.0.Dimension == D3D12_RESOURCE_DIMENSION_BUFFER
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct DescriptorHeapDesc(pub D3D12_DESCRIPTOR_HEAP_DESC);

impl Default for DescriptorHeapDesc {
    fn default() -> Self {
        Self(D3D12_DESCRIPTOR_HEAP_DESC {
            Type: DescriptorHeapType::CBV_SRV_UAV as i32,
            NumDescriptors: 0,
            Flags: DescriptorHeapFlags::None.bits(),
            NodeMask: 0,
        })
    }
}

impl DescriptorHeapDesc {
    pub fn set_type(mut self, heap_type: DescriptorHeapType) -> Self {
        self.0.Type = heap_type as i32;
        self
    }

    pub fn get_type(&self) -> Option<DescriptorHeapType> {
        DescriptorHeapType::from_raw(self.0.Type)
    }

    pub fn set_num_descriptors(mut self, count: u32) -> Self {
        self.0.NumDescriptors = count;
        self
    }

    pub fn get_num_descriptors(&self) -> u32 {
        self.0.NumDescriptors
    }

    pub fn set_flags(mut self, flags: DescriptorHeapFlags) -> Self {
        self.0.Flags = flags.bits();
        self
    }

    pub fn get_flags(&self) -> DescriptorHeapFlags {
        DescriptorHeapFlags::from_bits_truncate(self.0.Flags)
    }

    pub fn is_shader_visible(&self) -> bool {
        self.get_flags().contains(DescriptorHeapFlags::ShaderVisible)
    }
}

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct Range(pub D3D12_RANGE);

impl Range {
    pub fn set_begin(mut self, begin: Bytes) -> Self {
        self.0.Begin = begin.0 as usize;
        self
    }

    pub fn get_begin(&self) -> Bytes {
        Bytes::from(self.0.Begin)
    }

    pub fn set_end(mut self, end: Bytes) -> Self {
        self.0.End = end.0 as usize;
        self
    }

    pub fn get_end(&self) -> Bytes {
        Bytes::from(self.0.End)
    }

    pub fn is_empty(&self) -> bool {
        self.0.End <= self.0.Begin
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct InterfaceId(pub IID);

impl InterfaceId {
    pub fn is_resource(&self) -> bool {
        self.0 == IID_ID3D12Resource
            || self.0 == IID_ID3D12Resource1
            || self.0 == IID_ID3D12Resource2
    }

    pub fn is_fence(&self) -> bool {
        self.0 == IID_ID3D12Fence || self.0 == IID_ID3D12Fence1
    }
}

impl std::fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let g = &self.0;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            g.Data1,
            g.Data2,
            g.Data3,
            g.Data4[0],
            g.Data4[1],
            g.Data4[2],
            g.Data4[3],
            g.Data4[4],
            g.Data4[5],
            g.Data4[6],
            g.Data4[7],
        )
    }
}
