#![allow(non_upper_case_globals)]

use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::raw_bindings::d3d12::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(i32)]
pub enum HeapType {
    Default = D3D12_HEAP_TYPE_DEFAULT,
    Upload = D3D12_HEAP_TYPE_UPLOAD,
    Readback = D3D12_HEAP_TYPE_READBACK,
    Custom = D3D12_HEAP_TYPE_CUSTOM,
    GpuUpload = D3D12_HEAP_TYPE_GPU_UPLOAD,
}

impl HeapType {
    pub fn from_raw(raw: D3D12_HEAP_TYPE) -> Option<Self> {
        match raw {
            D3D12_HEAP_TYPE_DEFAULT => Some(Self::Default),
            D3D12_HEAP_TYPE_UPLOAD => Some(Self::Upload),
            D3D12_HEAP_TYPE_READBACK => Some(Self::Readback),
            D3D12_HEAP_TYPE_CUSTOM => Some(Self::Custom),
            D3D12_HEAP_TYPE_GPU_UPLOAD => Some(Self::GpuUpload),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(i32)]
pub enum CpuPageProperty {
    Unknown = D3D12_CPU_PAGE_PROPERTY_UNKNOWN,
    NotAvailable = D3D12_CPU_PAGE_PROPERTY_NOT_AVAILABLE,
    WriteCombine = D3D12_CPU_PAGE_PROPERTY_WRITE_COMBINE,
    WriteBack = D3D12_CPU_PAGE_PROPERTY_WRITE_BACK,
}

impl CpuPageProperty {
    pub fn from_raw(raw: D3D12_CPU_PAGE_PROPERTY) -> Option<Self> {
        match raw {
            D3D12_CPU_PAGE_PROPERTY_UNKNOWN => Some(Self::Unknown),
            D3D12_CPU_PAGE_PROPERTY_NOT_AVAILABLE => Some(Self::NotAvailable),
            D3D12_CPU_PAGE_PROPERTY_WRITE_COMBINE => Some(Self::WriteCombine),
            D3D12_CPU_PAGE_PROPERTY_WRITE_BACK => Some(Self::WriteBack),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(i32)]
pub enum MemoryPool {
    Unknown = D3D12_MEMORY_POOL_UNKNOWN,
    L0 = D3D12_MEMORY_POOL_L0,
    L1 = D3D12_MEMORY_POOL_L1,
}

impl MemoryPool {
    pub fn from_raw(raw: D3D12_MEMORY_POOL) -> Option<Self> {
        match raw {
            D3D12_MEMORY_POOL_UNKNOWN => Some(Self::Unknown),
            D3D12_MEMORY_POOL_L0 => Some(Self::L0),
            D3D12_MEMORY_POOL_L1 => Some(Self::L1),
            _ => None,
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(i32)]
pub enum DescriptorHeapType {
    CBV_SRV_UAV = D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
    Sampler = D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
    RTV = D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
    DSV = D3D12_DESCRIPTOR_HEAP_TYPE_DSV,
}

impl DescriptorHeapType {
    pub const COUNT: usize = D3D12_DESCRIPTOR_HEAP_TYPE_NUM_TYPES as usize;

    pub fn from_raw(raw: D3D12_DESCRIPTOR_HEAP_TYPE) -> Option<Self> {
        match raw {
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV => Some(Self::CBV_SRV_UAV),
            D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER => Some(Self::Sampler),
            D3D12_DESCRIPTOR_HEAP_TYPE_RTV => Some(Self::RTV),
            D3D12_DESCRIPTOR_HEAP_TYPE_DSV => Some(Self::DSV),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as i32 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum DescriptorRangeType {
    Srv = D3D12_DESCRIPTOR_RANGE_TYPE_SRV,
    Uav = D3D12_DESCRIPTOR_RANGE_TYPE_UAV,
    Cbv = D3D12_DESCRIPTOR_RANGE_TYPE_CBV,
    Sampler = D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER,
}

impl DescriptorRangeType {
    pub fn from_raw(raw: D3D12_DESCRIPTOR_RANGE_TYPE) -> Option<Self> {
        match raw {
            D3D12_DESCRIPTOR_RANGE_TYPE_SRV => Some(Self::Srv),
            D3D12_DESCRIPTOR_RANGE_TYPE_UAV => Some(Self::Uav),
            D3D12_DESCRIPTOR_RANGE_TYPE_CBV => Some(Self::Cbv),
            D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER => Some(Self::Sampler),
            _ => None,
        }
    }

    /// Samplers live in their own heap type, everything else in CBV_SRV_UAV.
    pub fn heap_type(self) -> DescriptorHeapType {
        match self {
            Self::Sampler => DescriptorHeapType::Sampler,
            _ => DescriptorHeapType::CBV_SRV_UAV,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum RootParameterType {
    DescriptorTable = D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE,
    Constants32Bit = D3D12_ROOT_PARAMETER_TYPE_32BIT_CONSTANTS,
    Cbv = D3D12_ROOT_PARAMETER_TYPE_CBV,
    Srv = D3D12_ROOT_PARAMETER_TYPE_SRV,
    Uav = D3D12_ROOT_PARAMETER_TYPE_UAV,
}

impl RootParameterType {
    pub fn from_raw(raw: D3D12_ROOT_PARAMETER_TYPE) -> Option<Self> {
        match raw {
            D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE => {
                Some(Self::DescriptorTable)
            }
            D3D12_ROOT_PARAMETER_TYPE_32BIT_CONSTANTS => {
                Some(Self::Constants32Bit)
            }
            D3D12_ROOT_PARAMETER_TYPE_CBV => Some(Self::Cbv),
            D3D12_ROOT_PARAMETER_TYPE_SRV => Some(Self::Srv),
            D3D12_ROOT_PARAMETER_TYPE_UAV => Some(Self::Uav),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum RootSignatureVersion {
    V1_0 = D3D_ROOT_SIGNATURE_VERSION_1_0,
    V1_1 = D3D_ROOT_SIGNATURE_VERSION_1_1,
    V1_2 = D3D_ROOT_SIGNATURE_VERSION_1_2,
}

impl RootSignatureVersion {
    pub fn from_raw(raw: D3D_ROOT_SIGNATURE_VERSION) -> Option<Self> {
        match raw {
            D3D_ROOT_SIGNATURE_VERSION_1_0 => Some(Self::V1_0),
            D3D_ROOT_SIGNATURE_VERSION_1_1 => Some(Self::V1_1),
            D3D_ROOT_SIGNATURE_VERSION_1_2 => Some(Self::V1_2),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(i32)]
pub enum ResourceDimension {
    Unknown = D3D12_RESOURCE_DIMENSION_UNKNOWN,
    Buffer = D3D12_RESOURCE_DIMENSION_BUFFER,
    Texture1D = D3D12_RESOURCE_DIMENSION_TEXTURE1D,
    Texture2D = D3D12_RESOURCE_DIMENSION_TEXTURE2D,
    Texture3D = D3D12_RESOURCE_DIMENSION_TEXTURE3D,
}

impl ResourceDimension {
    pub fn from_raw(raw: D3D12_RESOURCE_DIMENSION) -> Self {
        match raw {
            D3D12_RESOURCE_DIMENSION_BUFFER => Self::Buffer,
            D3D12_RESOURCE_DIMENSION_TEXTURE1D => Self::Texture1D,
            D3D12_RESOURCE_DIMENSION_TEXTURE2D => Self::Texture2D,
            D3D12_RESOURCE_DIMENSION_TEXTURE3D => Self::Texture3D,
            _ => Self::Unknown,
        }
    }
}

/// Which pipeline a command-list binding call targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BindPoint {
    Graphics,
    Compute,
}

bitflags! {
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct HeapFlags: i32 {
        const None = D3D12_HEAP_FLAG_NONE;
        const Shared = D3D12_HEAP_FLAG_SHARED;
        const DenyBuffers = D3D12_HEAP_FLAG_DENY_BUFFERS;
        const AllowDisplay = D3D12_HEAP_FLAG_ALLOW_DISPLAY;
        const SharedCrossAdapter = D3D12_HEAP_FLAG_SHARED_CROSS_ADAPTER;
        const DenyRtDsTextures = D3D12_HEAP_FLAG_DENY_RT_DS_TEXTURES;
        const DenyNonRtDsTextures = D3D12_HEAP_FLAG_DENY_NON_RT_DS_TEXTURES;
        const HardwareProtected = D3D12_HEAP_FLAG_HARDWARE_PROTECTED;
        const AllowWriteWatch = D3D12_HEAP_FLAG_ALLOW_WRITE_WATCH;
        const AllowShaderAtomics = D3D12_HEAP_FLAG_ALLOW_SHADER_ATOMICS;
        const CreateNotResident = D3D12_HEAP_FLAG_CREATE_NOT_RESIDENT;
        const CreateNotZeroed = D3D12_HEAP_FLAG_CREATE_NOT_ZEROED;
    }
}

impl Default for HeapFlags {
    fn default() -> Self {
        HeapFlags::None
    }
}

bitflags! {
    pub struct DescriptorHeapFlags: i32 {
        const None = D3D12_DESCRIPTOR_HEAP_FLAG_NONE;
        const ShaderVisible = D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE;
    }
}

bitflags! {
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct FenceFlags: i32 {
        const None = D3D12_FENCE_FLAG_NONE;
        const Shared = D3D12_FENCE_FLAG_SHARED;
        const SharedCrossAdapter = D3D12_FENCE_FLAG_SHARED_CROSS_ADAPTER;
        const NonMonitored = D3D12_FENCE_FLAG_NON_MONITORED;
    }
}
