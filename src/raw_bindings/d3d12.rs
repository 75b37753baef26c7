// Plain-data subset of d3d12.h that the capture core inspects.
// Layouts follow the C headers so these can be read straight out of
// intercepted call arguments.

pub type UINT = u32;
pub type UINT64 = u64;
pub type SIZE_T = usize;
pub type HRESULT = i32;

pub const S_OK: HRESULT = 0;
pub const E_FAIL: HRESULT = 0x80004005_u32 as i32;
pub const E_INVALIDARG: HRESULT = 0x80070057_u32 as i32;

pub type D3D12_GPU_VIRTUAL_ADDRESS = UINT64;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GUID {
    pub Data1: u32,
    pub Data2: u16,
    pub Data3: u16,
    pub Data4: [u8; 8],
}

pub type IID = GUID;

pub const IID_ID3D12Resource: IID = GUID {
    Data1: 0x696442be,
    Data2: 0xa72e,
    Data3: 0x4059,
    Data4: [0xbc, 0x79, 0x5b, 0x5c, 0x98, 0x04, 0x0f, 0xad],
};

pub const IID_ID3D12Resource1: IID = GUID {
    Data1: 0x9d5e227a,
    Data2: 0x4430,
    Data3: 0x4161,
    Data4: [0x88, 0xb3, 0x3e, 0xca, 0x6b, 0xb1, 0x6e, 0x19],
};

pub const IID_ID3D12Resource2: IID = GUID {
    Data1: 0xbe36ec3b,
    Data2: 0xea85,
    Data3: 0x4aeb,
    Data4: [0xa4, 0x5a, 0xe9, 0xd7, 0x64, 0x04, 0xa4, 0x95],
};

pub const IID_ID3D12Fence: IID = GUID {
    Data1: 0x0a753dcf,
    Data2: 0xc4d8,
    Data3: 0x4b91,
    Data4: [0xad, 0xf6, 0xbe, 0x5a, 0x60, 0xd9, 0x5a, 0x76],
};

pub const IID_ID3D12Fence1: IID = GUID {
    Data1: 0x433685fe,
    Data2: 0xe22b,
    Data3: 0x4ca0,
    Data4: [0xa8, 0xdb, 0xb5, 0xb4, 0xf4, 0xdd, 0x0e, 0x4a],
};

pub const IID_ID3D12Heap: IID = GUID {
    Data1: 0x6b3b2502,
    Data2: 0x6e51,
    Data3: 0x45b3,
    Data4: [0x90, 0xee, 0x98, 0x84, 0x26, 0x5e, 0x8d, 0xf3],
};

pub type D3D12_HEAP_TYPE = i32;
pub const D3D12_HEAP_TYPE_DEFAULT: D3D12_HEAP_TYPE = 1;
pub const D3D12_HEAP_TYPE_UPLOAD: D3D12_HEAP_TYPE = 2;
pub const D3D12_HEAP_TYPE_READBACK: D3D12_HEAP_TYPE = 3;
pub const D3D12_HEAP_TYPE_CUSTOM: D3D12_HEAP_TYPE = 4;
pub const D3D12_HEAP_TYPE_GPU_UPLOAD: D3D12_HEAP_TYPE = 5;

pub type D3D12_CPU_PAGE_PROPERTY = i32;
pub const D3D12_CPU_PAGE_PROPERTY_UNKNOWN: D3D12_CPU_PAGE_PROPERTY = 0;
pub const D3D12_CPU_PAGE_PROPERTY_NOT_AVAILABLE: D3D12_CPU_PAGE_PROPERTY = 1;
pub const D3D12_CPU_PAGE_PROPERTY_WRITE_COMBINE: D3D12_CPU_PAGE_PROPERTY = 2;
pub const D3D12_CPU_PAGE_PROPERTY_WRITE_BACK: D3D12_CPU_PAGE_PROPERTY = 3;

pub type D3D12_MEMORY_POOL = i32;
pub const D3D12_MEMORY_POOL_UNKNOWN: D3D12_MEMORY_POOL = 0;
pub const D3D12_MEMORY_POOL_L0: D3D12_MEMORY_POOL = 1;
pub const D3D12_MEMORY_POOL_L1: D3D12_MEMORY_POOL = 2;

pub type D3D12_HEAP_FLAGS = i32;
pub const D3D12_HEAP_FLAG_NONE: D3D12_HEAP_FLAGS = 0;
pub const D3D12_HEAP_FLAG_SHARED: D3D12_HEAP_FLAGS = 0x1;
pub const D3D12_HEAP_FLAG_DENY_BUFFERS: D3D12_HEAP_FLAGS = 0x4;
pub const D3D12_HEAP_FLAG_ALLOW_DISPLAY: D3D12_HEAP_FLAGS = 0x8;
pub const D3D12_HEAP_FLAG_SHARED_CROSS_ADAPTER: D3D12_HEAP_FLAGS = 0x20;
pub const D3D12_HEAP_FLAG_DENY_RT_DS_TEXTURES: D3D12_HEAP_FLAGS = 0x40;
pub const D3D12_HEAP_FLAG_DENY_NON_RT_DS_TEXTURES: D3D12_HEAP_FLAGS = 0x80;
pub const D3D12_HEAP_FLAG_HARDWARE_PROTECTED: D3D12_HEAP_FLAGS = 0x100;
pub const D3D12_HEAP_FLAG_ALLOW_WRITE_WATCH: D3D12_HEAP_FLAGS = 0x200;
pub const D3D12_HEAP_FLAG_ALLOW_SHADER_ATOMICS: D3D12_HEAP_FLAGS = 0x400;
pub const D3D12_HEAP_FLAG_CREATE_NOT_RESIDENT: D3D12_HEAP_FLAGS = 0x800;
pub const D3D12_HEAP_FLAG_CREATE_NOT_ZEROED: D3D12_HEAP_FLAGS = 0x1000;

pub type D3D12_DESCRIPTOR_HEAP_TYPE = i32;
pub const D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV: D3D12_DESCRIPTOR_HEAP_TYPE = 0;
pub const D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER: D3D12_DESCRIPTOR_HEAP_TYPE = 1;
pub const D3D12_DESCRIPTOR_HEAP_TYPE_RTV: D3D12_DESCRIPTOR_HEAP_TYPE = 2;
pub const D3D12_DESCRIPTOR_HEAP_TYPE_DSV: D3D12_DESCRIPTOR_HEAP_TYPE = 3;
pub const D3D12_DESCRIPTOR_HEAP_TYPE_NUM_TYPES: D3D12_DESCRIPTOR_HEAP_TYPE = 4;

pub type D3D12_DESCRIPTOR_HEAP_FLAGS = i32;
pub const D3D12_DESCRIPTOR_HEAP_FLAG_NONE: D3D12_DESCRIPTOR_HEAP_FLAGS = 0;
pub const D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE: D3D12_DESCRIPTOR_HEAP_FLAGS = 0x1;

pub type D3D12_DESCRIPTOR_RANGE_TYPE = i32;
pub const D3D12_DESCRIPTOR_RANGE_TYPE_SRV: D3D12_DESCRIPTOR_RANGE_TYPE = 0;
pub const D3D12_DESCRIPTOR_RANGE_TYPE_UAV: D3D12_DESCRIPTOR_RANGE_TYPE = 1;
pub const D3D12_DESCRIPTOR_RANGE_TYPE_CBV: D3D12_DESCRIPTOR_RANGE_TYPE = 2;
pub const D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER: D3D12_DESCRIPTOR_RANGE_TYPE = 3;

pub type D3D12_ROOT_PARAMETER_TYPE = i32;
pub const D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE: D3D12_ROOT_PARAMETER_TYPE = 0;
pub const D3D12_ROOT_PARAMETER_TYPE_32BIT_CONSTANTS: D3D12_ROOT_PARAMETER_TYPE = 1;
pub const D3D12_ROOT_PARAMETER_TYPE_CBV: D3D12_ROOT_PARAMETER_TYPE = 2;
pub const D3D12_ROOT_PARAMETER_TYPE_SRV: D3D12_ROOT_PARAMETER_TYPE = 3;
pub const D3D12_ROOT_PARAMETER_TYPE_UAV: D3D12_ROOT_PARAMETER_TYPE = 4;

pub type D3D_ROOT_SIGNATURE_VERSION = i32;
pub const D3D_ROOT_SIGNATURE_VERSION_1: D3D_ROOT_SIGNATURE_VERSION = 0x1;
pub const D3D_ROOT_SIGNATURE_VERSION_1_0: D3D_ROOT_SIGNATURE_VERSION = 0x1;
pub const D3D_ROOT_SIGNATURE_VERSION_1_1: D3D_ROOT_SIGNATURE_VERSION = 0x2;
pub const D3D_ROOT_SIGNATURE_VERSION_1_2: D3D_ROOT_SIGNATURE_VERSION = 0x3;

pub type D3D12_RESOURCE_DIMENSION = i32;
pub const D3D12_RESOURCE_DIMENSION_UNKNOWN: D3D12_RESOURCE_DIMENSION = 0;
pub const D3D12_RESOURCE_DIMENSION_BUFFER: D3D12_RESOURCE_DIMENSION = 1;
pub const D3D12_RESOURCE_DIMENSION_TEXTURE1D: D3D12_RESOURCE_DIMENSION = 2;
pub const D3D12_RESOURCE_DIMENSION_TEXTURE2D: D3D12_RESOURCE_DIMENSION = 3;
pub const D3D12_RESOURCE_DIMENSION_TEXTURE3D: D3D12_RESOURCE_DIMENSION = 4;

pub type D3D12_RESOURCE_STATES = i32;
pub const D3D12_RESOURCE_STATE_COMMON: D3D12_RESOURCE_STATES = 0;

pub type D3D12_FENCE_FLAGS = i32;
pub const D3D12_FENCE_FLAG_NONE: D3D12_FENCE_FLAGS = 0;
pub const D3D12_FENCE_FLAG_SHARED: D3D12_FENCE_FLAGS = 0x1;
pub const D3D12_FENCE_FLAG_SHARED_CROSS_ADAPTER: D3D12_FENCE_FLAGS = 0x2;
pub const D3D12_FENCE_FLAG_NON_MONITORED: D3D12_FENCE_FLAGS = 0x4;

pub const D3D12_DEFAULT_RESOURCE_PLACEMENT_ALIGNMENT: UINT = 65536;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct D3D12_CPU_DESCRIPTOR_HANDLE {
    pub ptr: SIZE_T,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct D3D12_GPU_DESCRIPTOR_HANDLE {
    pub ptr: UINT64,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct D3D12_HEAP_PROPERTIES {
    pub Type: D3D12_HEAP_TYPE,
    pub CPUPageProperty: D3D12_CPU_PAGE_PROPERTY,
    pub MemoryPoolPreference: D3D12_MEMORY_POOL,
    pub CreationNodeMask: UINT,
    pub VisibleNodeMask: UINT,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct D3D12_HEAP_DESC {
    pub SizeInBytes: UINT64,
    pub Properties: D3D12_HEAP_PROPERTIES,
    pub Alignment: UINT64,
    pub Flags: D3D12_HEAP_FLAGS,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DXGI_SAMPLE_DESC {
    pub Count: UINT,
    pub Quality: UINT,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct D3D12_RESOURCE_DESC {
    pub Dimension: D3D12_RESOURCE_DIMENSION,
    pub Alignment: UINT64,
    pub Width: UINT64,
    pub Height: UINT,
    pub DepthOrArraySize: u16,
    pub MipLevels: u16,
    pub Format: i32,
    pub SampleDesc: DXGI_SAMPLE_DESC,
    pub Layout: i32,
    pub Flags: i32,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct D3D12_DESCRIPTOR_HEAP_DESC {
    pub Type: D3D12_DESCRIPTOR_HEAP_TYPE,
    pub NumDescriptors: UINT,
    pub Flags: D3D12_DESCRIPTOR_HEAP_FLAGS,
    pub NodeMask: UINT,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct D3D12_RANGE {
    pub Begin: SIZE_T,
    pub End: SIZE_T,
}

assert_eq_size!(D3D12_HEAP_PROPERTIES, [u32; 5]);
assert_eq_size!(D3D12_CPU_DESCRIPTOR_HANDLE, usize);
assert_eq_size!(D3D12_GPU_DESCRIPTOR_HANDLE, u64);
