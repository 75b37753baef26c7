//! Intercepted calls as data.
//!
//! Every hooked entry point is one [`Command`] variant. Arguments that name
//! driver objects, GPU addresses or descriptor handles are wrapped in cells
//! that also carry the key-based annotation the capture layer resolves, and
//! which recorders serialize instead of the raw value.

use std::fmt;
use std::sync::Arc;

use crate::descriptor_handle_service::{DescriptorHandleInfo, HandleKind};
use crate::driver::{
    DescriptorHeapObject, DeviceObject, DriverObject, FenceObject, HeapObject, NativeHandle,
    ResourceObject, SharedObject, WindowObject,
};
use crate::gpu_address_service::GpuAddressInfo;
use crate::key_registry::Key;
use crate::raw_bindings::d3d12::*;
use crate::utils::{Overridable, RestoreOverrides};
use crate::{
    BindPoint, Bytes, CpuDescriptorHandle, DescriptorHeapDesc, DescriptorHeapType, FenceFlags,
    GpuDescriptorHandle, GpuVirtualAddress, HeapFlags, HeapProperties, InterfaceId, Range,
    ResourceDesc, RootParameterType,
};

/// Anything in a command that names a driver object by native handle and
/// gets a key assigned for it.
pub trait KeyedArg {
    fn native_handle(&self) -> NativeHandle;
    fn key(&self) -> Key;
    fn set_key(&mut self, key: Key);
}

/// Whether an object argument exists before the call or is produced by it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgRole {
    Input,
    Output,
}

/// A driver object argument and its key.
pub struct ObjectArg<T: ?Sized> {
    pub handle: NativeHandle,
    pub object: Option<Arc<T>>,
    pub key: Key,
}

/// Object argument for interfaces the capture core never introspects.
pub type HandleArg = ObjectArg<dyn DriverObject>;

impl<T: ?Sized + DriverObject> ObjectArg<T> {
    pub fn new(object: Arc<T>) -> Self {
        Self {
            handle: object.native_handle(),
            object: Some(object),
            key: Key::NONE,
        }
    }

    /// Stores the object a creation call handed back.
    pub fn set_object(&mut self, object: Arc<T>) {
        self.handle = object.native_handle();
        self.object = Some(object);
    }
}

impl<T: ?Sized> ObjectArg<T> {
    pub fn from_handle(handle: NativeHandle) -> Self {
        Self {
            handle,
            object: None,
            key: Key::NONE,
        }
    }

    pub fn null() -> Self {
        Self::from_handle(NativeHandle(0))
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }
}

impl<T: ?Sized> Clone for ObjectArg<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            object: self.object.clone(),
            key: self.key,
        }
    }
}

impl<T: ?Sized> fmt::Debug for ObjectArg<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.key, self.handle.0)
    }
}

impl<T: ?Sized> KeyedArg for ObjectArg<T> {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }

    fn key(&self) -> Key {
        self.key
    }

    fn set_key(&mut self, key: Key) {
        self.key = key;
    }
}

/// Object returned by `OpenSharedHandle`, typed by the requested interface.
#[derive(Clone, Debug, Default)]
pub struct SharedObjectArg {
    pub object: Option<SharedObject>,
    pub key: Key,
}

impl KeyedArg for SharedObjectArg {
    fn native_handle(&self) -> NativeHandle {
        self.object
            .as_ref()
            .map(SharedObject::native_handle)
            .unwrap_or_default()
    }

    fn key(&self) -> Key {
        self.key
    }

    fn set_key(&mut self, key: Key) {
        self.key = key;
    }
}

/// A GPU virtual address and the resource it was resolved to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GpuAddressArg {
    pub address: GpuVirtualAddress,
    pub resource_key: Key,
    pub offset: u64,
}

impl GpuAddressArg {
    pub fn new(address: u64) -> Self {
        Self {
            address: GpuVirtualAddress(address),
            ..Self::default()
        }
    }

    pub fn set_resolved(&mut self, info: GpuAddressInfo) {
        self.resource_key = info.resource_key;
        self.offset = info.offset;
    }
}

/// Raw value of a CPU or GPU descriptor handle.
pub trait DescriptorHandleValue: Copy + fmt::Debug {
    const KIND: HandleKind;

    fn raw(&self) -> u64;
}

impl DescriptorHandleValue for CpuDescriptorHandle {
    const KIND: HandleKind = HandleKind::Cpu;

    fn raw(&self) -> u64 {
        self.ptr()
    }
}

impl DescriptorHandleValue for GpuDescriptorHandle {
    const KIND: HandleKind = HandleKind::Gpu;

    fn raw(&self) -> u64 {
        self.ptr()
    }
}

/// A descriptor handle and the `(descriptor heap, index)` it was resolved to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DescriptorHandleArg<H> {
    pub handle: H,
    pub heap_key: Key,
    pub index: u32,
}

impl<H: DescriptorHandleValue> DescriptorHandleArg<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            heap_key: Key::NONE,
            index: 0,
        }
    }

    pub fn set_resolved(&mut self, info: DescriptorHandleInfo) {
        self.heap_key = info.heap_key;
        self.index = info.index;
    }
}

pub type CpuHandleArg = DescriptorHandleArg<CpuDescriptorHandle>;
pub type GpuHandleArg = DescriptorHandleArg<GpuDescriptorHandle>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViewKind {
    RenderTarget,
    DepthStencil,
    ShaderResource,
    UnorderedAccess,
    SamplerFeedback,
}

impl ViewKind {
    /// Heap type of the CPU descriptor a view of this kind is written to.
    pub fn heap_type(self) -> DescriptorHeapType {
        match self {
            ViewKind::RenderTarget => DescriptorHeapType::RTV,
            ViewKind::DepthStencil => DescriptorHeapType::DSV,
            ViewKind::ShaderResource
            | ViewKind::UnorderedAccess
            | ViewKind::SamplerFeedback => DescriptorHeapType::CBV_SRV_UAV,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamOutputViewArg {
    pub buffer_location: GpuAddressArg,
    pub size_in_bytes: u64,
    pub buffer_filled_size_location: GpuAddressArg,
}

#[derive(Clone, Debug)]
pub enum Command {
    Release {
        object: HandleArg,
        /// Reference count left after the call.
        ref_count: u32,
    },

    CreateCommittedResource {
        interface_version: u8,
        device: HandleArg,
        heap_properties: Overridable<HeapProperties>,
        heap_flags: Overridable<HeapFlags>,
        desc: ResourceDesc,
        initial_state: D3D12_RESOURCE_STATES,
        has_clear_value: bool,
        resource: ObjectArg<dyn ResourceObject>,
    },
    CreatePlacedResource {
        interface_version: u8,
        device: HandleArg,
        heap: ObjectArg<dyn HeapObject>,
        heap_offset: u64,
        desc: ResourceDesc,
        initial_state: D3D12_RESOURCE_STATES,
        resource: ObjectArg<dyn ResourceObject>,
    },
    CreateReservedResource {
        interface_version: u8,
        device: HandleArg,
        desc: ResourceDesc,
        initial_state: D3D12_RESOURCE_STATES,
        resource: ObjectArg<dyn ResourceObject>,
    },
    CreateHeap {
        interface_version: u8,
        device: HandleArg,
        size: Bytes,
        alignment: Bytes,
        heap_properties: Overridable<HeapProperties>,
        heap_flags: Overridable<HeapFlags>,
        heap: ObjectArg<dyn HeapObject>,
    },
    OpenExistingHeapFromAddress {
        interface_version: u8,
        device: HandleArg,
        address: usize,
        heap: ObjectArg<dyn HeapObject>,
    },
    CreateDescriptorHeap {
        device: ObjectArg<dyn DeviceObject>,
        desc: DescriptorHeapDesc,
        heap: ObjectArg<dyn DescriptorHeapObject>,
    },
    CreateRootSignature {
        device: HandleArg,
        node_mask: u32,
        blob: Vec<u8>,
        root_signature: HandleArg,
    },
    CreateCommandList {
        interface_version: u8,
        device: HandleArg,
        command_list: HandleArg,
    },
    CreateFence {
        device: HandleArg,
        initial_value: u64,
        flags: FenceFlags,
        fence: ObjectArg<dyn FenceObject>,
    },
    OpenSharedHandle {
        device: HandleArg,
        shared_handle: NativeHandle,
        interface: InterfaceId,
        object: SharedObjectArg,
    },

    CreateView {
        kind: ViewKind,
        device: HandleArg,
        resource: HandleArg,
        counter_resource: HandleArg,
        /// Location of a raytracing acceleration structure SRV.
        acceleration_structure: Option<GpuAddressArg>,
        dest: CpuHandleArg,
    },
    CreateConstantBufferView {
        device: HandleArg,
        buffer_location: GpuAddressArg,
        size_in_bytes: u32,
        dest: CpuHandleArg,
    },
    CreateSampler {
        device: HandleArg,
        dest: CpuHandleArg,
    },
    CopyDescriptors {
        device: HandleArg,
        heap_type: DescriptorHeapType,
        dest_range_starts: Vec<CpuHandleArg>,
        dest_range_sizes: Vec<u32>,
        src_range_starts: Vec<CpuHandleArg>,
        src_range_sizes: Vec<u32>,
    },
    CopyDescriptorsSimple {
        device: HandleArg,
        heap_type: DescriptorHeapType,
        count: u32,
        dest: CpuHandleArg,
        src: CpuHandleArg,
    },

    CommandListReset {
        command_list: HandleArg,
        allocator: HandleArg,
    },
    SetRootSignature {
        command_list: HandleArg,
        bind_point: BindPoint,
        root_signature: HandleArg,
    },
    SetRootDescriptorTable {
        command_list: HandleArg,
        bind_point: BindPoint,
        root_parameter_index: u32,
        base_descriptor: GpuHandleArg,
    },
    SetRootBufferView {
        command_list: HandleArg,
        bind_point: BindPoint,
        view_type: RootParameterType,
        root_parameter_index: u32,
        buffer_location: GpuAddressArg,
    },
    OMSetRenderTargets {
        command_list: HandleArg,
        render_targets: Vec<CpuHandleArg>,
        single_handle_to_descriptor_range: bool,
        depth_stencil: Option<CpuHandleArg>,
    },
    ClearRenderTargetView {
        command_list: HandleArg,
        view: CpuHandleArg,
        color: [f32; 4],
    },
    ClearDepthStencilView {
        command_list: HandleArg,
        view: CpuHandleArg,
        depth: f32,
        stencil: u8,
    },
    ClearUnorderedAccessView {
        command_list: HandleArg,
        float: bool,
        view_gpu_handle_in_current_heap: GpuHandleArg,
        view_cpu_handle: CpuHandleArg,
        resource: HandleArg,
    },
    IASetIndexBuffer {
        command_list: HandleArg,
        buffer_location: GpuAddressArg,
        size_in_bytes: u32,
    },
    IASetVertexBuffers {
        command_list: HandleArg,
        start_slot: u32,
        views: Vec<GpuAddressArg>,
    },
    SOSetTargets {
        command_list: HandleArg,
        start_slot: u32,
        views: Vec<StreamOutputViewArg>,
    },
    WriteBufferImmediate {
        command_list: HandleArg,
        destinations: Vec<GpuAddressArg>,
        values: Vec<u32>,
    },
    BuildRaytracingAccelerationStructure {
        command_list: HandleArg,
        dest: GpuAddressArg,
        source: GpuAddressArg,
        scratch: GpuAddressArg,
        inputs: Vec<GpuAddressArg>,
        /// `DestBuffer` of each postbuild info description.
        postbuild_info: Vec<GpuAddressArg>,
    },
    CopyRaytracingAccelerationStructure {
        command_list: HandleArg,
        dest: GpuAddressArg,
        source: GpuAddressArg,
        mode: u32,
    },
    DispatchRays {
        command_list: HandleArg,
        ray_generation_shader_record: GpuAddressArg,
        miss_shader_table: GpuAddressArg,
        hit_group_table: GpuAddressArg,
        callable_shader_table: GpuAddressArg,
    },
    BeginRenderPass {
        command_list: HandleArg,
        render_targets: Vec<CpuHandleArg>,
        depth_stencil: Option<CpuHandleArg>,
    },

    Map {
        resource: ObjectArg<dyn ResourceObject>,
        subresource: u32,
        read_range: Option<Range>,
        /// Pointer the driver handed back, zero if the caller passed none.
        mapped_data: usize,
    },
    Unmap {
        resource: ObjectArg<dyn ResourceObject>,
        subresource: u32,
        written_range: Option<Range>,
    },

    ExecuteCommandLists {
        queue: HandleArg,
        command_lists: Vec<HandleArg>,
    },
    QueueSignal {
        queue: HandleArg,
        fence: ObjectArg<dyn FenceObject>,
        value: u64,
    },
    FenceSignal {
        fence: ObjectArg<dyn FenceObject>,
        value: u64,
    },
    GetCompletedValue {
        fence: ObjectArg<dyn FenceObject>,
        value: u64,
    },
    SetEventOnCompletion {
        fence: ObjectArg<dyn FenceObject>,
        value: u64,
        event: NativeHandle,
    },
    SetEventOnMultipleFenceCompletion {
        device: HandleArg,
        fences: Vec<ObjectArg<dyn FenceObject>>,
        values: Vec<u64>,
        flags: u32,
        event: NativeHandle,
    },

    /// `IDXGIFactory::CreateSwapChain` (`interface_version` 0) or
    /// `IDXGIFactory2::CreateSwapChainForHwnd` (2).
    CreateSwapChain {
        interface_version: u8,
        factory: HandleArg,
        /// Device or command queue the swapchain presents through.
        device: HandleArg,
        window: ObjectArg<dyn WindowObject>,
        /// Buffer size from the description; zero means the window size.
        width: u32,
        height: u32,
        buffer_count: u32,
        swap_chain: HandleArg,
    },
    SwapChainGetBuffer {
        swap_chain: HandleArg,
        buffer: u32,
        resource: ObjectArg<dyn ResourceObject>,
    },
    SwapChainResizeBuffers {
        swap_chain: HandleArg,
        buffer_count: u32,
        width: u32,
        height: u32,
    },
    Present {
        swap_chain: HandleArg,
        sync_interval: u32,
        flags: u32,
    },

    /// Window the replayer creates before the swapchain that presents to it.
    CreateWindowMeta {
        window: NativeHandle,
        width: u32,
        height: u32,
    },
    /// Contents of a heap opened from a host allocation.
    CreateHeapAllocationMeta {
        heap_key: Key,
        address: usize,
        data: Vec<u8>,
    },
    /// Bytes the CPU wrote into a mapped subresource.
    MappedDataMeta {
        resource_key: Key,
        subresource: u32,
        offset: u64,
        data: Vec<u8>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Release { .. } => "IUnknown::Release",
            Command::CreateCommittedResource { .. } => "ID3D12Device::CreateCommittedResource",
            Command::CreatePlacedResource { .. } => "ID3D12Device::CreatePlacedResource",
            Command::CreateReservedResource { .. } => "ID3D12Device::CreateReservedResource",
            Command::CreateHeap { .. } => "ID3D12Device::CreateHeap",
            Command::OpenExistingHeapFromAddress { .. } => {
                "ID3D12Device3::OpenExistingHeapFromAddress"
            }
            Command::CreateDescriptorHeap { .. } => "ID3D12Device::CreateDescriptorHeap",
            Command::CreateRootSignature { .. } => "ID3D12Device::CreateRootSignature",
            Command::CreateCommandList { .. } => "ID3D12Device::CreateCommandList",
            Command::CreateFence { .. } => "ID3D12Device::CreateFence",
            Command::OpenSharedHandle { .. } => "ID3D12Device::OpenSharedHandle",
            Command::CreateView { kind, .. } => match kind {
                ViewKind::RenderTarget => "ID3D12Device::CreateRenderTargetView",
                ViewKind::DepthStencil => "ID3D12Device::CreateDepthStencilView",
                ViewKind::ShaderResource => "ID3D12Device::CreateShaderResourceView",
                ViewKind::UnorderedAccess => "ID3D12Device::CreateUnorderedAccessView",
                ViewKind::SamplerFeedback => {
                    "ID3D12Device8::CreateSamplerFeedbackUnorderedAccessView"
                }
            },
            Command::CreateConstantBufferView { .. } => "ID3D12Device::CreateConstantBufferView",
            Command::CreateSampler { .. } => "ID3D12Device::CreateSampler",
            Command::CopyDescriptors { .. } => "ID3D12Device::CopyDescriptors",
            Command::CopyDescriptorsSimple { .. } => "ID3D12Device::CopyDescriptorsSimple",
            Command::CommandListReset { .. } => "ID3D12GraphicsCommandList::Reset",
            Command::SetRootSignature { bind_point, .. } => match bind_point {
                BindPoint::Graphics => "ID3D12GraphicsCommandList::SetGraphicsRootSignature",
                BindPoint::Compute => "ID3D12GraphicsCommandList::SetComputeRootSignature",
            },
            Command::SetRootDescriptorTable { bind_point, .. } => match bind_point {
                BindPoint::Graphics => {
                    "ID3D12GraphicsCommandList::SetGraphicsRootDescriptorTable"
                }
                BindPoint::Compute => "ID3D12GraphicsCommandList::SetComputeRootDescriptorTable",
            },
            Command::SetRootBufferView { .. } => "ID3D12GraphicsCommandList::SetRootBufferView",
            Command::OMSetRenderTargets { .. } => "ID3D12GraphicsCommandList::OMSetRenderTargets",
            Command::ClearRenderTargetView { .. } => {
                "ID3D12GraphicsCommandList::ClearRenderTargetView"
            }
            Command::ClearDepthStencilView { .. } => {
                "ID3D12GraphicsCommandList::ClearDepthStencilView"
            }
            Command::ClearUnorderedAccessView { float, .. } => {
                if *float {
                    "ID3D12GraphicsCommandList::ClearUnorderedAccessViewFloat"
                } else {
                    "ID3D12GraphicsCommandList::ClearUnorderedAccessViewUint"
                }
            }
            Command::IASetIndexBuffer { .. } => "ID3D12GraphicsCommandList::IASetIndexBuffer",
            Command::IASetVertexBuffers { .. } => "ID3D12GraphicsCommandList::IASetVertexBuffers",
            Command::SOSetTargets { .. } => "ID3D12GraphicsCommandList::SOSetTargets",
            Command::WriteBufferImmediate { .. } => {
                "ID3D12GraphicsCommandList2::WriteBufferImmediate"
            }
            Command::BuildRaytracingAccelerationStructure { .. } => {
                "ID3D12GraphicsCommandList4::BuildRaytracingAccelerationStructure"
            }
            Command::CopyRaytracingAccelerationStructure { .. } => {
                "ID3D12GraphicsCommandList4::CopyRaytracingAccelerationStructure"
            }
            Command::DispatchRays { .. } => "ID3D12GraphicsCommandList4::DispatchRays",
            Command::BeginRenderPass { .. } => "ID3D12GraphicsCommandList4::BeginRenderPass",
            Command::Map { .. } => "ID3D12Resource::Map",
            Command::Unmap { .. } => "ID3D12Resource::Unmap",
            Command::ExecuteCommandLists { .. } => "ID3D12CommandQueue::ExecuteCommandLists",
            Command::QueueSignal { .. } => "ID3D12CommandQueue::Signal",
            Command::FenceSignal { .. } => "ID3D12Fence::Signal",
            Command::GetCompletedValue { .. } => "ID3D12Fence::GetCompletedValue",
            Command::SetEventOnCompletion { .. } => "ID3D12Fence::SetEventOnCompletion",
            Command::SetEventOnMultipleFenceCompletion { .. } => {
                "ID3D12Device1::SetEventOnMultipleFenceCompletion"
            }
            Command::CreateSwapChain {
                interface_version: 0,
                ..
            } => "IDXGIFactory::CreateSwapChain",
            Command::CreateSwapChain { .. } => "IDXGIFactory2::CreateSwapChainForHwnd",
            Command::SwapChainGetBuffer { .. } => "IDXGISwapChain::GetBuffer",
            Command::SwapChainResizeBuffers { .. } => "IDXGISwapChain::ResizeBuffers",
            Command::Present { .. } => "IDXGISwapChain::Present",
            Command::CreateWindowMeta { .. } => "CreateWindowMetaCommand",
            Command::CreateHeapAllocationMeta { .. } => "CreateHeapAllocationMetaCommand",
            Command::MappedDataMeta { .. } => "MappedDataMetaCommand",
        }
    }

    /// Every object argument with its role, in declaration order.
    pub fn keyed_args(&mut self) -> Vec<(ArgRole, &mut dyn KeyedArg)> {
        use ArgRole::{Input, Output};

        let mut args: Vec<(ArgRole, &mut dyn KeyedArg)> = Vec::new();
        match self {
            Command::Release { object, .. } => args.push((Input, object)),
            Command::CreateCommittedResource {
                device, resource, ..
            }
            | Command::CreateReservedResource {
                device, resource, ..
            } => {
                args.push((Input, device));
                args.push((Output, resource));
            }
            Command::CreatePlacedResource {
                device,
                heap,
                resource,
                ..
            } => {
                args.push((Input, device));
                args.push((Input, heap));
                args.push((Output, resource));
            }
            Command::CreateHeap { device, heap, .. }
            | Command::OpenExistingHeapFromAddress { device, heap, .. } => {
                args.push((Input, device));
                args.push((Output, heap));
            }
            Command::CreateDescriptorHeap { device, heap, .. } => {
                args.push((Input, device));
                args.push((Output, heap));
            }
            Command::CreateRootSignature {
                device,
                root_signature,
                ..
            } => {
                args.push((Input, device));
                args.push((Output, root_signature));
            }
            Command::CreateCommandList {
                device,
                command_list,
                ..
            } => {
                args.push((Input, device));
                args.push((Output, command_list));
            }
            Command::CreateFence { device, fence, .. } => {
                args.push((Input, device));
                args.push((Output, fence));
            }
            Command::OpenSharedHandle { device, object, .. } => {
                args.push((Input, device));
                args.push((Output, object));
            }
            Command::CreateView {
                device,
                resource,
                counter_resource,
                ..
            } => {
                args.push((Input, device));
                args.push((Input, resource));
                args.push((Input, counter_resource));
            }
            Command::CreateConstantBufferView { device, .. }
            | Command::CreateSampler { device, .. }
            | Command::CopyDescriptors { device, .. }
            | Command::CopyDescriptorsSimple { device, .. } => args.push((Input, device)),
            Command::CommandListReset {
                command_list,
                allocator,
            } => {
                args.push((Input, command_list));
                args.push((Input, allocator));
            }
            Command::SetRootSignature {
                command_list,
                root_signature,
                ..
            } => {
                args.push((Input, command_list));
                args.push((Input, root_signature));
            }
            Command::ClearUnorderedAccessView {
                command_list,
                resource,
                ..
            } => {
                args.push((Input, command_list));
                args.push((Input, resource));
            }
            Command::SetRootDescriptorTable { command_list, .. }
            | Command::SetRootBufferView { command_list, .. }
            | Command::OMSetRenderTargets { command_list, .. }
            | Command::ClearRenderTargetView { command_list, .. }
            | Command::ClearDepthStencilView { command_list, .. }
            | Command::IASetIndexBuffer { command_list, .. }
            | Command::IASetVertexBuffers { command_list, .. }
            | Command::SOSetTargets { command_list, .. }
            | Command::WriteBufferImmediate { command_list, .. }
            | Command::BuildRaytracingAccelerationStructure { command_list, .. }
            | Command::CopyRaytracingAccelerationStructure { command_list, .. }
            | Command::DispatchRays { command_list, .. }
            | Command::BeginRenderPass { command_list, .. } => args.push((Input, command_list)),
            Command::Map { resource, .. } | Command::Unmap { resource, .. } => {
                args.push((Input, resource))
            }
            Command::ExecuteCommandLists {
                queue,
                command_lists,
            } => {
                args.push((Input, queue));
                for command_list in command_lists {
                    args.push((Input, command_list));
                }
            }
            Command::QueueSignal { queue, fence, .. } => {
                args.push((Input, queue));
                args.push((Input, fence));
            }
            Command::FenceSignal { fence, .. }
            | Command::GetCompletedValue { fence, .. }
            | Command::SetEventOnCompletion { fence, .. } => args.push((Input, fence)),
            Command::SetEventOnMultipleFenceCompletion { device, fences, .. } => {
                args.push((Input, device));
                for fence in fences {
                    args.push((Input, fence));
                }
            }
            Command::CreateSwapChain {
                factory,
                device,
                swap_chain,
                ..
            } => {
                args.push((Input, factory));
                args.push((Input, device));
                args.push((Output, swap_chain));
            }
            Command::SwapChainGetBuffer {
                swap_chain,
                resource,
                ..
            } => {
                args.push((Input, swap_chain));
                args.push((Output, resource));
            }
            Command::SwapChainResizeBuffers { swap_chain, .. }
            | Command::Present { swap_chain, .. } => args.push((Input, swap_chain)),
            Command::CreateWindowMeta { .. }
            | Command::CreateHeapAllocationMeta { .. }
            | Command::MappedDataMeta { .. } => {}
        }
        args
    }
}

impl RestoreOverrides for Command {
    fn restore_overrides(&mut self) {
        match self {
            Command::CreateCommittedResource {
                heap_properties,
                heap_flags,
                ..
            }
            | Command::CreateHeap {
                heap_properties,
                heap_flags,
                ..
            } => {
                heap_properties.restore();
                heap_flags.restore();
            }
            _ => {}
        }
    }
}

/// One intercepted call on its way through the layer pipeline.
#[derive(Clone, Debug)]
pub struct Call {
    /// Command key; orders the call in the trace.
    pub key: Key,
    pub result: HRESULT,
    /// Set by a layer to drop the call from the trace.
    pub skip: bool,
    /// Meta-commands to record ahead of this call, with their own keys.
    pub prelude: Vec<(Key, Command)>,
    pub command: Command,
}

impl Call {
    pub fn new(command: Command) -> Self {
        Self {
            key: Key::NONE,
            result: S_OK,
            skip: false,
            prelude: Vec::new(),
            command,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.result >= 0
    }
}

impl RestoreOverrides for Call {
    fn restore_overrides(&mut self) {
        self.command.restore_overrides();
    }
}
