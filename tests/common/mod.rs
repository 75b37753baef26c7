#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once};

use parking_lot::Mutex;

use gits_capture::driver::{
    DescriptorHeapObject, DeviceObject, DriverObject, FenceObject, HeapObject, NativeHandle,
    ResourceObject, WindowObject,
};
use gits_capture::{
    Bytes, CpuDescriptorHandle, DescriptorHeapDesc, DescriptorHeapFlags, DescriptorHeapType,
    DxError, DxResult, GpuDescriptorHandle, GpuVirtualAddress, HeapDesc, HeapFlags,
    HeapProperties, HeapType, ResourceDesc, ResourceDimension, E_FAIL,
};

static LOGGER: Once = Once::new();

pub fn init_logging() {
    LOGGER.call_once(|| {
        // Another test binary may have installed a logger already.
        let _ = simple_logger::init_with_level(log::Level::Warn);
    });
}

pub struct MockBuffer {
    pub handle: NativeHandle,
    pub address: u64,
    pub size: u64,
    pub heap_type: HeapType,
    memory: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(handle: usize, address: u64, size: u64) -> Arc<Self> {
        Self::with_heap_type(handle, address, size, HeapType::Default)
    }

    pub fn with_heap_type(handle: usize, address: u64, size: u64, heap_type: HeapType) -> Arc<Self> {
        Arc::new(Self {
            handle: NativeHandle(handle),
            address,
            size,
            heap_type,
            memory: Mutex::new(vec![0; size as usize]),
        })
    }

    /// The pointer `Map` hands out.
    pub fn mapped_pointer(&self) -> usize {
        self.memory.lock().as_mut_ptr() as usize
    }

    pub fn write(&self, offset: usize, bytes: &[u8]) {
        self.memory.lock()[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

impl DriverObject for MockBuffer {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }
}

impl ResourceObject for MockBuffer {
    fn get_desc(&self) -> ResourceDesc {
        ResourceDesc::default()
            .set_dimension(ResourceDimension::Buffer)
            .set_width(self.size)
    }

    fn get_gpu_virtual_address(&self) -> GpuVirtualAddress {
        GpuVirtualAddress(self.address)
    }

    fn get_heap_properties(&self) -> DxResult<(HeapProperties, HeapFlags)> {
        Ok((
            HeapProperties::default().set_type(self.heap_type),
            HeapFlags::Shared,
        ))
    }

    fn get_mapped_size(&self, _subresource: u32) -> u64 {
        self.size
    }
}

pub struct MockHeap {
    pub handle: NativeHandle,
    pub address: Option<u64>,
    pub size: u64,
    pub heap_type: HeapType,
}

impl MockHeap {
    pub fn new(handle: usize, address: u64, size: u64) -> Arc<Self> {
        Arc::new(Self {
            handle: NativeHandle(handle),
            address: Some(address),
            size,
            heap_type: HeapType::Default,
        })
    }
}

impl DriverObject for MockHeap {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }
}

impl HeapObject for MockHeap {
    fn get_desc(&self) -> HeapDesc {
        HeapDesc::default()
            .set_size_in_bytes(Bytes(self.size))
            .set_properties(HeapProperties::default().set_type(self.heap_type))
    }

    fn get_gpu_virtual_address(&self) -> Option<GpuVirtualAddress> {
        self.address.map(GpuVirtualAddress)
    }
}

pub struct MockDescriptorHeap {
    pub handle: NativeHandle,
    pub desc: DescriptorHeapDesc,
    pub cpu_start: usize,
    pub gpu_start: u64,
}

impl MockDescriptorHeap {
    pub fn new(
        handle: usize,
        heap_type: DescriptorHeapType,
        count: u32,
        cpu_start: usize,
        gpu_start: Option<u64>,
    ) -> Arc<Self> {
        let flags = if gpu_start.is_some() {
            DescriptorHeapFlags::ShaderVisible
        } else {
            DescriptorHeapFlags::None
        };
        Arc::new(Self {
            handle: NativeHandle(handle),
            desc: DescriptorHeapDesc::default()
                .set_type(heap_type)
                .set_num_descriptors(count)
                .set_flags(flags),
            cpu_start,
            gpu_start: gpu_start.unwrap_or(0),
        })
    }
}

impl DriverObject for MockDescriptorHeap {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }
}

impl DescriptorHeapObject for MockDescriptorHeap {
    fn get_desc(&self) -> DescriptorHeapDesc {
        self.desc
    }

    fn get_cpu_descriptor_handle_for_heap_start(&self) -> CpuDescriptorHandle {
        CpuDescriptorHandle::new(self.cpu_start)
    }

    fn get_gpu_descriptor_handle_for_heap_start(&self) -> GpuDescriptorHandle {
        GpuDescriptorHandle::new(self.gpu_start)
    }
}

pub struct MockDevice {
    pub handle: NativeHandle,
}

pub const VIEW_INCREMENT: u32 = 32;
pub const SAMPLER_INCREMENT: u32 = 16;
pub const RTV_DSV_INCREMENT: u32 = 8;

impl MockDevice {
    pub fn new(handle: usize) -> Arc<Self> {
        Arc::new(Self {
            handle: NativeHandle(handle),
        })
    }
}

impl DriverObject for MockDevice {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }
}

impl DeviceObject for MockDevice {
    fn get_descriptor_handle_increment_size(&self, heap_type: DescriptorHeapType) -> u32 {
        match heap_type {
            DescriptorHeapType::CBV_SRV_UAV => VIEW_INCREMENT,
            DescriptorHeapType::Sampler => SAMPLER_INCREMENT,
            DescriptorHeapType::RTV | DescriptorHeapType::DSV => RTV_DSV_INCREMENT,
        }
    }
}

pub struct MockFence {
    pub handle: NativeHandle,
    completed: AtomicU64,
}

impl MockFence {
    pub fn new(handle: usize, completed: u64) -> Arc<Self> {
        Arc::new(Self {
            handle: NativeHandle(handle),
            completed: AtomicU64::new(completed),
        })
    }

    pub fn complete(&self, value: u64) {
        self.completed.store(value, Ordering::SeqCst);
    }
}

impl DriverObject for MockFence {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }
}

impl FenceObject for MockFence {
    fn get_completed_value(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

pub struct MockWindow {
    pub handle: NativeHandle,
    /// `None` makes `GetClientRect` fail.
    pub client_size: Option<(u32, u32)>,
}

impl MockWindow {
    pub fn new(handle: usize, client_size: Option<(u32, u32)>) -> Arc<Self> {
        Arc::new(Self {
            handle: NativeHandle(handle),
            client_size,
        })
    }
}

impl DriverObject for MockWindow {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }
}

impl WindowObject for MockWindow {
    fn get_client_size(&self) -> DxResult<(u32, u32)> {
        self.client_size.ok_or_else(|| DxError::new("GetClientRect", E_FAIL))
    }
}

/// Builders for `DXBC` containers holding an `RTS0` root-signature chunk.
pub mod blob {
    pub enum Param {
        /// Descriptor table with one range per listed range type.
        Table(Vec<i32>),
        Constants,
        RootView(i32),
    }

    fn push(out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_le_bytes());
    }

    /// Version 1.1 root signature.
    pub fn rts0(params: &[Param]) -> Vec<u8> {
        let parameters_offset = 24usize;
        let mut payload_offset = parameters_offset + params.len() * 12;

        let mut out = Vec::new();
        let mut table = Vec::new();
        let mut payload = Vec::new();
        push(&mut out, gits_capture::D3D_ROOT_SIGNATURE_VERSION_1_1 as u32);
        push(&mut out, params.len() as u32);
        push(&mut out, parameters_offset as u32);
        push(&mut out, 0);
        push(&mut out, 0);
        push(&mut out, 0);

        for param in params {
            match param {
                Param::Table(ranges) => {
                    push(&mut table, 0);
                    push(&mut table, 0);
                    push(&mut table, payload_offset as u32);
                    let ranges_offset = payload_offset + 8;
                    push(&mut payload, ranges.len() as u32);
                    push(&mut payload, ranges_offset as u32);
                    for range_type in ranges {
                        push(&mut payload, *range_type as u32);
                        push(&mut payload, 1);
                        push(&mut payload, 0);
                        push(&mut payload, 0);
                        push(&mut payload, 0);
                        push(&mut payload, 0xffff_ffff);
                    }
                    payload_offset = ranges_offset + ranges.len() * 24;
                }
                Param::Constants => {
                    push(&mut table, 1);
                    push(&mut table, 0);
                    push(&mut table, payload_offset as u32);
                    push(&mut payload, 0);
                    push(&mut payload, 0);
                    push(&mut payload, 4);
                    payload_offset += 12;
                }
                Param::RootView(parameter_type) => {
                    push(&mut table, *parameter_type as u32);
                    push(&mut table, 0);
                    push(&mut table, payload_offset as u32);
                    push(&mut payload, 0);
                    push(&mut payload, 0);
                    push(&mut payload, 0);
                    payload_offset += 12;
                }
            }
        }

        out.extend(table);
        out.extend(payload);
        out
    }

    pub fn dxbc(rts0: Vec<u8>) -> Vec<u8> {
        let header_len = 32 + 4;
        let mut out = Vec::new();
        out.extend_from_slice(b"DXBC");
        out.extend_from_slice(&[0u8; 16]);
        push(&mut out, 1);
        push(&mut out, (header_len + 8 + rts0.len()) as u32);
        push(&mut out, 1);
        push(&mut out, header_len as u32);
        out.extend_from_slice(b"RTS0");
        push(&mut out, rts0.len() as u32);
        out.extend(rts0);
        out
    }
}
