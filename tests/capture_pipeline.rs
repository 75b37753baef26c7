mod common;

use std::sync::Arc;

use gits_capture::capture_manager::TrackingServices;
use gits_capture::command::{
    Call, Command, CpuHandleArg, GpuAddressArg, GpuHandleArg, HandleArg, ObjectArg,
    SharedObjectArg, ViewKind,
};
use gits_capture::driver::{
    DeviceObject, FenceObject, HeapObject, NativeHandle, ResourceObject, SharedObject,
    WindowObject,
};
use gits_capture::map_tracking_service::MapTrackingService;
use gits_capture::write_watch::ShadowCopyTracker;
use gits_capture::*;

use common::blob::{self, Param};
use common::*;

struct Session {
    manager: CaptureManager,
    trace: Arc<TraceRecorder>,
    device: Arc<MockDevice>,
}

impl Session {
    fn new() -> Self {
        Self::with_config(CaptureConfig::default().set_use_write_watch(false))
    }

    fn with_config(config: CaptureConfig) -> Self {
        init_logging();
        let trace = Arc::new(TraceRecorder::new());
        Self {
            manager: CaptureManager::new(config, trace.clone()),
            trace,
            device: MockDevice::new(0xd000),
        }
    }

    /// Session whose heaps get armed for write watching on every platform.
    fn with_write_watch() -> Self {
        init_logging();
        let trace = Arc::new(TraceRecorder::new());
        let services = TrackingServices::with_map_tracking(MapTrackingService::with_tracker(
            true,
            Box::new(ShadowCopyTracker::default()),
        ));
        Self {
            manager: CaptureManager::with_services(
                CaptureConfig::default(),
                services,
                trace.clone(),
            ),
            trace,
            device: MockDevice::new(0xd000),
        }
    }

    fn device_arg(&self) -> HandleArg {
        HandleArg::from_handle(self.device.handle)
    }

    fn key_of(&self, handle: NativeHandle) -> Key {
        self.manager
            .registry()
            .lookup(handle)
            .unwrap_or_else(|| panic!("{:?} has no key", handle))
    }

    fn run(&self, command: Command) -> Call {
        let mut call = Call::new(command);
        self.manager.intercept(&mut call, |_| {});
        call
    }

    fn create_committed(&self, buffer: &Arc<MockBuffer>) -> Call {
        let mut call = Call::new(Command::CreateCommittedResource {
            interface_version: 0,
            device: self.device_arg(),
            heap_properties: Overridable::new(HeapProperties::default().set_type(buffer.heap_type)),
            heap_flags: Overridable::new(HeapFlags::None),
            desc: buffer.get_desc(),
            initial_state: D3D12_RESOURCE_STATE_COMMON,
            has_clear_value: false,
            resource: ObjectArg::null(),
        });
        let created = buffer.clone();
        self.manager.intercept(&mut call, move |call| {
            if let Command::CreateCommittedResource { resource, .. } = &mut call.command {
                resource.set_object(created);
            }
        });
        call
    }

    fn create_heap(&self, heap: &Arc<MockHeap>) {
        let mut call = Call::new(Command::CreateHeap {
            interface_version: 0,
            device: self.device_arg(),
            size: Bytes(heap.size),
            alignment: Bytes(0),
            heap_properties: Overridable::new(HeapProperties::default().set_type(heap.heap_type)),
            heap_flags: Overridable::new(HeapFlags::None),
            heap: ObjectArg::null(),
        });
        let created = heap.clone();
        self.manager.intercept(&mut call, move |call| {
            if let Command::CreateHeap { heap, .. } = &mut call.command {
                heap.set_object(created);
            }
        });
    }

    fn create_placed(&self, heap: &Arc<MockHeap>, offset: u64, buffer: &Arc<MockBuffer>) {
        let mut call = Call::new(Command::CreatePlacedResource {
            interface_version: 0,
            device: self.device_arg(),
            heap: ObjectArg::<dyn HeapObject>::new(heap.clone()),
            heap_offset: offset,
            desc: buffer.get_desc(),
            initial_state: D3D12_RESOURCE_STATE_COMMON,
            resource: ObjectArg::null(),
        });
        let created = buffer.clone();
        self.manager.intercept(&mut call, move |call| {
            if let Command::CreatePlacedResource { resource, .. } = &mut call.command {
                resource.set_object(created);
            }
        });
    }

    fn create_descriptor_heap(&self, heap: &Arc<MockDescriptorHeap>) {
        let mut call = Call::new(Command::CreateDescriptorHeap {
            device: ObjectArg::<dyn DeviceObject>::new(self.device.clone()),
            desc: heap.desc,
            heap: ObjectArg::null(),
        });
        let created = heap.clone();
        self.manager.intercept(&mut call, move |call| {
            if let Command::CreateDescriptorHeap { heap, .. } = &mut call.command {
                heap.set_object(created);
            }
        });
    }

    fn create_fence(&self, fence: &Arc<MockFence>) {
        let mut call = Call::new(Command::CreateFence {
            device: self.device_arg(),
            initial_value: fence.get_completed_value(),
            flags: FenceFlags::None,
            fence: ObjectArg::null(),
        });
        let created = fence.clone();
        self.manager.intercept(&mut call, move |call| {
            if let Command::CreateFence { fence, .. } = &mut call.command {
                fence.set_object(created);
            }
        });
    }

    fn create_object(&self, command: Command, handle: NativeHandle) {
        let mut call = Call::new(command);
        self.manager.intercept(&mut call, |call| match &mut call.command {
            Command::CreateRootSignature { root_signature, .. } => {
                root_signature.handle = handle
            }
            Command::CreateCommandList { command_list, .. } => command_list.handle = handle,
            _ => unreachable!(),
        });
    }

    fn release(&self, handle: NativeHandle) {
        self.run(Command::Release {
            object: HandleArg::from_handle(handle),
            ref_count: 0,
        });
    }

    fn index_buffer_at(&self, address: u64) -> GpuAddressArg {
        let call = self.run(Command::IASetIndexBuffer {
            command_list: HandleArg::from_handle(NativeHandle(0xc100)),
            buffer_location: GpuAddressArg::new(address),
            size_in_bytes: 4,
        });
        match call.command {
            Command::IASetIndexBuffer {
                buffer_location, ..
            } => buffer_location,
            other => panic!("unexpected {:?}", other),
        }
    }

    fn poll(&self, fence: &Arc<MockFence>) -> Call {
        let mut call = Call::new(Command::GetCompletedValue {
            fence: ObjectArg::<dyn FenceObject>::new(fence.clone()),
            value: 0,
        });
        let completed = fence.get_completed_value();
        self.manager.intercept(&mut call, move |call| {
            if let Command::GetCompletedValue { value, .. } = &mut call.command {
                *value = completed;
            }
        });
        call
    }
}

#[test]
fn keys_are_stable_until_retired() {
    let session = Session::new();
    let buffer = MockBuffer::new(0x1000, 0x10_0000, 0x100);

    session.create_committed(&buffer);
    let first = session.key_of(buffer.handle);
    session.run(Command::Unmap {
        resource: ObjectArg::<dyn ResourceObject>::new(buffer.clone()),
        subresource: 0,
        written_range: None,
    });
    assert_eq!(session.key_of(buffer.handle), first);

    session.release(buffer.handle);
    assert_eq!(session.manager.registry().lookup(buffer.handle), None);

    // The driver hands the same pointer out again.
    session.create_committed(&buffer);
    let second = session.key_of(buffer.handle);
    assert_ne!(first, second);
    assert!(second > first);
}

#[test]
fn committed_buffer_range_is_end_exclusive() {
    let session = Session::new();
    let buffer = MockBuffer::new(0x1000, 0x10_0000, 0x1000);
    session.create_committed(&buffer);
    let key = session.key_of(buffer.handle);

    let start = session.index_buffer_at(0x10_0000);
    assert_eq!((start.resource_key, start.offset), (key, 0));

    let last = session.index_buffer_at(0x10_0fff);
    assert_eq!((last.resource_key, last.offset), (key, 0xfff));

    let past = session.index_buffer_at(0x10_1000);
    assert_eq!(past.resource_key, Key::NONE);
    assert_eq!(past.offset, 0);
}

#[test]
fn placed_resources_resolve_relative_to_their_heap_offset() {
    let session = Session::new();
    let heap = MockHeap::new(0x2000, 0x40_0000, 0x1_0000);
    let buffer = MockBuffer::new(0x2100, 0, 0x1000);
    session.create_heap(&heap);
    session.create_placed(&heap, 0x2000, &buffer);
    let key = session.key_of(buffer.handle);

    let call = session.run(Command::IASetVertexBuffers {
        command_list: HandleArg::from_handle(NativeHandle(0xc100)),
        start_slot: 0,
        views: vec![GpuAddressArg::new(0x40_2005), GpuAddressArg::new(0)],
    });
    match call.command {
        Command::IASetVertexBuffers { views, .. } => {
            assert_eq!((views[0].resource_key, views[0].offset), (key, 5));
            assert_eq!(views[1], GpuAddressArg::default());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn descriptor_handles_resolve_to_heap_indices() {
    let session = Session::new();
    let heap = MockDescriptorHeap::new(0x3000, DescriptorHeapType::CBV_SRV_UAV, 8, 0x5_0000, None);
    session.create_descriptor_heap(&heap);
    let heap_key = session.key_of(heap.handle);

    let view_at = |index: usize| {
        let call = session.run(Command::CreateView {
            kind: ViewKind::ShaderResource,
            device: session.device_arg(),
            resource: HandleArg::null(),
            counter_resource: HandleArg::null(),
            acceleration_structure: None,
            dest: CpuHandleArg::new(CpuDescriptorHandle::new(
                0x5_0000 + index * VIEW_INCREMENT as usize,
            )),
        });
        match call.command {
            Command::CreateView { dest, .. } => dest,
            other => panic!("unexpected {:?}", other),
        }
    };

    for index in 0..8 {
        let dest = view_at(index);
        assert_eq!((dest.heap_key, dest.index), (heap_key, index as u32));
    }
    assert_eq!(view_at(8).heap_key, Key::NONE);
}

#[test]
fn repeated_fence_polls_are_skipped() {
    let session = Session::new();
    let fence = MockFence::new(0x4000, 5);
    session.create_fence(&fence);

    assert!(!session.poll(&fence).skip);
    assert!(session.poll(&fence).skip);

    fence.complete(6);
    assert!(!session.poll(&fence).skip);

    let polls = session
        .trace
        .names()
        .into_iter()
        .filter(|name| *name == "ID3D12Fence::GetCompletedValue")
        .count();
    assert_eq!(polls, 2);
    assert_eq!(session.trace.skipped_count(), 1);
}

#[test]
fn descriptor_tables_follow_the_bound_root_signature() {
    let session = Session::new();
    let root_signature = NativeHandle(0x6000);
    let command_list = NativeHandle(0x6100);
    let heap = MockDescriptorHeap::new(
        0x6200,
        DescriptorHeapType::CBV_SRV_UAV,
        16,
        0x7_0000,
        Some(0x8_0000),
    );
    session.create_descriptor_heap(&heap);

    session.create_object(
        Command::CreateRootSignature {
            device: session.device_arg(),
            node_mask: 0,
            blob: blob::dxbc(blob::rts0(&[
                Param::Constants,
                Param::RootView(D3D12_ROOT_PARAMETER_TYPE_CBV),
                Param::Table(vec![D3D12_DESCRIPTOR_RANGE_TYPE_SRV]),
            ])),
            root_signature: HandleArg::null(),
        },
        root_signature,
    );
    session.create_object(
        Command::CreateCommandList {
            interface_version: 0,
            device: session.device_arg(),
            command_list: HandleArg::null(),
        },
        command_list,
    );
    let list_key = session.key_of(command_list);

    session.run(Command::SetRootSignature {
        command_list: HandleArg::from_handle(command_list),
        bind_point: BindPoint::Graphics,
        root_signature: HandleArg::from_handle(root_signature),
    });
    let command_lists = &session.manager.services().command_lists;
    assert_eq!(
        command_lists.get_descriptor_table_heap_type(list_key, BindPoint::Graphics, 2),
        Some(DescriptorHeapType::CBV_SRV_UAV)
    );

    let call = session.run(Command::SetRootDescriptorTable {
        command_list: HandleArg::from_handle(command_list),
        bind_point: BindPoint::Graphics,
        root_parameter_index: 2,
        base_descriptor: GpuHandleArg::new(GpuDescriptorHandle::new(
            0x8_0000 + 3 * VIEW_INCREMENT as u64,
        )),
    });
    match call.command {
        Command::SetRootDescriptorTable {
            base_descriptor, ..
        } => {
            assert_eq!(base_descriptor.heap_key, session.key_of(heap.handle));
            assert_eq!(base_descriptor.index, 3);
        }
        other => panic!("unexpected {:?}", other),
    }

    session.run(Command::CommandListReset {
        command_list: HandleArg::from_handle(command_list),
        allocator: HandleArg::from_handle(NativeHandle(0x6300)),
    });
    assert_eq!(
        command_lists.get_descriptor_table_heap_type(list_key, BindPoint::Graphics, 2),
        None
    );
}

#[test]
fn releasing_a_heap_drops_its_placed_resources() {
    let session = Session::new();
    let heap = MockHeap::new(0x2000, 0x40_0000, 0x1_0000);
    let first = MockBuffer::new(0x2100, 0, 0x1000);
    let second = MockBuffer::new(0x2200, 0, 0x1000);
    session.create_heap(&heap);
    session.create_placed(&heap, 0, &first);
    session.create_placed(&heap, 0x4000, &second);

    let addresses = &session.manager.services().gpu_addresses;
    assert!(addresses.resolve(GpuVirtualAddress(0x40_0010)).is_some());
    assert!(addresses.resolve(GpuVirtualAddress(0x40_4010)).is_some());

    session.release(heap.handle);
    assert_eq!(addresses.resolve(GpuVirtualAddress(0x40_0010)), None);
    assert_eq!(addresses.resolve(GpuVirtualAddress(0x40_4010)), None);
    assert_eq!(session.index_buffer_at(0x40_4010).resource_key, Key::NONE);
}

#[test]
fn write_watch_override_is_invisible_in_the_trace() {
    let session = Session::with_write_watch();
    let buffer = MockBuffer::with_heap_type(0x1000, 0x10_0000, 0x100, HeapType::Upload);

    let mut call = Call::new(Command::CreateCommittedResource {
        interface_version: 0,
        device: session.device_arg(),
        heap_properties: Overridable::new(HeapProperties::default().set_type(HeapType::Upload)),
        heap_flags: Overridable::new(HeapFlags::None),
        desc: buffer.get_desc(),
        initial_state: D3D12_RESOURCE_STATE_COMMON,
        has_clear_value: false,
        resource: ObjectArg::null(),
    });
    let mut driver_saw = None;
    session.manager.intercept(&mut call, |call| {
        if let Command::CreateCommittedResource {
            heap_properties,
            heap_flags,
            ..
        } = &call.command
        {
            driver_saw = Some((heap_properties.value, heap_flags.value));
        }
        call.result = E_FAIL;
    });

    let (properties, flags) = driver_saw.expect("call was not forwarded");
    assert_eq!(properties.get_type(), Some(HeapType::Custom));
    assert_eq!(
        properties.get_cpu_page_property(),
        Some(CpuPageProperty::WriteCombine)
    );
    assert!(flags.contains(HeapFlags::AllowWriteWatch));

    // Restored even though the creation failed.
    match &call.command {
        Command::CreateCommittedResource {
            heap_properties,
            heap_flags,
            ..
        } => {
            assert_eq!(heap_properties.value.get_type(), Some(HeapType::Upload));
            assert_eq!(heap_flags.value, HeapFlags::None);
        }
        other => panic!("unexpected {:?}", other),
    }
    match &session.trace.entries()[0].command {
        Command::CreateCommittedResource { heap_flags, .. } => {
            assert_eq!(heap_flags.value, HeapFlags::None)
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn mapped_writes_are_recorded_before_submission() {
    let session = Session::new();
    let buffer = MockBuffer::with_heap_type(0x1000, 0x10_0000, 0x2000, HeapType::Upload);
    session.create_committed(&buffer);
    let key = session.key_of(buffer.handle);

    let pointer = buffer.mapped_pointer();
    let mut map = Call::new(Command::Map {
        resource: ObjectArg::<dyn ResourceObject>::new(buffer.clone()),
        subresource: 0,
        read_range: None,
        mapped_data: 0,
    });
    session.manager.intercept(&mut map, move |call| {
        if let Command::Map { mapped_data, .. } = &mut call.command {
            *mapped_data = pointer;
        }
    });
    buffer.write(0x10, &[1, 2, 3, 4]);

    let submit = session.run(Command::ExecuteCommandLists {
        queue: HandleArg::from_handle(NativeHandle(0xe000)),
        command_lists: vec![HandleArg::from_handle(NativeHandle(0xc100))],
    });
    assert_eq!(submit.prelude.len(), 1);

    let entries = session.trace.entries();
    let names: Vec<_> = entries.iter().map(|entry| entry.name).collect();
    assert_eq!(
        names,
        vec![
            "ID3D12Device::CreateCommittedResource",
            "ID3D12Resource::Map",
            "MappedDataMetaCommand",
            "ID3D12CommandQueue::ExecuteCommandLists",
        ]
    );
    match &entries[2].command {
        Command::MappedDataMeta {
            resource_key,
            offset,
            data,
            ..
        } => {
            assert_eq!(*resource_key, key);
            assert_eq!(*offset, 0);
            assert_eq!(&data[0x10..0x14], &[1, 2, 3, 4]);
        }
        other => panic!("unexpected {:?}", other),
    }

    // Nothing changed since the last harvest.
    session.run(Command::Unmap {
        resource: ObjectArg::<dyn ResourceObject>::new(buffer.clone()),
        subresource: 0,
        written_range: None,
    });
    assert!(!session.manager.services().map_tracking.is_mapped(key, 0));
    assert_eq!(session.trace.entries().len(), 5);
}

#[test]
fn shared_resources_are_recorded_as_committed() {
    let session = Session::new();
    let buffer = MockBuffer::new(0x1000, 0x10_0000, 0x100);

    let mut call = Call::new(Command::OpenSharedHandle {
        device: session.device_arg(),
        shared_handle: NativeHandle(0x99),
        interface: InterfaceId(IID_ID3D12Resource),
        object: SharedObjectArg::default(),
    });
    let opened = buffer.clone();
    session.manager.intercept(&mut call, move |call| {
        if let Command::OpenSharedHandle { object, .. } = &mut call.command {
            object.object = Some(SharedObject::Resource(opened));
        }
    });
    let key = session.key_of(buffer.handle);

    let entries = session.trace.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].key < entries[1].key);
    match &entries[0].command {
        Command::CreateCommittedResource {
            resource,
            initial_state,
            has_clear_value,
            heap_flags,
            ..
        } => {
            assert_eq!(resource.key, key);
            assert_eq!(*initial_state, D3D12_RESOURCE_STATE_COMMON);
            assert!(!has_clear_value);
            assert_eq!(heap_flags.value, HeapFlags::Shared);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(entries[1].name, "ID3D12Device::OpenSharedHandle");
    assert_eq!(session.index_buffer_at(0x10_0010).resource_key, key);
}

#[test]
fn heaps_opened_from_host_memory_record_their_contents() {
    let session = Session::new();
    let memory = vec![7u8; 0x1000];
    let heap = Arc::new(MockHeap {
        handle: NativeHandle(0x2000),
        address: Some(memory.as_ptr() as u64),
        size: 0x1000,
        heap_type: HeapType::Custom,
    });

    let mut call = Call::new(Command::OpenExistingHeapFromAddress {
        interface_version: 0,
        device: session.device_arg(),
        address: memory.as_ptr() as usize,
        heap: ObjectArg::null(),
    });
    let created = heap.clone();
    session.manager.intercept(&mut call, move |call| {
        if let Command::OpenExistingHeapFromAddress { heap, .. } = &mut call.command {
            heap.set_object(created);
        }
    });

    assert_eq!(
        session.trace.names(),
        vec![
            "CreateHeapAllocationMetaCommand",
            "ID3D12Device3::OpenExistingHeapFromAddress",
        ]
    );
    match &session.trace.entries()[0].command {
        Command::CreateHeapAllocationMeta { heap_key, data, .. } => {
            assert_eq!(*heap_key, session.key_of(heap.handle));
            assert_eq!(data, &memory);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn unsupported_shared_interfaces_are_recorded_as_opened() {
    let session = Session::new();
    for handle in [0x7000usize, 0x7100] {
        let mut call = Call::new(Command::OpenSharedHandle {
            device: session.device_arg(),
            shared_handle: NativeHandle(0x99),
            interface: InterfaceId(IID_ID3D12Heap),
            object: SharedObjectArg::default(),
        });
        session.manager.intercept(&mut call, move |call| {
            if let Command::OpenSharedHandle { object, .. } = &mut call.command {
                object.object = Some(SharedObject::Other(NativeHandle(handle)));
            }
        });
    }

    let entries = session.trace.entries();
    assert_eq!(
        session.trace.names(),
        vec!["ID3D12Device::OpenSharedHandle"; 2]
    );
    for (entry, handle) in entries.iter().zip([0x7000usize, 0x7100]) {
        match &entry.command {
            Command::OpenSharedHandle { object, .. } => {
                assert_eq!(object.key, session.key_of(NativeHandle(handle)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn acceleration_structure_builds_resolve_postbuild_destinations() {
    let session = Session::new();
    let storage = MockBuffer::new(0x1000, 0x10_0000, 0x1000);
    let postbuild = MockBuffer::new(0x1100, 0x20_0000, 0x100);
    session.create_committed(&storage);
    session.create_committed(&postbuild);

    let call = session.run(Command::BuildRaytracingAccelerationStructure {
        command_list: HandleArg::from_handle(NativeHandle(0xc100)),
        dest: GpuAddressArg::new(0x10_0000),
        source: GpuAddressArg::default(),
        scratch: GpuAddressArg::new(0x10_0800),
        inputs: Vec::new(),
        postbuild_info: vec![GpuAddressArg::new(0x20_0000), GpuAddressArg::new(0x20_0008)],
    });

    let storage_key = session.key_of(storage.handle);
    let postbuild_key = session.key_of(postbuild.handle);
    match call.command {
        Command::BuildRaytracingAccelerationStructure {
            dest,
            scratch,
            postbuild_info,
            ..
        } => {
            assert_eq!((dest.resource_key, dest.offset), (storage_key, 0));
            assert_eq!((scratch.resource_key, scratch.offset), (storage_key, 0x800));
            let resolved: Vec<_> = postbuild_info
                .iter()
                .map(|address| (address.resource_key, address.offset))
                .collect();
            assert_eq!(resolved, vec![(postbuild_key, 0), (postbuild_key, 8)]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn swapchain_creation_records_its_window_first() {
    let session = Session::new();
    let create = |window: &Arc<MockWindow>, interface_version: u8, swap_chain: usize| {
        Command::CreateSwapChain {
            interface_version,
            factory: HandleArg::from_handle(NativeHandle(0xfa00)),
            device: HandleArg::from_handle(NativeHandle(0xc000)),
            window: ObjectArg::<dyn WindowObject>::new(window.clone()),
            width: 1280,
            height: 720,
            buffer_count: 2,
            swap_chain: HandleArg::from_handle(NativeHandle(swap_chain)),
        }
    };

    // The window is taller than the buffers but narrower.
    let sized = MockWindow::new(0xa000, Some((1920, 600)));
    session.run(create(&sized, 0, 0xf000));
    // A window whose client rect can't be queried falls back to the buffers.
    let r#unsized = MockWindow::new(0xa100, None);
    session.run(create(&r#unsized, 2, 0xf100));

    let entries = session.trace.entries();
    assert_eq!(
        session.trace.names(),
        vec![
            "CreateWindowMetaCommand",
            "IDXGIFactory::CreateSwapChain",
            "CreateWindowMetaCommand",
            "IDXGIFactory2::CreateSwapChainForHwnd",
        ]
    );
    let windows: Vec<_> = entries
        .iter()
        .filter_map(|entry| match entry.command {
            Command::CreateWindowMeta {
                window,
                width,
                height,
            } => Some((window, width, height)),
            _ => None,
        })
        .collect();
    assert_eq!(
        windows,
        vec![
            (NativeHandle(0xa000), 1920, 720),
            (NativeHandle(0xa100), 1280, 720),
        ]
    );
    assert!(session.manager.registry().lookup(NativeHandle(0xf000)).is_some());
}

#[test]
fn disabled_capture_forwards_untouched() {
    let session = Session::with_config(CaptureConfig::default().set_enabled(false));
    let buffer = MockBuffer::new(0x1000, 0x10_0000, 0x100);
    let call = session.create_committed(&buffer);

    assert_eq!(call.key, Key::NONE);
    assert_eq!(session.manager.registry().live_count(), 0);
    assert!(session.trace.entries().is_empty());
}

#[test]
fn only_frames_in_range_are_recorded() {
    let session = Session::with_config(
        CaptureConfig::default()
            .set_use_write_watch(false)
            .set_frame_range(2, 2),
    );
    let buffer = MockBuffer::new(0x1000, 0x10_0000, 0x100);
    let present = || Command::Present {
        swap_chain: HandleArg::from_handle(NativeHandle(0xf000)),
        sync_interval: 1,
        flags: 0,
    };

    session.create_committed(&buffer);
    session.run(present());
    let in_range = session.index_buffer_at(0x10_0020);
    session.run(present());
    session.index_buffer_at(0x10_0020);

    // Tracking runs for every frame.
    assert_eq!(in_range.resource_key, session.key_of(buffer.handle));
    assert_eq!(
        session.trace.names(),
        vec![
            "ID3D12GraphicsCommandList::IASetIndexBuffer",
            "IDXGISwapChain::Present",
        ]
    );
}
