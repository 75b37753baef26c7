//! The capture layer proper: consults and updates the tracking services for
//! every intercepted call, and annotates the call with resolved keys.

use std::sync::Arc;

use log::{debug, error, warn};

use crate::capture_manager::TrackingServices;
use crate::command::{
    Call, Command, CpuHandleArg, DescriptorHandleArg, DescriptorHandleValue, GpuAddressArg,
    StreamOutputViewArg,
};
use crate::descriptor_handle_service::DescriptorLookup;
use crate::key_registry::{Key, KeyRegistry};
use crate::layer::Layer;
use crate::DescriptorHeapType;

pub struct CaptureCustomizationLayer {
    registry: Arc<KeyRegistry>,
    services: Arc<TrackingServices>,
}

impl CaptureCustomizationLayer {
    pub fn new(registry: Arc<KeyRegistry>, services: Arc<TrackingServices>) -> Self {
        Self { registry, services }
    }

    fn resolve_address(&self, arg: &mut GpuAddressArg, context: &str) {
        if arg.address.is_null() {
            return;
        }
        match self.services.gpu_addresses.resolve(arg.address) {
            Some(info) => arg.set_resolved(info),
            None => warn!(
                "{}: GPU virtual address {:#x} is not inside any tracked resource",
                context, arg.address.0
            ),
        }
    }

    fn resolve_descriptor<H: DescriptorHandleValue>(
        &self,
        heap_type: DescriptorHeapType,
        arg: &mut DescriptorHandleArg<H>,
        context: &str,
    ) {
        match self
            .services
            .descriptors
            .resolve(heap_type, H::KIND, arg.handle.raw())
        {
            DescriptorLookup::Resolved(info) => arg.set_resolved(info),
            DescriptorLookup::NoDescriptor => {}
            DescriptorLookup::Unresolved => warn!(
                "{}: {:?} handle {:#x} is not inside any {:?} descriptor heap",
                context,
                H::KIND,
                arg.handle.raw(),
                heap_type
            ),
        }
    }

    fn resolve_cpu_descriptors(
        &self,
        heap_type: DescriptorHeapType,
        args: &mut [CpuHandleArg],
        context: &str,
    ) {
        for arg in args {
            self.resolve_descriptor(heap_type, arg, context);
        }
    }

    /// Queues meta-commands ahead of `call`, renumbering the call so it
    /// still follows them in the trace.
    fn push_prelude(&self, call: &mut Call, commands: impl IntoIterator<Item = Command>) {
        let before = call.prelude.len();
        for command in commands {
            call.prelude
                .push((self.registry.create_command_key(), command));
        }
        if call.prelude.len() > before {
            call.key = self.registry.create_command_key();
        }
    }

    /// The window a swapchain is created for, sized to cover both the
    /// client area and the swapchain buffers.
    fn create_window_meta(command: &Command) -> Option<Command> {
        let (window, width, height) = match command {
            Command::CreateSwapChain {
                window,
                width,
                height,
                ..
            } => (window, *width, *height),
            _ => return None,
        };
        let (client_width, client_height) = match &window.object {
            Some(object) => object.get_client_size().unwrap_or_else(|err| {
                warn!(
                    "Window {:#x}: {}, using the buffer size",
                    window.handle.0, err
                );
                (0, 0)
            }),
            None => (0, 0),
        };
        Some(Command::CreateWindowMeta {
            window: window.handle,
            width: client_width.max(width),
            height: client_height.max(height),
        })
    }

    fn destroy(&self, key: Key) {
        let services = &self.services;
        services.gpu_addresses.destroy_interface(key);
        services.descriptors.destroy_descriptor_heap(key);
        services.map_tracking.destroy_resource(key);
        services.root_signatures.destroy(key);
        services.command_lists.destroy_command_list(key);
        services.fences.destroy_fence(key);
        services.resource_state.destroy(key);
    }

    fn resolve_arguments(&self, call: &mut Call) {
        let context = call.command.name();
        match &mut call.command {
            Command::CreateView {
                kind,
                acceleration_structure,
                dest,
                ..
            } => {
                if let Some(location) = acceleration_structure {
                    self.resolve_address(location, context);
                }
                self.resolve_descriptor(kind.heap_type(), dest, context);
            }
            Command::CreateConstantBufferView {
                buffer_location,
                dest,
                ..
            } => {
                self.resolve_address(buffer_location, context);
                self.resolve_descriptor(DescriptorHeapType::CBV_SRV_UAV, dest, context);
            }
            Command::CreateSampler { dest, .. } => {
                self.resolve_descriptor(DescriptorHeapType::Sampler, dest, context);
            }
            Command::CopyDescriptors {
                heap_type,
                dest_range_starts,
                src_range_starts,
                ..
            } => {
                self.resolve_cpu_descriptors(*heap_type, dest_range_starts, context);
                self.resolve_cpu_descriptors(*heap_type, src_range_starts, context);
            }
            Command::CopyDescriptorsSimple {
                heap_type,
                dest,
                src,
                ..
            } => {
                self.resolve_descriptor(*heap_type, dest, context);
                self.resolve_descriptor(*heap_type, src, context);
            }
            Command::SetRootBufferView {
                buffer_location, ..
            } => self.resolve_address(buffer_location, context),
            Command::OMSetRenderTargets {
                render_targets,
                depth_stencil,
                ..
            }
            | Command::BeginRenderPass {
                render_targets,
                depth_stencil,
                ..
            } => {
                self.resolve_cpu_descriptors(DescriptorHeapType::RTV, render_targets, context);
                if let Some(depth_stencil) = depth_stencil {
                    self.resolve_descriptor(DescriptorHeapType::DSV, depth_stencil, context);
                }
            }
            Command::ClearRenderTargetView { view, .. } => {
                self.resolve_descriptor(DescriptorHeapType::RTV, view, context);
            }
            Command::ClearDepthStencilView { view, .. } => {
                self.resolve_descriptor(DescriptorHeapType::DSV, view, context);
            }
            Command::ClearUnorderedAccessView {
                view_gpu_handle_in_current_heap,
                view_cpu_handle,
                ..
            } => {
                self.resolve_descriptor(
                    DescriptorHeapType::CBV_SRV_UAV,
                    view_gpu_handle_in_current_heap,
                    context,
                );
                self.resolve_descriptor(DescriptorHeapType::CBV_SRV_UAV, view_cpu_handle, context);
            }
            Command::IASetIndexBuffer {
                buffer_location, ..
            } => self.resolve_address(buffer_location, context),
            Command::IASetVertexBuffers { views, .. } => {
                for view in views {
                    self.resolve_address(view, context);
                }
            }
            Command::SOSetTargets { views, .. } => {
                for StreamOutputViewArg {
                    buffer_location,
                    buffer_filled_size_location,
                    ..
                } in views
                {
                    self.resolve_address(buffer_location, context);
                    self.resolve_address(buffer_filled_size_location, context);
                }
            }
            Command::WriteBufferImmediate { destinations, .. } => {
                for destination in destinations {
                    self.resolve_address(destination, context);
                }
            }
            Command::BuildRaytracingAccelerationStructure {
                dest,
                source,
                scratch,
                inputs,
                postbuild_info,
                ..
            } => {
                self.resolve_address(dest, context);
                self.resolve_address(source, context);
                self.resolve_address(scratch, context);
                for address in inputs.iter_mut().chain(postbuild_info) {
                    self.resolve_address(address, context);
                }
            }
            Command::CopyRaytracingAccelerationStructure { dest, source, .. } => {
                self.resolve_address(dest, context);
                self.resolve_address(source, context);
            }
            Command::DispatchRays {
                ray_generation_shader_record,
                miss_shader_table,
                hit_group_table,
                callable_shader_table,
                ..
            } => {
                self.resolve_address(ray_generation_shader_record, context);
                self.resolve_address(miss_shader_table, context);
                self.resolve_address(hit_group_table, context);
                self.resolve_address(callable_shader_table, context);
            }
            _ => {}
        }
    }
}

impl Layer for CaptureCustomizationLayer {
    fn pre(&self, call: &mut Call) {
        let services = &self.services;
        match &mut call.command {
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
                services
                    .map_tracking
                    .enable_write_watch(heap_properties, heap_flags);
            }
            Command::CommandListReset { command_list, .. } => {
                services.command_lists.reset(command_list.key);
            }
            Command::SetRootSignature {
                command_list,
                bind_point,
                root_signature,
            } => {
                if !root_signature.is_null() {
                    let record = services.root_signatures.get(root_signature.key);
                    if record.is_none() {
                        warn!(
                            "Root signature {} bound to command list {} was never created under capture",
                            root_signature.key, command_list.key
                        );
                    }
                    services
                        .command_lists
                        .set_root_signature(command_list.key, *bind_point, record);
                }
            }
            Command::SetRootDescriptorTable {
                command_list,
                bind_point,
                root_parameter_index,
                base_descriptor,
            } => {
                let heap_type = services.command_lists.get_descriptor_table_heap_type(
                    command_list.key,
                    *bind_point,
                    *root_parameter_index,
                );
                if let Some(heap_type) = heap_type {
                    self.resolve_descriptor(heap_type, base_descriptor, "SetRootDescriptorTable");
                }
            }
            Command::SetEventOnCompletion {
                fence,
                value,
                event,
            } => {
                if let Some(object) = &fence.object {
                    services
                        .fences
                        .set_event_on_completion(object.as_ref(), fence.key, *value, *event);
                }
            }
            Command::SetEventOnMultipleFenceCompletion { .. } => {
                log_once!(
                    error,
                    "SetEventOnMultipleFenceCompletion is not supported, waits are recorded unresolved"
                );
            }
            _ => {}
        }

        self.resolve_arguments(call);

        let window = Self::create_window_meta(&call.command);
        let updates = match &call.command {
            Command::Unmap {
                resource,
                subresource,
                ..
            } => services
                .map_tracking
                .unmap_resource(resource.key, *subresource),
            Command::ExecuteCommandLists { .. } => services.map_tracking.execute_command_lists(),
            _ => Vec::new(),
        };
        let prelude = window
            .into_iter()
            .chain(updates.into_iter().map(Command::from));
        self.push_prelude(call, prelude);
    }

    fn post(&self, call: &mut Call) {
        let services = &self.services;
        let succeeded = call.succeeded();
        let mut prelude = Vec::new();

        match &mut call.command {
            Command::Release { object, ref_count } => {
                if *ref_count == 0 && !object.is_null() {
                    self.destroy(object.key);
                    self.registry.retire(object.handle);
                }
            }
            _ if !succeeded => {}
            Command::CreateCommittedResource { resource, .. } => {
                if let Some(object) = &resource.object {
                    services.gpu_addresses.create_resource(resource.key, object.as_ref());
                    services
                        .resource_state
                        .create_committed_resource(resource.key, object.as_ref());
                }
            }
            Command::CreateReservedResource { resource, .. } => {
                if let Some(object) = &resource.object {
                    services.gpu_addresses.create_resource(resource.key, object.as_ref());
                    services
                        .resource_state
                        .create_reserved_resource(resource.key, object.as_ref());
                }
            }
            Command::CreatePlacedResource {
                heap,
                heap_offset,
                resource,
                ..
            } => {
                if let (Some(object), Some(heap_object)) = (&resource.object, &heap.object) {
                    services.gpu_addresses.create_placed_resource(
                        resource.key,
                        object.as_ref(),
                        heap.key,
                        heap_object.as_ref(),
                        *heap_offset,
                    );
                    services.resource_state.create_placed_resource(
                        resource.key,
                        object.as_ref(),
                        heap.key,
                        heap_object.as_ref(),
                        *heap_offset,
                    );
                }
            }
            Command::CreateHeap { heap, .. } => {
                if let Some(object) = &heap.object {
                    services.gpu_addresses.create_heap(heap.key, object.as_ref());
                    services.resource_state.create_heap(heap.key, object.as_ref());
                }
            }
            Command::OpenExistingHeapFromAddress { address, heap, .. } => {
                if let Some(object) = &heap.object {
                    services.gpu_addresses.create_heap(heap.key, object.as_ref());
                    // The driver accepted the allocation, so it spans the
                    // whole heap.
                    let meta = unsafe {
                        services
                            .resource_state
                            .create_heap_from_address(heap.key, object.as_ref(), *address)
                    };
                    prelude.push(meta);
                }
            }
            Command::CreateDescriptorHeap { device, heap, .. } => {
                if let (Some(object), Some(device_object)) = (&heap.object, &device.object) {
                    services.descriptors.create_descriptor_heap(
                        heap.key,
                        object.as_ref(),
                        device_object.as_ref(),
                    );
                }
            }
            Command::CreateRootSignature {
                blob,
                root_signature,
                ..
            } => {
                if let Err(err) = services
                    .root_signatures
                    .create_root_signature(root_signature.key, blob)
                {
                    error!(
                        "Root signature {} left without a slot table: {}",
                        root_signature.key, err
                    );
                }
            }
            Command::CreateCommandList { command_list, .. } => {
                services.command_lists.create_command_list(command_list.key);
            }
            Command::CreateFence {
                initial_value,
                fence,
                ..
            } => {
                services.fences.create_fence(fence.key, *initial_value);
            }
            Command::OpenSharedHandle {
                interface, object, ..
            } => {
                if let Some(shared) = &object.object {
                    if let Some(promoted) = services
                        .resource_state
                        .promote_open_shared_handle(*interface, shared, object.key)
                    {
                        match &promoted {
                            Command::CreateCommittedResource { resource, .. } => {
                                if let Some(resource_object) = &resource.object {
                                    services
                                        .gpu_addresses
                                        .create_resource(object.key, resource_object.as_ref());
                                }
                            }
                            Command::CreateFence {
                                initial_value,
                                fence,
                                ..
                            } => services.fences.create_fence(fence.key, *initial_value),
                            _ => {}
                        }
                        prelude.push(promoted);
                    }
                }
            }
            Command::Map {
                resource,
                subresource,
                mapped_data,
                ..
            } => {
                if let Some(object) = &resource.object {
                    services.map_tracking.map_resource(
                        resource.key,
                        object.as_ref(),
                        *subresource,
                        *mapped_data,
                    );
                }
            }
            Command::FenceSignal { fence, value } => {
                let satisfied = services.fences.signal(fence.key, *value);
                if !satisfied.is_empty() {
                    debug!(
                        "Signal of fence {} to {} satisfies {} wait(s)",
                        fence.key,
                        value,
                        satisfied.len()
                    );
                }
            }
            Command::GetCompletedValue { fence, value } => {
                if services.fences.should_skip_poll(fence.key, *value) {
                    call.skip = true;
                }
            }
            Command::SwapChainGetBuffer {
                swap_chain,
                buffer,
                resource,
            } => {
                services
                    .resource_state
                    .set_swapchain_buffer(swap_chain.key, *buffer, resource.key);
            }
            Command::SwapChainResizeBuffers { swap_chain, .. } => {
                services.resource_state.clear_swapchain(swap_chain.key);
            }
            _ => {}
        }

        self.push_prelude(call, prelude);
    }
}
