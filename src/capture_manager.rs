use std::sync::Arc;

use log::info;

use crate::behavior::CaptureBehavior;
use crate::command::{Call, Command};
use crate::command_list_service::CommandListService;
use crate::config::CaptureConfig;
use crate::customization_layer::CaptureCustomizationLayer;
use crate::descriptor_handle_service::DescriptorHandleService;
use crate::fence_service::FenceService;
use crate::gpu_address_service::GpuAddressService;
use crate::key_registry::KeyRegistry;
use crate::layer::LayerPipeline;
use crate::map_tracking_service::MapTrackingService;
use crate::recorder::{Recorder, RecorderLayer};
use crate::resource_state_service::ResourceStateService;
use crate::root_signature::RootSignatureService;

/// The tracking services of one capture session.
#[derive(Debug)]
pub struct TrackingServices {
    pub gpu_addresses: GpuAddressService,
    pub descriptors: DescriptorHandleService,
    pub root_signatures: RootSignatureService,
    pub command_lists: CommandListService,
    pub fences: FenceService,
    pub map_tracking: MapTrackingService,
    pub resource_state: ResourceStateService,
}

impl TrackingServices {
    pub fn new(config: &CaptureConfig) -> Self {
        Self::with_map_tracking(MapTrackingService::new(config.use_write_watch))
    }

    /// Builds the services around a preconfigured map tracker.
    pub fn with_map_tracking(map_tracking: MapTrackingService) -> Self {
        Self {
            gpu_addresses: GpuAddressService::new(),
            descriptors: DescriptorHandleService::new(),
            root_signatures: RootSignatureService::new(),
            command_lists: CommandListService::new(),
            fences: FenceService::new(),
            map_tracking,
            resource_state: ResourceStateService::new(),
        }
    }
}

/// Owns everything a capture session needs: the key registry, the tracking
/// services, the frame-range behavior, and the layer pipeline that ties them
/// to a [`Recorder`].
///
/// Driver hooks hold one of these and route every call through
/// [`CaptureManager::intercept`].
pub struct CaptureManager {
    config: CaptureConfig,
    registry: Arc<KeyRegistry>,
    services: Arc<TrackingServices>,
    behavior: Arc<CaptureBehavior>,
    pipeline: LayerPipeline,
}

impl CaptureManager {
    pub fn new<R: Recorder + 'static>(config: CaptureConfig, recorder: R) -> Self {
        Self::with_services(config, TrackingServices::new(&config), recorder)
    }

    pub fn with_services<R: Recorder + 'static>(
        config: CaptureConfig,
        services: TrackingServices,
        recorder: R,
    ) -> Self {
        let registry = Arc::new(KeyRegistry::new());
        let services = Arc::new(services);
        let behavior = Arc::new(CaptureBehavior::new(&config));

        let mut pipeline = LayerPipeline::new(registry.clone(), config.enabled);
        pipeline.add_layer(Box::new(CaptureCustomizationLayer::new(
            registry.clone(),
            services.clone(),
        )));
        pipeline.add_layer(Box::new(RecorderLayer::new(recorder, behavior.clone())));

        info!(
            "Capture session created: enabled {}, frames {}..={}, write watch {}",
            config.enabled, config.start_frame, config.stop_frame, config.use_write_watch
        );

        Self {
            config,
            registry,
            services,
            behavior,
            pipeline,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn services(&self) -> &TrackingServices {
        &self.services
    }

    pub fn behavior(&self) -> &CaptureBehavior {
        &self.behavior
    }

    /// Routes one call through the pipeline; see [`LayerPipeline::intercept`].
    ///
    /// A `Present` ends the current frame once it has been recorded.
    pub fn intercept<F>(&self, call: &mut Call, forward: F)
    where
        F: FnOnce(&mut Call),
    {
        let ends_frame = matches!(call.command, Command::Present { .. });
        self.pipeline.intercept(call, forward);
        if ends_frame {
            self.behavior.on_frame_end();
        }
    }

    /// The user-triggered capture start in keypress mode.
    pub fn on_start_action(&self) {
        self.behavior.on_start_action();
    }
}
