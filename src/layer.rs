use std::sync::Arc;

use crate::command::{ArgRole, Call};
use crate::key_registry::KeyRegistry;
use crate::utils::OverrideGuard;

/// A stage every intercepted call passes through, before and after the
/// driver sees it.
pub trait Layer: Send + Sync {
    fn pre(&self, call: &mut Call);

    fn post(&self, call: &mut Call);
}

/// Runs intercepted calls through key assignment and the layers, in order.
pub struct LayerPipeline {
    registry: Arc<KeyRegistry>,
    layers: Vec<Box<dyn Layer>>,
    enabled: bool,
}

impl LayerPipeline {
    pub fn new(registry: Arc<KeyRegistry>, enabled: bool) -> Self {
        Self {
            registry,
            layers: Vec::new(),
            enabled,
        }
    }

    pub fn add_layer(&mut self, layer: Box<dyn Layer>) {
        self.layers.push(layer);
    }

    pub fn registry(&self) -> &Arc<KeyRegistry> {
        &self.registry
    }

    /// Hooks one call. `forward` performs the real driver call: it stores
    /// the result and any produced objects in `call`.
    ///
    /// Arguments overridden by a layer are put back before this returns,
    /// whatever path is taken out of it.
    pub fn intercept<F>(&self, call: &mut Call, forward: F)
    where
        F: FnOnce(&mut Call),
    {
        if !self.enabled {
            forward(call);
            return;
        }

        let mut call = OverrideGuard::new(call);
        call.key = self.registry.create_command_key();
        for (role, arg) in call.command.keyed_args() {
            if role == ArgRole::Input && !arg.native_handle().is_null() {
                arg.set_key(self.registry.key_for(arg.native_handle()));
            }
        }

        for layer in &self.layers {
            layer.pre(&mut *call);
        }

        forward(&mut *call);

        if call.succeeded() {
            for (role, arg) in call.command.keyed_args() {
                if role == ArgRole::Output && !arg.native_handle().is_null() {
                    arg.set_key(self.registry.key_for(arg.native_handle()));
                }
            }
        }

        for layer in &self.layers {
            layer.post(&mut *call);
        }
    }
}
