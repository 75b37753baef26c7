//! Capture-side state tracking for D3D12 call recording.
//!
//! Every intercepted call is routed through a [`LayerPipeline`]. The
//! [`CaptureCustomizationLayer`] resolves opaque driver values carried by the
//! call (GPU virtual addresses, CPU/GPU descriptor handles, root-signature
//! slots, fence values) into replay-portable [`Key`]s using the tracking
//! services owned by a [`CaptureManager`], and the [`RecorderLayer`] hands
//! the annotated call to a [`Recorder`].

use std::fmt;

#[macro_use]
extern crate static_assertions;

mod raw_bindings;
pub use raw_bindings::d3d12::*;

#[macro_use]
mod utils;
pub use utils::*;

mod const_wrappers;
pub use const_wrappers::*;

mod enum_wrappers;
pub use enum_wrappers::*;

mod struct_wrappers;
pub use struct_wrappers::*;

// Logs at most once per call site for the lifetime of the process, so a
// pattern hit on every frame doesn't flood the log.
macro_rules! log_once {
    ($level:ident, $($arg:tt)+) => {{
        static ONCE: std::sync::Once = std::sync::Once::new();
        ONCE.call_once(|| log::$level!($($arg)+));
    }};
}

pub mod behavior;
pub mod capture_manager;
pub mod command;
pub mod command_list_service;
pub mod config;
pub mod customization_layer;
pub mod descriptor_handle_service;
pub mod driver;
pub mod fence_service;
pub mod gpu_address_service;
pub mod key_registry;
pub mod layer;
pub mod map_tracking_service;
pub mod recorder;
pub mod resource_state_service;
pub mod root_signature;
pub mod write_watch;

pub use behavior::{CaptureBehavior, CaptureState};
pub use capture_manager::{CaptureManager, TrackingServices};
pub use command::Command;
pub use config::CaptureConfig;
pub use customization_layer::CaptureCustomizationLayer;
pub use driver::NativeHandle;
pub use key_registry::{Key, KeyRegistry};
pub use layer::{Layer, LayerPipeline};
pub use recorder::{Recorder, RecorderLayer, TraceRecorder};

/// Failure reported by a driver introspection call: the function name plus
/// the HRESULT it returned.
#[derive(Clone, PartialEq, Eq)]
pub struct DxError {
    function: String,
    code: HRESULT,
}

impl DxError {
    pub fn new(func_name: &str, err_code: HRESULT) -> Self {
        Self {
            function: func_name.to_owned(),
            code: err_code,
        }
    }

    pub fn code(&self) -> HRESULT {
        self.code
    }
}

impl std::error::Error for DxError {}

impl fmt::Display for DxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: [{:#010x}]", self.function, self.code)
    }
}

impl fmt::Debug for DxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

pub type DxResult<T> = Result<T, DxError>;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("malformed root signature blob: {0}")]
    MalformedRootSignature(String),
    #[error(transparent)]
    Driver(#[from] DxError),
    #[error("write watch query failed for region {base:#x}+{size:#x}")]
    WriteWatch { base: usize, size: usize },
    #[error("no live object is registered under key {0}")]
    UnknownObject(Key),
}

pub type CaptureResult<T> = Result<T, CaptureError>;
