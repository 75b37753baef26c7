#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Capture options supplied by the configuration front end.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CaptureConfig {
    /// When false, calls are forwarded without tracking or recording.
    pub enabled: bool,
    /// Arm OS write watching on CPU-mappable heaps.
    pub use_write_watch: bool,
    /// First frame to record, counted from 1.
    pub start_frame: u32,
    /// Last frame to record; `u32::MAX` records until the session ends.
    pub stop_frame: u32,
    /// Wait for [`crate::CaptureBehavior::on_start_action`] before counting
    /// frames.
    pub capture_on_keypress: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            use_write_watch: true,
            start_frame: 1,
            stop_frame: u32::MAX,
            capture_on_keypress: false,
        }
    }
}

impl CaptureConfig {
    pub fn set_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn set_use_write_watch(mut self, use_write_watch: bool) -> Self {
        self.use_write_watch = use_write_watch;
        self
    }

    pub fn set_frame_range(mut self, start_frame: u32, stop_frame: u32) -> Self {
        assert!(start_frame >= 1, "frames are counted from 1");
        assert!(
            stop_frame >= start_frame,
            "stop frame {} precedes start frame {}",
            stop_frame,
            start_frame
        );
        self.start_frame = start_frame;
        self.stop_frame = stop_frame;
        self
    }

    pub fn set_capture_on_keypress(mut self, capture_on_keypress: bool) -> Self {
        self.capture_on_keypress = capture_on_keypress;
        self
    }
}
