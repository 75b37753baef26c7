//! Frame-range capture state machine.

use log::info;
use parking_lot::Mutex;

use crate::config::CaptureConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CaptureState {
    /// Waiting for the start action.
    NotInitiated,
    /// Counting frames up to the start frame.
    Initiated,
    Capturing,
    /// The stop frame has ended; nothing more is recorded.
    Finished,
}

#[derive(Debug)]
struct BehaviorState {
    state: CaptureState,
    /// Absolute number of the frame that counts as frame 1.
    begin_frame: u64,
    current_frame: u64,
}

/// Decides which frames are recorded.
///
/// Frames are numbered from 1 relative to the capture begin. Recording starts
/// at the end of frame `start_frame - 1` and stops at the end of frame
/// `stop_frame`.
#[derive(Debug)]
pub struct CaptureBehavior {
    start_frame: u32,
    stop_frame: u32,
    capture_on_keypress: bool,
    state: Mutex<BehaviorState>,
}

impl CaptureBehavior {
    pub fn new(config: &CaptureConfig) -> Self {
        let state = if config.capture_on_keypress {
            CaptureState::NotInitiated
        } else if config.start_frame <= 1 {
            CaptureState::Capturing
        } else {
            CaptureState::Initiated
        };
        Self {
            start_frame: config.start_frame.max(1),
            stop_frame: config.stop_frame,
            capture_on_keypress: config.capture_on_keypress,
            state: Mutex::new(BehaviorState {
                state,
                begin_frame: 1,
                current_frame: 1,
            }),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state.lock().state
    }

    pub fn is_capturing(&self) -> bool {
        self.state() == CaptureState::Capturing
    }

    /// Absolute number of the frame being rendered.
    pub fn current_frame(&self) -> u64 {
        self.state.lock().current_frame
    }

    /// Called when a frame has been presented.
    pub fn on_frame_end(&self) {
        let mut state = self.state.lock();
        let frame = state.current_frame;
        state.current_frame += 1;

        if matches!(
            state.state,
            CaptureState::NotInitiated | CaptureState::Finished
        ) {
            return;
        }

        let relative_frame = frame + 1 - state.begin_frame;
        let start_frame = self.start_frame as u64;
        if relative_frame < start_frame {
            if relative_frame == start_frame - 1 {
                info!("Capture starts with frame {}", frame + 1);
                state.state = CaptureState::Capturing;
            }
            return;
        }

        if relative_frame == self.stop_frame as u64 {
            info!("Capture finished after frame {}", frame);
            state.state = CaptureState::Finished;
        }
    }

    /// Starts frame counting in keypress mode; the next frame is frame 1.
    pub fn on_start_action(&self) {
        if !self.capture_on_keypress {
            return;
        }
        let mut state = self.state.lock();
        if state.state != CaptureState::NotInitiated {
            return;
        }
        state.begin_frame = state.current_frame;
        state.state = if self.start_frame == 1 {
            CaptureState::Capturing
        } else {
            CaptureState::Initiated
        };
        info!(
            "Capture initiated at frame {} ({:?})",
            state.current_frame, state.state
        );
    }
}
