#![warn(missing_docs)]
//! Per-tick input snapshot consumed by the player controller.
//!
//! Device wiring lives with the host; this crate only models the key state the
//! simulation reads each tick.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Movement keys that can be held during a tick.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MoveKeys: u8 {
        /// Move along the camera's forward axis.
        const FORWARD = 0b0000_0001;
        /// Move against the camera's forward axis.
        const BACKWARD = 0b0000_0010;
        /// Move against the camera's right axis.
        const LEFT = 0b0000_0100;
        /// Move along the camera's right axis.
        const RIGHT = 0b0000_1000;
        /// Request a jump.
        const JUMP = 0b0001_0000;
    }
}

/// Input state tracking for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Keys currently held.
    keys: MoveKeys,
    /// Look delta since last tick (yaw, pitch), already scaled to radians.
    pub look_delta: (f32, f32),
}

impl InputState {
    /// Create an empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with the given keys held.
    pub fn with_keys(keys: MoveKeys) -> Self {
        Self {
            keys,
            look_delta: (0.0, 0.0),
        }
    }

    /// Check if every key in `keys` is held.
    pub fn is_pressed(&self, keys: MoveKeys) -> bool {
        self.keys.contains(keys)
    }

    /// True when the jump key is held.
    pub fn jump_requested(&self) -> bool {
        self.keys.contains(MoveKeys::JUMP)
    }

    /// Accumulate a look delta (radians).
    pub fn add_look(&mut self, yaw: f32, pitch: f32) {
        self.look_delta.0 += yaw;
        self.look_delta.1 += pitch;
    }
}
