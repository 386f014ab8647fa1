use serde::Deserialize;
use std::{fs, path::Path};
use voxelwalk_input::{InputState, MoveKeys};

#[derive(Debug, Deserialize)]
struct ScriptedInputFile {
    steps: Vec<ScriptedStep>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ScriptedStep {
    /// Number of ticks this step is held.
    ticks: u64,
    #[serde(default)]
    forward: bool,
    #[serde(default)]
    backward: bool,
    #[serde(default)]
    left: bool,
    #[serde(default)]
    right: bool,
    #[serde(default)]
    jump: bool,
    /// Yaw change per tick (radians).
    #[serde(default)]
    look_x: f32,
    /// Pitch change per tick (radians).
    #[serde(default)]
    look_y: f32,
}

/// Replays a JSON list of held-input steps, one tick at a time.
pub struct ScriptedInputPlayer {
    steps: Vec<ScriptedStep>,
    index: usize,
    ticks_in_step: u64,
}

impl ScriptedInputPlayer {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let file: ScriptedInputFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("scripted input file contains no steps");
        }
        Ok(Self {
            steps: file.steps,
            index: 0,
            ticks_in_step: 0,
        })
    }

    /// Ticks left before the script runs out.
    pub fn remaining_ticks(&self) -> u64 {
        let queued: u64 = self.steps.iter().skip(self.index).map(|step| step.ticks).sum();
        queued.saturating_sub(self.ticks_in_step)
    }

    /// True once every step has been played.
    pub fn finished(&self) -> bool {
        self.remaining_ticks() == 0
    }

    /// Input for the next tick. Empty once the script is exhausted.
    pub fn advance(&mut self) -> InputState {
        while let Some(step) = self.steps.get(self.index) {
            if self.ticks_in_step < step.ticks {
                self.ticks_in_step += 1;
                return step.to_input_state();
            }
            self.index += 1;
            self.ticks_in_step = 0;
        }
        InputState::default()
    }
}

impl ScriptedStep {
    fn to_input_state(&self) -> InputState {
        let mut keys = MoveKeys::empty();
        keys.set(MoveKeys::FORWARD, self.forward);
        keys.set(MoveKeys::BACKWARD, self.backward);
        keys.set(MoveKeys::LEFT, self.left);
        keys.set(MoveKeys::RIGHT, self.right);
        keys.set(MoveKeys::JUMP, self.jump);

        let mut input = InputState::with_keys(keys);
        input.add_look(self.look_x, self.look_y);
        input
    }
}
