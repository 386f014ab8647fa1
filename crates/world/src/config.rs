//! Startup constants for world generation and player physics.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A size that must be at least one was zero.
    #[error("{0} must be at least 1")]
    ZeroSize(&'static str),
    /// Sea level above the top of the world.
    #[error("sea level {sea_level} exceeds world depth {world_depth}")]
    SeaLevelTooHigh {
        /// Configured sea level.
        sea_level: usize,
        /// Configured depth.
        world_depth: usize,
    },
    /// A value that must be strictly positive was not.
    #[error("{name} must be positive (got {value})")]
    NotPositive {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// World layout and terrain parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunks per horizontal axis. The grid is centered on the origin.
    pub world_size: usize,
    /// Blocks per chunk along x and z.
    pub chunk_size: usize,
    /// Blocks per chunk along y.
    pub world_depth: usize,
    /// Flood level. Defaults to half the world depth.
    pub sea_level: Option<usize>,
    /// Blocks further than this from the player are culled.
    pub render_distance: f32,
    /// World units per noise unit.
    pub noise_scale: f64,
    /// Base octave amplitude.
    pub noise_amplitude: f64,
    /// Terrain seed.
    pub seed: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_size: 8,
            chunk_size: 16,
            world_depth: 32,
            sea_level: None,
            render_distance: 24.0,
            noise_scale: 48.0,
            noise_amplitude: 1.0,
            seed: 42,
        }
    }
}

impl WorldConfig {
    /// Effective sea level.
    pub fn sea_level(&self) -> usize {
        self.sea_level
            .unwrap_or((self.world_depth as f64 * 0.5) as usize)
    }

    /// Half the grid, used to center chunk indices on the origin.
    pub fn half_world(&self) -> i32 {
        (self.world_size / 2) as i32
    }

    /// Check every invariant the world relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_size == 0 {
            return Err(ConfigError::ZeroSize("world_size"));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroSize("chunk_size"));
        }
        if self.world_depth == 0 {
            return Err(ConfigError::ZeroSize("world_depth"));
        }
        if self.sea_level() > self.world_depth {
            return Err(ConfigError::SeaLevelTooHigh {
                sea_level: self.sea_level(),
                world_depth: self.world_depth,
            });
        }
        positive("render_distance", self.render_distance as f64)?;
        positive("noise_scale", self.noise_scale)?;
        positive("noise_amplitude", self.noise_amplitude)?;
        Ok(())
    }
}

/// Player movement and collision parameters. Velocities are per tick.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Added to vertical velocity every airborne tick (negative = down).
    pub gravity: f32,
    /// Largest downward speed.
    pub max_fall_speed: f32,
    /// Vertical velocity set by a jump.
    pub jump_impulse: f32,
    /// Horizontal distance per held movement key.
    pub move_speed: f32,
    /// Half size of the player box.
    pub half_extents: [f32; 3],
    /// Spawn point (x, z). The spawn height is taken from `spawn_height` or the terrain.
    pub spawn: [f32; 2],
    /// Height of the box center at spawn; `None` places the player on the terrain surface.
    pub spawn_height: Option<f32>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            gravity: -0.015,
            max_fall_speed: 0.5,
            jump_impulse: 0.22,
            move_speed: 0.1,
            half_extents: [0.3, 0.9, 0.3],
            spawn: [0.5, 0.5],
            spawn_height: None,
        }
    }
}

impl PlayerConfig {
    /// Half extents as a vector.
    pub fn half_extents(&self) -> Vec3 {
        Vec3::from_array(self.half_extents)
    }

    /// Check every invariant the controller relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_fall_speed", self.max_fall_speed as f64)?;
        positive("jump_impulse", self.jump_impulse as f64)?;
        positive("move_speed", self.move_speed as f64)?;
        for (name, value) in ["half_extents.x", "half_extents.y", "half_extents.z"]
            .into_iter()
            .zip(self.half_extents)
        {
            positive(name, value as f64)?;
        }
        if self.gravity >= 0.0 {
            return Err(ConfigError::NotPositive {
                name: "-gravity",
                value: -(self.gravity as f64),
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}
