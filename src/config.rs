use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;
use voxelwalk_world::{PlayerConfig, WorldConfig};

pub const DEFAULT_CONFIG_PATH: &str = "config/voxelwalk.toml";

/// Everything a headless run reads at startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Ticks to simulate when `--ticks` is not given.
    pub ticks: u64,
    /// Camera aspect ratio (width / height) used to build the frustum.
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            aspect: 16.0 / 9.0,
            fov_degrees: 70.0,
        }
    }
}

impl SimConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        let config = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SimConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SimConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH) {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                SimConfig::default()
            }
        };

        if let Err(err) = config.validate() {
            warn!("Invalid config in {}: {err}. Using defaults", path.display());
            return SimConfig::default();
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        self.world.validate()?;
        self.player.validate()?;
        if !(self.run.aspect > 0.0) {
            anyhow::bail!("run.aspect must be positive (got {})", self.run.aspect);
        }
        if !(1.0..179.0).contains(&self.run.fov_degrees) {
            anyhow::bail!("run.fov_degrees out of range (got {})", self.run.fov_degrees);
        }
        Ok(())
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
