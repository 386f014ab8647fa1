//! Terrain column generation.
//!
//! Turns one noise sample into a vertical column of materials. Pass one fills
//! stone up to the sampled height; pass two either floods the column up to sea
//! level or dresses its top with grass over dirt.

use crate::block::Material;
use crate::config::WorldConfig;
use crate::noise::NoiseField;

/// A column of optional materials indexed by local y.
pub type Column = Vec<Option<Material>>;

/// Builds material columns from a seeded noise field.
#[derive(Debug)]
pub struct TerrainColumnGenerator {
    noise: NoiseField,
    scale: f64,
    depth: usize,
    sea_level: usize,
}

impl TerrainColumnGenerator {
    /// Create a generator.
    pub fn new(noise: NoiseField, scale: f64, depth: usize, sea_level: usize) -> Self {
        debug_assert!(depth > 0 && sea_level <= depth && scale > 0.0);
        Self {
            noise,
            scale,
            depth,
            sea_level,
        }
    }

    /// Create a generator from world configuration.
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(
            NoiseField::with_amplitude(config.seed, config.noise_amplitude),
            config.noise_scale,
            config.world_depth,
            config.sea_level(),
        )
    }

    /// Underlying noise field.
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Number of blocks in a column.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Flood level.
    pub fn sea_level(&self) -> usize {
        self.sea_level
    }

    /// Continuous terrain height in `[0, depth]` for a world column.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> f64 {
        let sample = self
            .noise
            .sample(world_x as f64 / self.scale, world_z as f64 / self.scale);
        (sample + 1.0) * 0.5 * self.depth as f64
    }

    /// Fully generated column for a world (x, z).
    pub fn column(&self, world_x: i32, world_z: i32) -> Column {
        self.column_for_height(self.height_at(world_x, world_z))
    }

    /// Fully generated column for a given continuous height.
    pub fn column_for_height(&self, height: f64) -> Column {
        let mut column = vec![None; self.depth];
        self.fill_solid(&mut column, height);
        self.apply_surface(&mut column);
        column
    }

    /// Pass one: stone from y = 0 up to and including `floor(height)`.
    ///
    /// The top is capped at `depth - 1`, which only matters when the noise
    /// sample is exactly 1.0.
    pub fn fill_solid(&self, column: &mut [Option<Material>], height: f64) {
        let top = (height.max(0.0).floor() as usize).min(self.depth - 1);
        for cell in &mut column[..=top] {
            *cell = Some(Material::Stone);
        }
    }

    /// Pass two: flood below sea level, otherwise grass on top of dirt.
    ///
    /// Flooding covers `[highest, sea_level)`, so a column whose highest block is
    /// below sea level always receives water and one at or above it never does.
    /// An empty column floods from y = 0.
    pub fn apply_surface(&self, column: &mut [Option<Material>]) {
        match highest_block_y(column) {
            Some(highest) if highest >= self.sea_level => {
                column[highest] = Some(Material::Grass);
                if highest > 0 && column[highest - 1].is_some() {
                    column[highest - 1] = Some(Material::Dirt);
                }
            }
            highest => {
                let start = highest.unwrap_or(0);
                let end = self.sea_level.min(column.len());
                for cell in column.iter_mut().take(end).skip(start) {
                    *cell = Some(Material::Water);
                }
            }
        }
    }
}

/// Index of the highest non-empty cell.
pub fn highest_block_y(column: &[Option<Material>]) -> Option<usize> {
    column.iter().rposition(Option::is_some)
}
