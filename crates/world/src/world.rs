//! The chunk grid: world-to-chunk indexing, lazy generation and render updates.

use std::collections::BTreeSet;

use glam::{IVec3, Vec3};
use tracing::{debug, trace};
use voxelwalk_camera::Frustum;
use voxelwalk_physics::Aabb;

use crate::block::Block;
use crate::chunk::{Chunk, ChunkPos, LocalPos};
use crate::config::{ConfigError, WorldConfig};
use crate::culling::{CullStats, RenderSink};
use crate::player::BlockQuery;
use crate::storage::ChunkStorage;
use crate::terrain::TerrainColumnGenerator;

/// Square grid of `world_size × world_size` chunks centered on the origin.
///
/// Chunk `(cx, cz)` covers world x in `[(cx - half) * CS, (cx - half + 1) * CS)`
/// where `half = world_size / 2`; likewise for z. Chunks are generated the first
/// time anything asks for them.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    generator: TerrainColumnGenerator,
    storage: ChunkStorage,
    active: BTreeSet<ChunkPos>,
}

impl World {
    /// Create an empty world. Fails if `config` is invalid.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            seed = config.seed,
            world_size = config.world_size,
            chunk_size = config.chunk_size,
            depth = config.world_depth,
            sea_level = config.sea_level(),
            "creating world"
        );
        Ok(Self {
            generator: TerrainColumnGenerator::from_config(&config),
            config,
            storage: ChunkStorage::new(),
            active: BTreeSet::new(),
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn generator(&self) -> &TerrainColumnGenerator {
        &self.generator
    }

    fn chunk_size(&self) -> i32 {
        self.config.chunk_size as i32
    }

    /// Chunk index containing `pos`. May lie outside the grid; see [`World::in_bounds`].
    pub fn chunk_index_of(&self, pos: Vec3) -> ChunkPos {
        let cs = self.chunk_size();
        let half = self.config.half_world();
        ChunkPos::new(
            (pos.x.floor() as i32).div_euclid(cs) + half,
            (pos.z.floor() as i32).div_euclid(cs) + half,
        )
    }

    /// Position of `pos` inside its chunk. `None` when `y` is outside `[0, depth)`.
    pub fn local_index_of(&self, pos: Vec3) -> Option<LocalPos> {
        let cs = self.chunk_size();
        let y = pos.y.floor();
        if y < 0.0 || y >= self.config.world_depth as f32 {
            return None;
        }
        Some(LocalPos::new(
            (pos.x.floor() as i32).rem_euclid(cs) as usize,
            y as usize,
            (pos.z.floor() as i32).rem_euclid(cs) as usize,
        ))
    }

    pub fn in_bounds(&self, index: ChunkPos) -> bool {
        let size = self.config.world_size as i32;
        (0..size).contains(&index.x) && (0..size).contains(&index.z)
    }

    /// World-space position of local (0, 0, 0) in chunk `index`.
    pub fn chunk_origin(&self, index: ChunkPos) -> IVec3 {
        let cs = self.chunk_size();
        let half = self.config.half_world();
        IVec3::new((index.x - half) * cs, 0, (index.z - half) * cs)
    }

    /// Horizontal extent of the grid and its full height.
    pub fn bounds(&self) -> Aabb {
        let min = self.chunk_origin(ChunkPos::new(0, 0));
        let size = self.config.world_size as i32 * self.chunk_size();
        Aabb::new(
            min.as_vec3(),
            Vec3::new(
                (min.x + size) as f32,
                self.config.world_depth as f32,
                (min.z + size) as f32,
            ),
        )
    }

    /// Fetch a chunk, generating it on first access. `None` outside the grid.
    pub fn ensure_chunk(&mut self, index: ChunkPos) -> Option<&mut Chunk> {
        if !self.in_bounds(index) {
            return None;
        }
        let origin = self.chunk_origin(index);
        let size = self.config.chunk_size;
        let generator = &self.generator;
        Some(self.storage.ensure_chunk_with(index, || {
            trace!(chunk = %index, "generating chunk on demand");
            Chunk::generate(index, origin, size, generator)
        }))
    }

    /// Already generated chunk, without generating it.
    pub fn chunk(&self, index: ChunkPos) -> Option<&Chunk> {
        self.storage.get(index)
    }

    /// Number of generated chunks.
    pub fn generated_chunks(&self) -> usize {
        self.storage.len()
    }

    /// Chunk containing `pos`, or `None` outside the grid.
    pub fn get_chunk_at_position(&mut self, pos: Vec3) -> Option<&Chunk> {
        let index = self.chunk_index_of(pos);
        self.ensure_chunk(index).map(|chunk| &*chunk)
    }

    /// Block containing `pos`, or `None` if the cell is empty or outside the world.
    pub fn get_block_at_position(&mut self, pos: Vec3) -> Option<&Block> {
        let local = self.local_index_of(pos)?;
        let index = self.chunk_index_of(pos);
        self.ensure_chunk(index)?.block(local)
    }

    /// In-bounds chunks within a square of Chebyshev radius `ceil(radius / CS)`
    /// around the chunk containing `pos`, generating any that are missing.
    pub fn get_nearby_chunks(&mut self, pos: Vec3, radius: f32) -> Vec<ChunkPos> {
        let reach = (radius.max(0.0) / self.config.chunk_size as f32).ceil() as i32;
        let center = self.chunk_index_of(pos);
        let mut nearby = Vec::new();
        for dx in -reach..=reach {
            for dz in -reach..=reach {
                let index = ChunkPos::new(center.x + dx, center.z + dz);
                if self.ensure_chunk(index).is_some() {
                    nearby.push(index);
                }
            }
        }
        nearby
    }

    /// Run the culling pass on every chunk near the player.
    ///
    /// Chunks that were near on the previous call but no longer are have their
    /// rendered blocks removed from `sink`.
    pub fn update_rendered_blocks<S: RenderSink + ?Sized>(
        &mut self,
        player_pos: Vec3,
        frustum: &Frustum,
        sink: &mut S,
    ) -> CullStats {
        let render_distance = self.config.render_distance;
        let nearby: BTreeSet<ChunkPos> = self
            .get_nearby_chunks(player_pos, render_distance)
            .into_iter()
            .collect();

        let mut stats = CullStats::default();
        for index in self.active.difference(&nearby) {
            if let Some(chunk) = self.storage.get_mut(*index) {
                stats.removed += chunk.clear_rendered(sink);
            }
        }
        for index in &nearby {
            if let Some(chunk) = self.storage.get_mut(*index) {
                stats.merge(chunk.update_rendered_blocks(
                    player_pos,
                    frustum,
                    render_distance,
                    sink,
                ));
            }
        }
        self.active = nearby;

        trace!(
            chunks = self.active.len(),
            visible = stats.visible,
            added = stats.added,
            removed = stats.removed,
            "render set updated"
        );
        stats
    }

    /// Top of the highest solid block in the column containing `(x, z)`.
    pub fn surface_height_at(&mut self, x: f32, z: f32) -> Option<f32> {
        let depth = self.config.world_depth;
        (0..depth).rev().find_map(|y| {
            let probe = Vec3::new(x, y as f32 + 0.5, z);
            self.get_block_at_position(probe)
                .filter(|block| block.is_solid())
                .map(Block::top)
        })
    }
}

impl BlockQuery for World {
    fn block_at(&mut self, position: Vec3) -> Option<Block> {
        self.get_block_at_position(position).copied()
    }

    fn bounds(&self) -> Aabb {
        World::bounds(self)
    }
}
