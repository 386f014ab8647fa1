use std::fmt;

use glam::IVec3;
use tracing::{debug, instrument};

use crate::block::{Block, Material};
use crate::terrain::{Column, TerrainColumnGenerator};

/// The six unit-axis neighbour offsets, each exactly once.
pub const NEIGHBOR_OFFSETS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

/// Chunk-local position (X, Y, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Linear index for a chunk `size` wide and any depth.
    pub fn index(self, size: usize) -> usize {
        debug_assert!(self.x < size);
        debug_assert!(self.z < size);
        (self.y * size + self.z) * size + self.x
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

/// Chunk coordinate (X, Z) in the world's chunk grid.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Dense `size × depth × size` grid of optional blocks.
///
/// The material layout is fixed at construction; only render membership changes
/// afterwards (see `culling`).
pub struct Chunk {
    position: ChunkPos,
    origin: IVec3,
    size: usize,
    depth: usize,
    blocks: Vec<Option<Block>>,
    exposed: Vec<bool>,
}

impl Chunk {
    /// Generate terrain for the chunk whose local origin sits at world `origin`.
    #[instrument(skip(generator), fields(chunk_pos = %position, seed = generator.noise().seed()))]
    pub fn generate(
        position: ChunkPos,
        origin: IVec3,
        size: usize,
        generator: &TerrainColumnGenerator,
    ) -> Self {
        debug!("Starting terrain generation");
        let depth = generator.depth();

        // Pass one: solid fill for every column.
        let mut columns: Vec<Column> = Vec::with_capacity(size * size);
        for z in 0..size {
            for x in 0..size {
                let height = generator.height_at(origin.x + x as i32, origin.z + z as i32);
                let mut column = vec![None; depth];
                generator.fill_solid(&mut column, height);
                columns.push(column);
            }
        }

        // Pass two: flood or dress each column.
        for column in &mut columns {
            generator.apply_surface(column);
        }

        let chunk = Self::from_fn(position, origin, size, depth, |local| {
            columns[local.z * size + local.x][local.y]
        });
        debug!(blocks = chunk.block_count(), "Terrain generation complete");
        chunk
    }

    /// Build a chunk from an explicit material layout.
    pub fn from_fn<F>(
        position: ChunkPos,
        origin: IVec3,
        size: usize,
        depth: usize,
        mut material_at: F,
    ) -> Self
    where
        F: FnMut(LocalPos) -> Option<Material>,
    {
        let mut blocks = vec![None; size * size * depth];
        for y in 0..depth {
            for z in 0..size {
                for x in 0..size {
                    let local = LocalPos::new(x, y, z);
                    blocks[local.index(size)] = material_at(local)
                        .map(|material| Block::new(material, origin + local.as_ivec3()));
                }
            }
        }

        let mut chunk = Self {
            position,
            origin,
            size,
            depth,
            blocks,
            exposed: Vec::new(),
        };
        let exposed = (0..chunk.blocks.len())
            .map(|idx| chunk.blocks[idx].is_some() && chunk.is_exposed(chunk.local_of(idx)))
            .collect();
        chunk.exposed = exposed;
        chunk
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    /// World-space offset of local (0, 0, 0).
    #[inline]
    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn local_of(&self, idx: usize) -> LocalPos {
        let x = idx % self.size;
        let z = (idx / self.size) % self.size;
        let y = idx / (self.size * self.size);
        LocalPos::new(x, y, z)
    }

    /// Convert a signed local offset into a `LocalPos` if it is inside the grid.
    pub fn checked_local(&self, local: IVec3) -> Option<LocalPos> {
        let in_range = |v: i32, len: usize| v >= 0 && (v as usize) < len;
        let inside = in_range(local.x, self.size)
            && in_range(local.y, self.depth)
            && in_range(local.z, self.size);
        inside.then(|| LocalPos::new(local.x as usize, local.y as usize, local.z as usize))
    }

    /// Block at a local position, if any.
    pub fn block(&self, local: LocalPos) -> Option<&Block> {
        if local.x >= self.size || local.z >= self.size || local.y >= self.depth {
            return None;
        }
        self.blocks[local.index(self.size)].as_ref()
    }

    /// Block at a world lattice position, if it falls inside this chunk.
    pub fn block_at_world(&self, world: IVec3) -> Option<&Block> {
        self.checked_local(world - self.origin)
            .and_then(|local| self.block(local))
    }

    /// Highest occupied y in a column.
    pub fn column_height(&self, x: usize, z: usize) -> Option<usize> {
        (0..self.depth)
            .rev()
            .find(|&y| self.block(LocalPos::new(x, y, z)).is_some())
    }

    /// Iterate over every present block.
    pub fn iter_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter().flatten()
    }

    pub fn block_count(&self) -> usize {
        self.iter_blocks().count()
    }

    /// Number of blocks currently in the render set.
    pub fn rendered_count(&self) -> usize {
        self.iter_blocks().filter(|block| block.is_rendered()).count()
    }

    /// A block is exposed when at least one of its six axis neighbours is empty
    /// or outside this chunk.
    pub fn is_exposed(&self, local: LocalPos) -> bool {
        let here = local.as_ivec3();
        NEIGHBOR_OFFSETS.iter().any(|offset| {
            self.checked_local(here + *offset)
                .and_then(|neighbor| self.block(neighbor))
                .is_none()
        })
    }

    /// Blocks paired with their cached exposure, for the culling pass.
    pub(crate) fn blocks_with_exposure_mut(
        &mut self,
    ) -> impl Iterator<Item = (&mut Block, bool)> + '_ {
        self.blocks
            .iter_mut()
            .zip(self.exposed.iter().copied())
            .filter_map(|(slot, exposed)| slot.as_mut().map(|block| (block, exposed)))
    }

    pub(crate) fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> + '_ {
        self.blocks.iter_mut().flatten()
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("position", &self.position)
            .field("origin", &self.origin)
            .field("size", &self.size)
            .field("depth", &self.depth)
            .field("blocks", &self.block_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::NoiseField;

    fn solid_cube(size: usize) -> Chunk {
        Chunk::from_fn(ChunkPos::new(0, 0), IVec3::ZERO, size, size, |_| {
            Some(Material::Stone)
        })
    }

    #[test]
    fn test_local_pos_index() {
        assert_eq!(LocalPos::new(0, 0, 0).index(16), 0);
        assert_eq!(LocalPos::new(15, 0, 0).index(16), 15);
        assert_eq!(LocalPos::new(0, 0, 1).index(16), 16);
        assert_eq!(LocalPos::new(0, 1, 0).index(16), 16 * 16);
    }

    #[test]
    fn test_local_of_inverts_index() {
        let chunk = solid_cube(4);
        for idx in 0..chunk.blocks.len() {
            assert_eq!(chunk.local_of(idx).index(4), idx);
        }
    }

    #[test]
    fn test_chunk_pos_display() {
        let pos = ChunkPos::new(5, -3);
        assert_eq!(format!("{}", pos), "(5, -3)");
    }

    #[test]
    fn test_chunk_pos_ordering() {
        // ChunkPos implements Ord for BTreeMap determinism
        let pos1 = ChunkPos::new(0, 0);
        let pos2 = ChunkPos::new(1, 0);
        let pos3 = ChunkPos::new(0, 1);

        assert!(pos1 < pos2);
        assert!(pos1 < pos3);
        assert!(pos2 > pos1);
    }

    #[test]
    fn test_neighbor_offsets_are_the_six_unit_axes() {
        let mut seen = std::collections::HashSet::new();
        for offset in NEIGHBOR_OFFSETS {
            assert_eq!(offset.abs().element_sum(), 1, "{offset:?} is not a unit axis step");
            assert!(seen.insert(offset), "{offset:?} appears twice");
        }
        assert_eq!(seen.len(), 6);
        let total = NEIGHBOR_OFFSETS
            .iter()
            .fold(IVec3::ZERO, |acc, offset| acc + *offset);
        assert_eq!(total, IVec3::ZERO);
    }

    #[test]
    fn test_isolated_block_is_exposed() {
        let center = LocalPos::new(1, 1, 1);
        let chunk = Chunk::from_fn(ChunkPos::new(0, 0), IVec3::ZERO, 3, 3, |local| {
            (local == center).then_some(Material::Stone)
        });
        assert!(chunk.is_exposed(center));
    }

    #[test]
    fn test_enclosed_block_is_not_exposed() {
        let center = LocalPos::new(1, 1, 1);
        let chunk = Chunk::from_fn(ChunkPos::new(0, 0), IVec3::ZERO, 3, 3, |local| {
            let d = local.as_ivec3() - center.as_ivec3();
            (d.abs().element_sum() <= 1).then_some(Material::Stone)
        });
        assert!(!chunk.is_exposed(center));
        // The neighbours themselves touch the chunk edge or empty corners.
        assert!(chunk.is_exposed(LocalPos::new(1, 2, 1)));
    }

    #[test]
    fn test_single_missing_neighbor_exposes() {
        let center = LocalPos::new(1, 1, 1);
        for offset in NEIGHBOR_OFFSETS {
            let hole = center.as_ivec3() + offset;
            let chunk = solid_cube_with_hole(hole);
            assert!(chunk.is_exposed(center), "hole at {hole:?} not detected");
        }
        assert!(!solid_cube(3).is_exposed(center));
    }

    fn solid_cube_with_hole(hole: IVec3) -> Chunk {
        Chunk::from_fn(ChunkPos::new(0, 0), IVec3::ZERO, 3, 3, |local| {
            (local.as_ivec3() != hole).then_some(Material::Stone)
        })
    }

    #[test]
    fn test_chunk_edge_counts_as_exposed() {
        let chunk = solid_cube(3);
        assert!(chunk.is_exposed(LocalPos::new(0, 1, 1)));
        assert!(chunk.is_exposed(LocalPos::new(1, 0, 1)));
        assert!(chunk.is_exposed(LocalPos::new(1, 1, 2)));
    }

    #[test]
    fn test_block_positions_are_world_space() {
        let origin = IVec3::new(-32, 0, 16);
        let chunk = Chunk::from_fn(ChunkPos::new(2, 5), origin, 4, 2, |_| Some(Material::Dirt));
        let block = chunk.block(LocalPos::new(3, 1, 2)).unwrap();
        assert_eq!(block.position(), IVec3::new(-29, 1, 18));
        assert_eq!(
            chunk.block_at_world(IVec3::new(-29, 1, 18)).map(|b| b.position()),
            Some(block.position())
        );
        assert!(chunk.block_at_world(IVec3::new(-33, 1, 18)).is_none());
        assert!(chunk.block_at_world(IVec3::new(-29, 2, 18)).is_none());
    }

    #[test]
    fn test_generated_chunk_columns() {
        let gen = TerrainColumnGenerator::new(NoiseField::new(12345), 24.0, 16, 8);
        let chunk = Chunk::generate(ChunkPos::new(0, 0), IVec3::new(-8, 0, -8), 8, &gen);

        for z in 0..8 {
            for x in 0..8 {
                let expected = gen.column(-8 + x as i32, -8 + z as i32);
                for y in 0..16 {
                    let actual = chunk.block(LocalPos::new(x, y, z)).map(|b| b.material());
                    assert_eq!(actual, expected[y], "mismatch at ({x}, {y}, {z})");
                }
                assert!(chunk.column_height(x, z).is_some());
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let gen = TerrainColumnGenerator::new(NoiseField::new(789), 24.0, 16, 8);
        let chunk1 = Chunk::generate(ChunkPos::new(5, 10), IVec3::new(80, 0, 160), 8, &gen);
        let chunk2 = Chunk::generate(ChunkPos::new(5, 10), IVec3::new(80, 0, 160), 8, &gen);
        let a: Vec<_> = chunk1.iter_blocks().map(|b| (b.position(), b.material())).collect();
        let b: Vec<_> = chunk2.iter_blocks().map(|b| (b.position(), b.material())).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_new_chunk_has_nothing_rendered() {
        let chunk = solid_cube(3);
        assert_eq!(chunk.block_count(), 27);
        assert_eq!(chunk.rendered_count(), 0);
    }
}
