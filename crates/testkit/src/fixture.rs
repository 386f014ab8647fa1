//! Hand-built block layouts for player scenarios.

use glam::{IVec3, Vec3};
use std::collections::HashMap;
use voxelwalk_physics::Aabb;
use voxelwalk_world::{Block, BlockQuery, Material};

/// A sparse set of blocks inside fixed bounds.
#[derive(Debug, Clone)]
pub struct BlockFixture {
    blocks: HashMap<IVec3, Block>,
    bounds: Aabb,
}

impl BlockFixture {
    /// Empty fixture covering `bounds`.
    pub fn empty(bounds: Aabb) -> Self {
        Self {
            blocks: HashMap::new(),
            bounds,
        }
    }

    /// One layer of stone at `y = 0` spanning `[-half, half)` on x and z.
    pub fn flat(half: i32, height: f32) -> Self {
        let bounds = Aabb::new(
            Vec3::new(-half as f32, 0.0, -half as f32),
            Vec3::new(half as f32, height, half as f32),
        );
        let mut fixture = Self::empty(bounds);
        for x in -half..half {
            for z in -half..half {
                fixture.insert(Material::Stone, IVec3::new(x, 0, z));
            }
        }
        fixture
    }

    /// Place a block, replacing whatever was there.
    pub fn insert(&mut self, material: Material, position: IVec3) {
        self.blocks.insert(position, Block::new(material, position));
    }

    /// Builder form of [`BlockFixture::insert`].
    pub fn with(mut self, material: Material, position: IVec3) -> Self {
        self.insert(material, position);
        self
    }

    /// Remove a block if present.
    pub fn remove(&mut self, position: IVec3) -> Option<Block> {
        self.blocks.remove(&position)
    }

    /// Number of placed blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks are placed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockQuery for BlockFixture {
    fn block_at(&mut self, position: Vec3) -> Option<Block> {
        self.blocks.get(&position.floor().as_ivec3()).copied()
    }

    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_fixture_has_a_floor() {
        let mut fixture = BlockFixture::flat(2, 8.0);
        assert_eq!(fixture.len(), 16);
        assert!(fixture.block_at(Vec3::new(-1.5, 0.2, 1.9)).is_some());
        assert!(fixture.block_at(Vec3::new(-1.5, 1.2, 1.9)).is_none());
    }

    #[test]
    fn insert_replaces_material() {
        let pos = IVec3::new(0, 0, 0);
        let mut fixture = BlockFixture::flat(1, 4.0).with(Material::Water, pos);
        let block = fixture.block_at(Vec3::new(0.5, 0.5, 0.5)).unwrap();
        assert_eq!(block.material(), Material::Water);
        assert!(fixture.remove(pos).is_some());
        assert!(fixture.block_at(Vec3::new(0.5, 0.5, 0.5)).is_none());
    }
}
