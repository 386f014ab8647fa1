//! Per-chunk visibility culling.
//!
//! A block is rendered when it is exposed, within render distance of the player,
//! and inside the camera frustum. The sink only hears about membership changes.

use std::collections::HashMap;

use glam::{IVec3, Vec3};
use tracing::trace;
use voxelwalk_camera::Frustum;

use crate::block::{Block, Material};
use crate::chunk::Chunk;

/// Receiver of render-set membership changes.
pub trait RenderSink {
    /// `block` entered the render set.
    fn add(&mut self, block: &Block);
    /// `block` left the render set.
    fn remove(&mut self, block: &Block);
}

/// Plain in-memory render set keyed by block position.
#[derive(Debug, Default, Clone)]
pub struct RenderSet {
    members: HashMap<IVec3, Material>,
    adds: u64,
    removes: u64,
}

impl RenderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, position: IVec3) -> bool {
        self.members.contains_key(&position)
    }

    pub fn material_at(&self, position: IVec3) -> Option<Material> {
        self.members.get(&position).copied()
    }

    /// Total `add` calls received.
    pub fn adds(&self) -> u64 {
        self.adds
    }

    /// Total `remove` calls received.
    pub fn removes(&self) -> u64 {
        self.removes
    }

    /// Member positions, sorted for stable output.
    pub fn sorted_positions(&self) -> Vec<IVec3> {
        let mut positions: Vec<IVec3> = self.members.keys().copied().collect();
        positions.sort_by_key(|p| (p.x, p.y, p.z));
        positions
    }
}

impl RenderSink for RenderSet {
    fn add(&mut self, block: &Block) {
        self.adds += 1;
        let previous = self.members.insert(block.position(), block.material());
        debug_assert!(previous.is_none(), "block {:?} added twice", block.position());
    }

    fn remove(&mut self, block: &Block) {
        self.removes += 1;
        let previous = self.members.remove(&block.position());
        debug_assert!(previous.is_some(), "block {:?} removed while absent", block.position());
    }
}

/// Counters from one culling pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CullStats {
    /// Blocks tested.
    pub considered: usize,
    /// Blocks in the render set after the pass.
    pub visible: usize,
    /// Membership additions.
    pub added: usize,
    /// Membership removals.
    pub removed: usize,
}

impl CullStats {
    pub fn merge(&mut self, other: CullStats) {
        self.considered += other.considered;
        self.visible += other.visible;
        self.added += other.added;
        self.removed += other.removed;
    }
}

/// Whether a block passes the distance and frustum tests.
pub fn in_view(block: &Block, player_pos: Vec3, frustum: &Frustum, render_distance: f32) -> bool {
    if block.position().as_vec3().distance(player_pos) >= render_distance + 1.0 {
        return false;
    }
    let aabb = block.aabb();
    frustum.intersects_aabb(aabb.min, aabb.max)
}

impl Chunk {
    /// Recompute render membership for every block in this chunk.
    pub fn update_rendered_blocks<S: RenderSink + ?Sized>(
        &mut self,
        player_pos: Vec3,
        frustum: &Frustum,
        render_distance: f32,
        sink: &mut S,
    ) -> CullStats {
        let mut stats = CullStats::default();
        for (block, exposed) in self.blocks_with_exposure_mut() {
            stats.considered += 1;
            let visible = exposed && in_view(block, player_pos, frustum, render_distance);
            match (visible, block.is_rendered()) {
                (true, false) => {
                    block.set_rendered(true);
                    sink.add(block);
                    stats.added += 1;
                }
                (false, true) => {
                    block.set_rendered(false);
                    sink.remove(block);
                    stats.removed += 1;
                }
                _ => {}
            }
            if visible {
                stats.visible += 1;
            }
        }
        trace!(
            chunk = %self.position(),
            visible = stats.visible,
            added = stats.added,
            removed = stats.removed,
            "culled chunk"
        );
        stats
    }

    /// Drop every rendered block from the render set.
    pub fn clear_rendered<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let mut removed = 0;
        for block in self.blocks_mut().filter(|block| block.is_rendered()) {
            block.set_rendered(false);
            sink.remove(block);
            removed += 1;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkPos, LocalPos};
    use glam::Mat4;
    use voxelwalk_camera::{Camera, CameraView};

    fn frustum_looking_at(eye: Vec3, target: Vec3) -> Frustum {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(70f32.to_radians(), 1.0, 0.1, 500.0);
        Frustum::from_view_projection(&(proj * view))
    }

    fn slab(size: usize) -> Chunk {
        Chunk::from_fn(ChunkPos::new(0, 0), IVec3::ZERO, size, 2, |local| {
            (local.y == 0).then_some(Material::Stone)
        })
    }

    #[test]
    fn visible_blocks_are_added_once() {
        let mut chunk = slab(4);
        let mut sink = RenderSet::new();
        let eye = Vec3::new(2.0, 10.0, 2.0);
        let frustum = frustum_looking_at(eye, Vec3::new(2.0, 0.0, 2.1));

        let first = chunk.update_rendered_blocks(eye, &frustum, 32.0, &mut sink);
        assert_eq!(first.added, 16);
        assert_eq!(sink.len(), 16);
        assert_eq!(chunk.rendered_count(), 16);

        let second = chunk.update_rendered_blocks(eye, &frustum, 32.0, &mut sink);
        assert_eq!(second.added, 0);
        assert_eq!(second.removed, 0);
        assert_eq!(second.visible, 16);
        assert_eq!(sink.adds(), 16);
    }

    #[test]
    fn enclosed_block_is_never_rendered() {
        let center = LocalPos::new(1, 1, 1);
        let mut chunk = Chunk::from_fn(ChunkPos::new(0, 0), IVec3::ZERO, 3, 3, |_| {
            Some(Material::Stone)
        });
        let mut sink = RenderSet::new();
        let eye = Vec3::new(1.5, 8.0, 1.5);
        let frustum = frustum_looking_at(eye, Vec3::new(1.5, 0.0, 1.6));

        chunk.update_rendered_blocks(eye, &frustum, 32.0, &mut sink);
        assert!(!chunk.block(center).unwrap().is_rendered());
        assert!(!sink.contains(IVec3::ONE));
        assert_eq!(sink.len(), 26);
    }

    #[test]
    fn blocks_behind_camera_are_culled() {
        let mut chunk = slab(4);
        let mut sink = RenderSet::new();
        let eye = Vec3::new(2.0, 1.5, 2.0);
        let frustum = frustum_looking_at(eye, Vec3::new(2.0, 30.0, 2.1));

        let stats = chunk.update_rendered_blocks(eye, &frustum, 32.0, &mut sink);
        assert_eq!(stats.visible, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn distance_limit_removes_blocks() {
        let mut chunk = slab(8);
        let mut sink = RenderSet::new();
        let eye = Vec3::new(0.0, 3.0, 0.0);
        let frustum = frustum_looking_at(eye, Vec3::new(4.0, 0.0, 4.0));

        chunk.update_rendered_blocks(eye, &frustum, 100.0, &mut sink);
        let far = IVec3::new(7, 0, 7);
        assert!(sink.contains(far));

        let stats = chunk.update_rendered_blocks(eye, &frustum, 4.0, &mut sink);
        assert!(stats.removed > 0);
        assert!(!sink.contains(far));
        assert_eq!(sink.len(), chunk.rendered_count());
        for position in sink.sorted_positions() {
            assert!(position.as_vec3().distance(eye) < 5.0);
        }
    }

    #[test]
    fn clear_rendered_empties_the_sink() {
        let mut chunk = slab(4);
        let mut sink = RenderSet::new();
        let camera = Camera {
            position: Vec3::new(2.0, 10.0, 2.0),
            pitch: -1.5,
            ..Camera::default()
        };
        chunk.update_rendered_blocks(camera.position, &camera.frustum(), 32.0, &mut sink);
        assert!(!sink.is_empty());

        let removed = chunk.clear_rendered(&mut sink);
        assert_eq!(removed as u64, sink.adds());
        assert!(sink.is_empty());
        assert_eq!(chunk.rendered_count(), 0);
    }
}
