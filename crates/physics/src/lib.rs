#![warn(missing_docs)]
//! Physics primitives (AABB, collision volumes).

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box used for collisions and culling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner (x, y, z).
    pub min: Vec3,
    /// Maximum corner (x, y, z).
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB. Callers must ensure min <= max per axis.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(
            min.cmple(max).all(),
            "malformed aabb: min {min:?} > max {max:?}"
        );
        Self { min, max }
    }

    /// Box centered on `center` extending `half_extents` along each axis.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Unit cube occupying the lattice cell whose minimum corner is `corner`.
    pub fn unit_cell(corner: Vec3) -> Self {
        Self::new(corner, corner + Vec3::ONE)
    }

    /// Center point of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Copy of this box shifted by `delta`.
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// True when `point` lies within `[min, max]` on every axis (faces included).
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains(&self, other: &Self) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Slab test: the boxes share positive volume on all three axes.
    ///
    /// Boxes that only touch along a face do not intersect, so a body resting on a
    /// block or sliding along a wall is not reported as overlapping it.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Like [`Aabb::intersects`] but ignoring the vertical axis.
    pub fn overlaps_horizontally(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

/// A position plus fixed half-extents, owning the box derived from them.
///
/// The box is cached and refreshed whenever the position changes through
/// [`CollisionVolume::set_position`] or [`CollisionVolume::translate`], so a query
/// after a move never sees a stale box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionVolume {
    position: Vec3,
    half_extents: Vec3,
    aabb: Aabb,
}

impl CollisionVolume {
    /// Create a volume centered on `position`.
    pub fn new(position: Vec3, half_extents: Vec3) -> Self {
        debug_assert!(half_extents.cmpge(Vec3::ZERO).all());
        Self {
            position,
            half_extents,
            aabb: Aabb::from_center_half_extents(position, half_extents),
        }
    }

    /// Current center position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Fixed half-extents.
    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// Box at the current position.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Box the volume would occupy if centered on `position`, without moving it.
    pub fn aabb_at(&self, position: Vec3) -> Aabb {
        Aabb::from_center_half_extents(position, self.half_extents)
    }

    /// Move to `position` and refresh the cached box.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.aabb = self.aabb_at(position);
    }

    /// Move by `delta` and refresh the cached box.
    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    /// Distance from the center to the bottom face.
    pub fn vertical_offset(&self) -> f32 {
        self.half_extents.y
    }
}
