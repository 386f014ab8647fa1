//! Block materials and the single concrete block type.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use voxelwalk_physics::Aabb;

/// Terrain material.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Material {
    /// Bulk terrain.
    Stone = 0,
    /// Layer directly beneath grass.
    Dirt = 1,
    /// Exposed surface above sea level.
    Grass = 2,
    /// Sea-level flood fill.
    Water = 3,
    /// Debug marker block; solid and brightly coloured.
    Debug = 4,
}

/// Per-material render and collision properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProps {
    /// Canonical name used in configs and logs.
    pub name: &'static str,
    /// Linear RGB colour.
    pub color: [f32; 3],
    /// 1.0 = opaque.
    pub opacity: f32,
    /// Whether the player collides with this material.
    pub solid: bool,
}

const MATERIAL_TABLE: [MaterialProps; 5] = [
    MaterialProps {
        name: "stone",
        color: [0.50, 0.50, 0.50],
        opacity: 1.0,
        solid: true,
    },
    MaterialProps {
        name: "dirt",
        color: [0.55, 0.35, 0.20],
        opacity: 1.0,
        solid: true,
    },
    MaterialProps {
        name: "grass",
        color: [0.30, 0.65, 0.25],
        opacity: 1.0,
        solid: true,
    },
    MaterialProps {
        name: "water",
        color: [0.20, 0.40, 0.85],
        opacity: 0.6,
        solid: false,
    },
    MaterialProps {
        name: "debug",
        color: [1.00, 0.00, 1.00],
        opacity: 1.0,
        solid: true,
    },
];

/// Unknown material requested by name or id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterialError {
    /// No material has this name.
    #[error("unknown material name {0:?}")]
    UnknownName(String),
    /// No material has this numeric id.
    #[error("unknown material id {0}")]
    UnknownId(u8),
}

impl Material {
    /// Every material, in id order.
    pub const ALL: [Material; 5] = [
        Material::Stone,
        Material::Dirt,
        Material::Grass,
        Material::Water,
        Material::Debug,
    ];

    /// Look up the properties row for this material.
    pub fn props(self) -> &'static MaterialProps {
        &MATERIAL_TABLE[self as usize]
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        self.props().name
    }

    /// Whether the player collides with this material.
    pub fn is_solid(self) -> bool {
        self.props().solid
    }

    /// Resolve a material by canonical name.
    pub fn from_name(name: &str) -> Result<Self, MaterialError> {
        Self::ALL
            .into_iter()
            .find(|material| material.name() == name)
            .ok_or_else(|| MaterialError::UnknownName(name.to_string()))
    }
}

impl TryFrom<u8> for Material {
    type Error = MaterialError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(MaterialError::UnknownId(value))
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single voxel at a fixed lattice point.
///
/// The block occupies the unit cell `[position, position + 1)`. Only the render
/// membership flag ever changes after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    material: Material,
    position: IVec3,
    rendered: bool,
}

impl Block {
    /// Create a block that is not yet part of the render set.
    pub fn new(material: Material, position: IVec3) -> Self {
        Self {
            material,
            position,
            rendered: false,
        }
    }

    /// Create a block from a material name; unknown names are an error.
    pub fn from_name(name: &str, position: IVec3) -> Result<Self, MaterialError> {
        Ok(Self::new(Material::from_name(name)?, position))
    }

    /// Material of this block.
    pub fn material(&self) -> Material {
        self.material
    }

    /// World-space lattice position (minimum corner).
    pub fn position(&self) -> IVec3 {
        self.position
    }

    /// Whether the block is currently in the render set.
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub(crate) fn set_rendered(&mut self, rendered: bool) {
        self.rendered = rendered;
    }

    /// Whether the player collides with this block.
    pub fn is_solid(&self) -> bool {
        self.material.is_solid()
    }

    /// Y coordinate of the top face.
    pub fn top(&self) -> f32 {
        (self.position.y + 1) as f32
    }

    /// Bounding box of the unit cell.
    pub fn aabb(&self) -> Aabb {
        Aabb::unit_cell(self.position.as_vec3())
    }

    /// Centre of the unit cell.
    pub fn center(&self) -> Vec3 {
        self.position.as_vec3() + Vec3::splat(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_names_round_trip() {
        for material in Material::ALL {
            assert_eq!(Material::from_name(material.name()), Ok(material));
            assert_eq!(Material::try_from(material as u8), Ok(material));
        }
    }

    #[test]
    fn unknown_material_is_an_error() {
        assert_eq!(
            Material::from_name("lava"),
            Err(MaterialError::UnknownName("lava".into()))
        );
        assert_eq!(Material::try_from(42), Err(MaterialError::UnknownId(42)));
        assert!(Block::from_name("obsidian", IVec3::ZERO).is_err());
    }

    #[test]
    fn water_is_translucent_and_passable() {
        let props = Material::Water.props();
        assert!(props.opacity < 1.0);
        assert!(!props.solid);
        assert!(Material::Stone.is_solid());
        assert!(Material::Grass.is_solid());
    }

    #[test]
    fn block_geometry() {
        let block = Block::new(Material::Dirt, IVec3::new(-2, 3, 5));
        assert_eq!(block.top(), 4.0);
        assert_eq!(block.aabb().min, Vec3::new(-2.0, 3.0, 5.0));
        assert_eq!(block.aabb().max, Vec3::new(-1.0, 4.0, 6.0));
        assert_eq!(block.center(), Vec3::new(-1.5, 3.5, 5.5));
        assert!(!block.is_rendered());
    }

    #[test]
    fn material_serializes_as_snake_case() {
        let json = serde_json::to_string(&Material::Grass).unwrap();
        assert_eq!(json, "\"grass\"");
    }
}
