//! Player movement, gravity, jumping and block collision.
//!
//! One `tick` runs, in order: ground refresh, horizontal moves, jump, gravity,
//! vertical resolution. Velocities are in blocks per tick.

use glam::{IVec3, Vec3};
use serde::Serialize;
use tracing::{debug, trace};
use voxelwalk_camera::{Camera, CameraView, PITCH_LIMIT};
use voxelwalk_input::{InputState, MoveKeys};
use voxelwalk_physics::{Aabb, CollisionVolume};

use crate::block::Block;
use crate::config::PlayerConfig;

/// Slack used when deciding whether a box bottom rests on a surface.
const GROUND_EPSILON: f32 = 1e-4;

/// Height of the world floor.
const FLOOR_Y: f32 = 0.0;

/// Eye height above the box center, as a fraction of the half height.
const EYE_FRACTION: f32 = 0.8;

/// Block lookups the controller needs from whatever holds the terrain.
pub trait BlockQuery {
    /// Block occupying the unit cell that contains `position`.
    fn block_at(&mut self, position: Vec3) -> Option<Block>;

    /// Region the player may occupy. Only x and z are enforced.
    fn bounds(&self) -> Aabb;
}

/// Coarse movement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Grounded,
    Jumping,
    Falling,
}

/// Serializable view of the controller after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub position: [f32; 3],
    pub vertical_velocity: f32,
    pub state: MotionState,
    pub yaw: f32,
    pub pitch: f32,
}

/// First-person player body driven by per-tick input.
#[derive(Debug, Clone)]
pub struct PlayerController {
    config: PlayerConfig,
    volume: CollisionVolume,
    vertical_velocity: f32,
    grounded: bool,
    jumping: bool,
    yaw: f32,
    pitch: f32,
}

impl PlayerController {
    /// Spawn a player whose box is centered on `position`.
    pub fn new(config: PlayerConfig, position: Vec3) -> Self {
        let volume = CollisionVolume::new(position, config.half_extents());
        Self {
            config,
            volume,
            vertical_velocity: 0.0,
            grounded: false,
            jumping: false,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Spawn standing on `surface_y` at horizontal `(x, z)`.
    pub fn standing_on(config: PlayerConfig, x: f32, surface_y: f32, z: f32) -> Self {
        let offset = config.half_extents[1];
        Self::new(config, Vec3::new(x, surface_y + offset, z))
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Center of the player box.
    pub fn position(&self) -> Vec3 {
        self.volume.position()
    }

    pub fn aabb(&self) -> Aabb {
        self.volume.aabb()
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn state(&self) -> MotionState {
        if self.jumping {
            MotionState::Jumping
        } else if self.grounded {
            MotionState::Grounded
        } else {
            MotionState::Falling
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Turn by the given deltas (radians). Pitch is clamped short of vertical.
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw = (self.yaw + yaw_delta).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Eye position.
    pub fn eye_position(&self) -> Vec3 {
        self.position() + Vec3::Y * (self.volume.vertical_offset() * EYE_FRACTION)
    }

    /// Place `camera` at the eye with the player's orientation.
    pub fn sync_camera(&self, camera: &mut Camera) {
        camera.position = self.eye_position();
        camera.set_orientation(self.yaw, self.pitch);
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position().to_array(),
            vertical_velocity: self.vertical_velocity,
            state: self.state(),
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    /// Advance one tick.
    pub fn tick<W, C>(&mut self, input: &InputState, camera: &C, world: &mut W)
    where
        W: BlockQuery + ?Sized,
        C: CameraView + ?Sized,
    {
        let before = self.state();

        self.refresh_grounded(world);
        self.move_horizontally(input, camera, world);
        if input.jump_requested() {
            self.request_jump();
        }
        self.apply_gravity();
        if !self.grounded || self.jumping {
            self.resolve_vertical(world);
        }

        let after = self.state();
        if before != after {
            debug!(?before, ?after, position = ?self.position(), "player state changed");
        }
        trace!(
            position = ?self.position(),
            velocity = self.vertical_velocity,
            state = ?after,
            "player tick"
        );
    }

    /// Start a jump if standing. Returns whether the jump started.
    pub fn request_jump(&mut self) -> bool {
        if !self.grounded || self.jumping {
            return false;
        }
        self.vertical_velocity = self.config.jump_impulse;
        self.grounded = false;
        self.jumping = true;
        true
    }

    fn refresh_grounded<W: BlockQuery + ?Sized>(&mut self, world: &mut W) {
        if self.jumping {
            return;
        }
        let aabb = self.volume.aabb();
        self.grounded = aabb.min.y <= FLOOR_Y + GROUND_EPSILON
            || landing_surface(world, &aabb, &aabb).is_some();
    }

    fn move_horizontally<W, C>(&mut self, input: &InputState, camera: &C, world: &mut W)
    where
        W: BlockQuery + ?Sized,
        C: CameraView + ?Sized,
    {
        let forward = flatten(camera.forward());
        let right = flatten(camera.right());
        let moves = [
            (MoveKeys::FORWARD, forward),
            (MoveKeys::BACKWARD, -forward),
            (MoveKeys::LEFT, -right),
            (MoveKeys::RIGHT, right),
        ];

        for (key, direction) in moves {
            if !input.is_pressed(key) || direction == Vec3::ZERO {
                continue;
            }
            let candidate = self.position() + direction * self.config.move_speed;
            if self.can_occupy(world, candidate) {
                self.volume.set_position(candidate);
            } else {
                trace!(?key, ?candidate, "horizontal move blocked");
            }
        }
    }

    fn can_occupy<W: BlockQuery + ?Sized>(&self, world: &mut W, position: Vec3) -> bool {
        let aabb = self.volume.aabb_at(position);
        let bounds = world.bounds();
        if aabb.min.x < bounds.min.x
            || aabb.max.x > bounds.max.x
            || aabb.min.z < bounds.min.z
            || aabb.max.z > bounds.max.z
        {
            return false;
        }
        !solid_blocks_in(world, &aabb)
            .iter()
            .any(|block| {
                block.top() > aabb.min.y + GROUND_EPSILON && block.aabb().intersects(&aabb)
            })
    }

    fn apply_gravity(&mut self) {
        if self.grounded && !self.jumping {
            self.vertical_velocity = 0.0;
            return;
        }
        self.vertical_velocity =
            (self.vertical_velocity + self.config.gravity).max(-self.config.max_fall_speed);
    }

    fn resolve_vertical<W: BlockQuery + ?Sized>(&mut self, world: &mut W) {
        let position = self.position();
        if self.vertical_velocity > 0.0 {
            self.volume.set_position(position + Vec3::Y * self.vertical_velocity);
            self.grounded = false;
            return;
        }

        let current = self.volume.aabb();
        let target = position + Vec3::Y * self.vertical_velocity;
        let candidate = self.volume.aabb_at(target);

        if let Some(top) = landing_surface(world, &current, &candidate) {
            self.land(top);
        } else if candidate.min.y < FLOOR_Y {
            self.land(FLOOR_Y);
        } else {
            self.volume.set_position(target);
            self.grounded = false;
        }
    }

    fn land(&mut self, surface_y: f32) {
        let position = self.position();
        self.volume.set_position(Vec3::new(
            position.x,
            surface_y + self.volume.vertical_offset(),
            position.z,
        ));
        if !self.grounded {
            trace!(surface_y, "landed");
        }
        self.vertical_velocity = 0.0;
        self.grounded = true;
        self.jumping = false;
    }
}

fn flatten(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

/// Every solid block whose cell overlaps the lattice cells touched by `region`.
fn solid_blocks_in<W: BlockQuery + ?Sized>(world: &mut W, region: &Aabb) -> Vec<Block> {
    let min = region.min.floor().as_ivec3();
    let max = region.max.floor().as_ivec3();
    let mut blocks = Vec::new();
    for y in min.y..=max.y {
        for z in min.z..=max.z {
            for x in min.x..=max.x {
                let cell = IVec3::new(x, y, z).as_vec3() + Vec3::splat(0.5);
                if let Some(block) = world.block_at(cell).filter(Block::is_solid) {
                    blocks.push(block);
                }
            }
        }
    }
    blocks
}

/// Highest solid top face under the footprint of `candidate` lying between the
/// candidate bottom and the current bottom.
fn landing_surface<W: BlockQuery + ?Sized>(
    world: &mut W,
    current: &Aabb,
    candidate: &Aabb,
) -> Option<f32> {
    let low = candidate.min.y - GROUND_EPSILON;
    let high = current.min.y + GROUND_EPSILON;
    let region = Aabb::new(
        Vec3::new(candidate.min.x, low - 1.0, candidate.min.z),
        Vec3::new(candidate.max.x, high.max(low), candidate.max.z),
    );
    solid_blocks_in(world, &region)
        .iter()
        .filter(|block| block.aabb().overlaps_horizontally(candidate))
        .map(Block::top)
        .filter(|top| (low..=high).contains(top))
        .reduce(f32::max)
}
