//! Voxel terrain, chunk grid, visibility culling and the player body.

mod block;
mod chunk;
mod config;
mod culling;
mod noise;
mod player;
mod storage;
mod terrain;
mod world;

pub use block::*;
pub use chunk::*;
pub use config::*;
pub use culling::*;
pub use noise::*;
pub use player::*;
pub use storage::*;
pub use terrain::*;
pub use world::*;
