use std::collections::BTreeMap;

use crate::{Chunk, ChunkPos};

/// In-memory chunk arena. Chunks are created on first access and live for the
/// rest of the session.
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Default)]
pub struct ChunkStorage {
    chunks: BTreeMap<ChunkPos, Chunk>,
}

impl ChunkStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true when no chunks are currently stored.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Whether `pos` has been generated.
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Obtain mutable access to a chunk, building it with `generate` if necessary.
    pub fn ensure_chunk_with<F>(&mut self, pos: ChunkPos, generate: F) -> &mut Chunk
    where
        F: FnOnce() -> Chunk,
    {
        self.chunks.entry(pos).or_insert_with(generate)
    }

    /// Attempt to fetch a chunk immutably.
    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Fetch a chunk mutably (without creating it).
    pub fn get_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// Iterate over currently resident chunk positions.
    pub fn iter_positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }
}
