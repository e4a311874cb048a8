//! BLAKE3-based payload hashing.

use crate::chunk::ChunkHash;

/// Computes BLAKE3 hashes of chunk payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Blake3Hasher {
    /// Hashes a payload in one shot.
    pub fn hash(data: &[u8]) -> ChunkHash {
        ChunkHash::new(blake3::hash(data).into())
    }
}
