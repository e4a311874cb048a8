//! Chunk types.
//!
//! - [`Chunk`] - A sequenced batch of values with its payload and metadata
//! - [`ChunkHash`] - 32-byte BLAKE3 hash of a chunk payload

mod data;
mod hash;

pub use data::{Chunk, Values};
pub use hash::ChunkHash;
