//! Chunk accumulation - the flush state machine.
//!
//! Values are appended to a growing buffer, each followed by the delimiter.
//! Before a value is appended, the buffer is flushed if the resulting payload
//! would exceed the chunk size limit. An empty buffer is never flushed early,
//! so a value larger than the limit still ends up alone in its own chunk.
//!
//! # Example
//!
//! ```
//! use splitrs::ChunkAccumulator;
//! use bytes::Bytes;
//!
//! let mut acc = ChunkAccumulator::new(Bytes::from_static(b","), 16, 0);
//!
//! assert!(acc.push(b"apple", 6).is_none());
//! assert!(acc.push(b"pear", 11).is_none());
//! assert!(acc.push(b"peach", 17).is_none());
//!
//! // "apple,pear,peach,cherry" would be 23 bytes, so the first three flush.
//! let chunk = acc.push(b"cherry", 24).unwrap();
//! assert_eq!(&chunk.data[..], b"apple,pear,peach");
//! assert_eq!(chunk.value_range(), 0..=2);
//!
//! let last = acc.finish(24).unwrap();
//! assert_eq!(&last.data[..], b"cherry");
//! assert_eq!(last.value_range(), 3..=3);
//! ```

use std::borrow::Cow;

use bytes::Bytes;

use crate::buffer::Buffer;
use crate::chunk::Chunk;
use crate::config::{FilterAction, HashConfig, MIN_CHUNK_SIZE_LIMIT, SplitConfig, ValueFilter};

/// Batches accepted values into chunks and assigns sequence numbers.
///
/// Value sequence numbers start at zero and advance once per accepted value.
/// Chunk sequence numbers advance once per emitted chunk, starting from the
/// configured start.
pub struct ChunkAccumulator {
    delimiter: Bytes,
    limit: usize,
    buffer: Buffer,
    filter: Option<ValueFilter>,
    hash_config: HashConfig,
    start_chunk_sn: u64,
    next_chunk_sn: u64,
    chunk_start_value_sn: u64,
    next_value_sn: u64,
}

impl ChunkAccumulator {
    /// Creates an accumulator.
    ///
    /// `chunk_size_limit` is raised to 16 if smaller. `delimiter` must be non-empty.
    pub fn new(delimiter: Bytes, chunk_size_limit: usize, start_chunk_sn: u64) -> Self {
        let limit = chunk_size_limit.max(MIN_CHUNK_SIZE_LIMIT);
        Self {
            delimiter,
            limit,
            buffer: Buffer::take(limit),
            filter: None,
            hash_config: HashConfig::default(),
            start_chunk_sn,
            next_chunk_sn: start_chunk_sn,
            chunk_start_value_sn: 0,
            next_value_sn: 0,
        }
    }

    /// Creates an accumulator from a split configuration, including its filter.
    pub fn from_config(config: &SplitConfig) -> Self {
        let mut acc = Self::new(
            config.delimiter().clone(),
            config.chunk_size_limit(),
            config.start_chunk_sn(),
        )
        .with_hash_config(*config.hash_config());
        acc.filter = config.value_filter().cloned();
        acc
    }

    /// Sets the hash configuration.
    pub fn with_hash_config(mut self, config: HashConfig) -> Self {
        self.hash_config = config;
        self
    }

    /// Offers one scanned value.
    ///
    /// Empty values and values rejected by the filter are ignored. Returns
    /// the previous chunk if accepting this value forced it to flush.
    /// `scanned_bytes` is recorded on that chunk.
    pub fn push(&mut self, value: &[u8], scanned_bytes: u64) -> Option<Chunk> {
        let value = self.filter(value)?;

        let flushed = if !self.buffer.is_empty() && self.buffer.len() + value.len() > self.limit {
            Some(self.flush(scanned_bytes))
        } else {
            None
        };

        self.buffer.extend_from_slice(&value);
        self.buffer.extend_from_slice(&self.delimiter);
        self.next_value_sn += 1;

        flushed
    }

    /// Flushes whatever is buffered, regardless of size.
    ///
    /// Call this at end of stream. Returns `None` if nothing is buffered.
    pub fn finish(&mut self, scanned_bytes: u64) -> Option<Chunk> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(self.flush(scanned_bytes))
    }

    /// Returns the number of buffered bytes, including trailing delimiter.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the number of values accepted so far.
    pub fn values_accepted(&self) -> u64 {
        self.next_value_sn
    }

    /// Returns the number of chunks emitted so far.
    pub fn chunks_emitted(&self) -> u64 {
        self.next_chunk_sn.wrapping_sub(self.start_chunk_sn)
    }

    /// Returns the effective chunk size limit.
    pub fn chunk_size_limit(&self) -> usize {
        self.limit
    }

    fn filter<'a>(&self, value: &'a [u8]) -> Option<Cow<'a, [u8]>> {
        if value.is_empty() {
            return None;
        }
        let Some(filter) = &self.filter else {
            return Some(Cow::Borrowed(value));
        };
        match filter(value) {
            FilterAction::Keep => Some(Cow::Borrowed(value)),
            FilterAction::Drop => None,
            FilterAction::Replace(v) if v.is_empty() => None,
            FilterAction::Replace(v) => Some(Cow::Owned(v)),
        }
    }

    fn flush(&mut self, scanned_bytes: u64) -> Chunk {
        let payload = &self.buffer[..self.buffer.len() - self.delimiter.len()];
        let data = Bytes::copy_from_slice(payload);

        let chunk = Chunk {
            sn: self.next_chunk_sn,
            start_value_sn: self.chunk_start_value_sn,
            end_value_sn: self.next_value_sn - 1,
            hash: self.compute_hash(&data),
            data,
            scanned_bytes,
        };

        self.next_chunk_sn = self.next_chunk_sn.wrapping_add(1);
        self.chunk_start_value_sn = self.next_value_sn;
        self.buffer.clear();
        chunk
    }

    fn compute_hash(&self, data: &[u8]) -> Option<crate::chunk::ChunkHash> {
        if !self.hash_config.enabled {
            return None;
        }
        #[cfg(feature = "hash-blake3")]
        return Some(crate::hash::Blake3Hasher::hash(data));
        #[cfg(not(feature = "hash-blake3"))]
        let _ = data;
        #[cfg(not(feature = "hash-blake3"))]
        return None;
    }
}

impl std::fmt::Debug for ChunkAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkAccumulator")
            .field("limit", &self.limit)
            .field("pending_len", &self.buffer.len())
            .field("next_chunk_sn", &self.next_chunk_sn)
            .field("next_value_sn", &self.next_value_sn)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(limit: usize) -> ChunkAccumulator {
        ChunkAccumulator::new(Bytes::from_static(b","), limit, 0)
    }

    #[test]
    fn test_empty_values_ignored() {
        let mut acc = acc(16);
        assert!(acc.push(b"", 1).is_none());
        assert_eq!(acc.values_accepted(), 0);
        assert!(acc.finish(1).is_none());
        assert_eq!(acc.chunks_emitted(), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(acc(1).chunk_size_limit(), MIN_CHUNK_SIZE_LIMIT);
    }

    #[test]
    fn test_payload_may_reach_limit_exactly() {
        let mut acc = acc(16);
        // "0123456,89abcdef" is exactly 16 bytes.
        assert!(acc.push(b"0123456", 8).is_none());
        assert!(acc.push(b"89abcdef", 17).is_none());
        assert_eq!(acc.pending_len(), 17);

        let chunk = acc.finish(17).unwrap();
        assert_eq!(chunk.len(), 16);
        assert_eq!(chunk.value_range(), 0..=1);
    }

    #[test]
    fn test_one_byte_over_limit_flushes() {
        let mut acc = acc(16);
        acc.push(b"0123456", 8);
        let chunk = acc.push(b"89abcdefg", 18).unwrap();
        assert_eq!(&chunk.data[..], b"0123456");
        assert_eq!(chunk.scanned_bytes, 18);
        assert_eq!(acc.pending_len(), 10);
    }

    #[test]
    fn test_oversized_value_alone() {
        let mut acc = acc(16);
        let big = [b'x'; 30];
        assert!(acc.push(&big, 30).is_none());

        let chunk = acc.finish(30).unwrap();
        assert_eq!(chunk.len(), 30);
        assert_eq!(chunk.value_range(), 0..=0);
    }

    #[test]
    fn test_oversized_value_flushed_by_next_value() {
        let mut acc = acc(16);
        acc.push(b"small", 6);
        let first = acc.push(&[b'x'; 40], 47).unwrap();
        assert_eq!(&first.data[..], b"small");

        let second = acc.push(b"tail", 52).unwrap();
        assert_eq!(second.len(), 40);
        assert_eq!(second.value_range(), 1..=1);

        let third = acc.finish(52).unwrap();
        assert_eq!(&third.data[..], b"tail");
        assert_eq!(third.value_range(), 2..=2);
    }

    #[test]
    fn test_chunk_sn_starts_at_configured_value() {
        let mut acc = ChunkAccumulator::new(Bytes::from_static(b"\n"), 16, 100);
        acc.push(b"aaaaaaaaaa", 11);
        let c0 = acc.push(b"bbbbbbbbbb", 22).unwrap();
        let c1 = acc.finish(22).unwrap();
        assert_eq!((c0.sn, c1.sn), (100, 101));
        assert_eq!(acc.chunks_emitted(), 2);
    }

    #[test]
    fn test_chunk_sn_wraps_at_max() {
        let mut acc = ChunkAccumulator::new(Bytes::from_static(b"\n"), 16, u64::MAX);
        acc.push(b"aaaaaaaaaa", 11);
        let c0 = acc.push(b"bbbbbbbbbb", 22).unwrap();
        let c1 = acc.finish(22).unwrap();
        assert_eq!((c0.sn, c1.sn), (u64::MAX, 0));
        assert_eq!(acc.chunks_emitted(), 2);
    }

    #[test]
    fn test_filter_drop_and_replace() {
        let config = SplitConfig::new(",")
            .unwrap()
            .with_value_filter(|value: &[u8]| match value {
                b"banana" => FilterAction::Drop,
                b"pear" => FilterAction::Replace(b"PEAR".to_vec()),
                b"fig" => FilterAction::Replace(Vec::new()),
                _ => FilterAction::Keep,
            });
        let mut acc = ChunkAccumulator::from_config(&config);

        for value in [&b"apple"[..], b"banana", b"pear", b"fig", b"plum"] {
            assert!(acc.push(value, 0).is_none());
        }
        assert_eq!(acc.values_accepted(), 3);

        let chunk = acc.finish(0).unwrap();
        assert_eq!(&chunk.data[..], b"apple,PEAR,plum");
        assert_eq!(chunk.value_range(), 0..=2);
    }

    #[test]
    fn test_multi_byte_delimiter_stripped() {
        let mut acc = ChunkAccumulator::new(Bytes::from_static(b"\r\n"), 64, 0);
        acc.push(b"one", 5);
        acc.push(b"two", 10);
        let chunk = acc.finish(10).unwrap();
        assert_eq!(&chunk.data[..], b"one\r\ntwo");
    }

    #[test]
    fn test_hash_disabled_by_default() {
        let mut acc = acc(16);
        acc.push(b"apple", 5);
        assert!(acc.finish(5).unwrap().hash.is_none());
    }

    #[test]
    #[cfg(feature = "hash-blake3")]
    fn test_hash_enabled() {
        let mut acc = acc(16).with_hash_config(HashConfig::enabled());
        acc.push(b"apple", 5);
        let chunk = acc.finish(5).unwrap();
        assert_eq!(chunk.hash, Some(crate::hash::Blake3Hasher::hash(b"apple")));
    }
}
