//! Configuration for splitting behavior.
//!
//! This module provides the types that control how a stream is split:
//!
//! - [`SplitConfig`] - Delimiter, size limits, callbacks and sequencing
//! - [`HashConfig`] - Specifies whether to hash chunk payloads
//! - [`FilterAction`] - What a value filter decides for one value
//!
//! # Example
//!
//! ```
//! use splitrs::{FilterAction, SplitConfig};
//!
//! let config = SplitConfig::new(",")?
//!     .with_chunk_size_limit(1024)
//!     .with_value_filter(|value: &[u8]| {
//!         if value.starts_with(b"#") {
//!             FilterAction::Drop
//!         } else {
//!             FilterAction::Keep
//!         }
//!     });
//!
//! assert_eq!(config.chunk_size_limit(), 1024);
//! # Ok::<(), splitrs::SplitError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::chunk::Chunk;
use crate::error::{Result, SplitError};

/// Smallest chunk size limit a splitter will use (16 bytes).
pub const MIN_CHUNK_SIZE_LIMIT: usize = 16;

/// Smallest per-value scan limit a scanner will use (4 KiB).
pub const MIN_VALUE_MAX_SCAN_SIZE: usize = 4 * 1024;

/// Default chunk size limit (4 KiB).
pub const DEFAULT_CHUNK_SIZE_LIMIT: usize = 4 * 1024;

/// Default per-value scan limit (4 KiB).
pub const DEFAULT_VALUE_MAX_SCAN_SIZE: usize = MIN_VALUE_MAX_SCAN_SIZE;

/// Callback invoked once per completed chunk.
pub type FlushHandler = Arc<dyn Fn(Chunk) + Send + Sync>;

/// Callback deciding what happens to each scanned value.
pub type ValueFilter = Arc<dyn Fn(&[u8]) -> FilterAction + Send + Sync>;

/// Outcome of a value filter.
///
/// A `Replace` with an empty vector is treated the same as `Drop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Accept the value unchanged.
    Keep,
    /// Reject the value. It consumes no sequence number.
    Drop,
    /// Accept a replacement in place of the value.
    Replace(Vec<u8>),
}

/// Configuration for a [`Splitter`](crate::Splitter).
///
/// Limits below their minimum are silently raised: the chunk size limit to
/// [`MIN_CHUNK_SIZE_LIMIT`] and the value scan limit to
/// [`MIN_VALUE_MAX_SCAN_SIZE`]. The accessors report the effective values.
///
/// The chunk size limit is soft. A chunk never grows past it by appending a
/// value, but a single value longer than the limit still becomes its own
/// chunk.
#[derive(Clone)]
pub struct SplitConfig {
    delimiter: Bytes,
    chunk_size_limit: usize,
    value_max_scan_size: usize,
    start_chunk_sn: u64,
    rate_limit: u32,
    hash_config: HashConfig,
    flush_handler: Option<FlushHandler>,
    value_filter: Option<ValueFilter>,
}

impl SplitConfig {
    /// Creates a configuration for the given delimiter.
    ///
    /// Returns error if the delimiter is empty.
    pub fn new(delimiter: impl Into<Bytes>) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(SplitError::InvalidConfig {
                message: "delimiter must not be empty",
            });
        }

        Ok(Self {
            delimiter,
            chunk_size_limit: DEFAULT_CHUNK_SIZE_LIMIT,
            value_max_scan_size: DEFAULT_VALUE_MAX_SCAN_SIZE,
            start_chunk_sn: 0,
            rate_limit: 0,
            hash_config: HashConfig::default(),
            flush_handler: None,
            value_filter: None,
        })
    }

    /// Sets the soft upper bound on chunk payload size.
    pub fn with_chunk_size_limit(mut self, limit: usize) -> Self {
        self.chunk_size_limit = limit;
        self
    }

    /// Sets the hard cap on bytes scanned while looking for one delimiter.
    pub fn with_value_max_scan_size(mut self, limit: usize) -> Self {
        self.value_max_scan_size = limit;
        self
    }

    /// Sets the sequence number of the first emitted chunk.
    ///
    /// Chunk sequence numbers wrap around after `u64::MAX`.
    pub fn with_start_chunk_sn(mut self, sn: u64) -> Self {
        self.start_chunk_sn = sn;
        self
    }

    /// Limits reads from the input to `bytes_per_sec`. Zero disables the limit.
    pub fn with_rate_limit(mut self, bytes_per_sec: u32) -> Self {
        self.rate_limit = bytes_per_sec;
        self
    }

    /// Sets the hash configuration.
    pub fn with_hash_config(mut self, config: HashConfig) -> Self {
        self.hash_config = config;
        self
    }

    /// Sets the callback that receives each completed chunk.
    pub fn with_flush_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Chunk) + Send + Sync + 'static,
    {
        self.flush_handler = Some(Arc::new(handler));
        self
    }

    /// Sets the filter applied to every non-empty value.
    pub fn with_value_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&[u8]) -> FilterAction + Send + Sync + 'static,
    {
        self.value_filter = Some(Arc::new(filter));
        self
    }

    /// Returns the delimiter.
    pub fn delimiter(&self) -> &Bytes {
        &self.delimiter
    }

    /// Returns the effective chunk size limit.
    pub fn chunk_size_limit(&self) -> usize {
        self.chunk_size_limit.max(MIN_CHUNK_SIZE_LIMIT)
    }

    /// Returns the effective per-value scan limit.
    pub fn value_max_scan_size(&self) -> usize {
        self.value_max_scan_size.max(MIN_VALUE_MAX_SCAN_SIZE)
    }

    /// Returns the sequence number of the first chunk.
    pub fn start_chunk_sn(&self) -> u64 {
        self.start_chunk_sn
    }

    /// Returns the read rate limit in bytes per second, if any.
    pub fn rate_limit(&self) -> Option<u32> {
        (self.rate_limit > 0).then_some(self.rate_limit)
    }

    /// Returns the hash configuration.
    pub fn hash_config(&self) -> &HashConfig {
        &self.hash_config
    }

    /// Returns true if a configured limit was below its minimum.
    pub fn is_clamped(&self) -> bool {
        self.chunk_size_limit < MIN_CHUNK_SIZE_LIMIT
            || self.value_max_scan_size < MIN_VALUE_MAX_SCAN_SIZE
    }

    pub(crate) fn flush_handler(&self) -> Option<&FlushHandler> {
        self.flush_handler.as_ref()
    }

    pub(crate) fn value_filter(&self) -> Option<&ValueFilter> {
        self.value_filter.as_ref()
    }
}

impl fmt::Debug for SplitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitConfig")
            .field("delimiter", &self.delimiter)
            .field("chunk_size_limit", &self.chunk_size_limit)
            .field("value_max_scan_size", &self.value_max_scan_size)
            .field("start_chunk_sn", &self.start_chunk_sn)
            .field("rate_limit", &self.rate_limit)
            .field("hash_config", &self.hash_config)
            .field("flush_handler", &self.flush_handler.is_some())
            .field("value_filter", &self.value_filter.is_some())
            .finish()
    }
}

/// Configuration for chunk payload hashing.
///
/// Controls whether a BLAKE3 hash is attached to each emitted chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HashConfig {
    /// Whether to compute BLAKE3 hashes.
    pub enabled: bool,
}

impl HashConfig {
    /// Enables hashing.
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Disables hashing.
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_delimiter_rejected() {
        let err = SplitConfig::new(Bytes::new()).unwrap_err();
        assert!(matches!(err, SplitError::InvalidConfig { .. }));
        assert!(SplitConfig::new("").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = SplitConfig::new("\n").unwrap();
        assert_eq!(config.delimiter().as_ref(), b"\n");
        assert_eq!(config.chunk_size_limit(), DEFAULT_CHUNK_SIZE_LIMIT);
        assert_eq!(config.value_max_scan_size(), DEFAULT_VALUE_MAX_SCAN_SIZE);
        assert_eq!(config.start_chunk_sn(), 0);
        assert_eq!(config.rate_limit(), None);
        assert!(!config.hash_config().enabled);
        assert!(config.flush_handler().is_none());
        assert!(config.value_filter().is_none());
        assert!(!config.is_clamped());
    }

    #[test]
    fn test_limits_are_clamped() {
        let config = SplitConfig::new(",")
            .unwrap()
            .with_chunk_size_limit(3)
            .with_value_max_scan_size(100);
        assert_eq!(config.chunk_size_limit(), MIN_CHUNK_SIZE_LIMIT);
        assert_eq!(config.value_max_scan_size(), MIN_VALUE_MAX_SCAN_SIZE);
        assert!(config.is_clamped());
    }

    #[test]
    fn test_builder() {
        let config = SplitConfig::new(&b"\r\n"[..])
            .unwrap()
            .with_chunk_size_limit(64 * 1024)
            .with_value_max_scan_size(1 << 20)
            .with_start_chunk_sn(7)
            .with_rate_limit(1000)
            .with_hash_config(HashConfig::enabled())
            .with_flush_handler(|_chunk| {})
            .with_value_filter(|_value: &[u8]| FilterAction::Keep);

        assert_eq!(config.chunk_size_limit(), 64 * 1024);
        assert_eq!(config.value_max_scan_size(), 1 << 20);
        assert_eq!(config.start_chunk_sn(), 7);
        assert_eq!(config.rate_limit(), Some(1000));
        assert!(config.hash_config().enabled);
        assert!(config.flush_handler().is_some());
        assert!(config.value_filter().is_some());
    }

    #[test]
    fn test_zero_rate_limit_is_unlimited() {
        let config = SplitConfig::new(",").unwrap().with_rate_limit(0);
        assert_eq!(config.rate_limit(), None);
    }

    #[test]
    fn test_debug_hides_callbacks() {
        let config = SplitConfig::new(",")
            .unwrap()
            .with_flush_handler(|_chunk| {});
        let s = format!("{:?}", config);
        assert!(s.contains("flush_handler: true"));
        assert!(s.contains("value_filter: false"));
    }

    #[test]
    fn test_hash_config() {
        assert!(!HashConfig::default().enabled);
        assert!(HashConfig::enabled().enabled);
        assert!(!HashConfig::disabled().enabled);
    }
}
