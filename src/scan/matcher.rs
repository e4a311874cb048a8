//! Delimiter boundary detection over a growing scratch buffer.

use bytes::Bytes;

use crate::buffer::Buffer;

/// Result of feeding one byte to a [`DelimiterMatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// No boundary yet.
    Pending,
    /// The scratch buffer now ends with the delimiter.
    Boundary,
    /// The scratch buffer reached the scan limit without a boundary.
    Full,
}

/// Accumulates the bytes of one value and detects its terminating delimiter.
///
/// Only the tail of the buffer is inspected per byte: the last delimiter byte
/// is compared first and the full tail slice only on a hit.
#[derive(Debug)]
pub(crate) struct DelimiterMatcher {
    scratch: Buffer,
    delimiter: Bytes,
    last: u8,
    limit: usize,
}

impl DelimiterMatcher {
    /// `delimiter` must be non-empty.
    pub(crate) fn new(delimiter: Bytes, limit: usize) -> Self {
        let last = delimiter[delimiter.len() - 1];
        Self {
            scratch: Buffer::take(limit),
            delimiter,
            last,
            limit,
        }
    }

    /// Feeds one byte.
    #[inline]
    pub(crate) fn update(&mut self, byte: u8) -> Step {
        self.scratch.push(byte);
        let len = self.scratch.len();
        let delim_len = self.delimiter.len();

        if byte == self.last
            && len >= delim_len
            && self.scratch[len - delim_len..] == self.delimiter[..]
        {
            return Step::Boundary;
        }
        if len >= self.limit {
            return Step::Full;
        }
        Step::Pending
    }

    /// Returns the value preceding the delimiter. Only meaningful after [`Step::Boundary`].
    pub(crate) fn value(&self) -> &[u8] {
        &self.scratch[..self.scratch.len() - self.delimiter.len()]
    }

    /// Returns everything accumulated since the last reset.
    pub(crate) fn pending(&self) -> &[u8] {
        &self.scratch
    }

    /// Starts a new value.
    pub(crate) fn reset(&mut self) {
        self.scratch.clear();
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit
    }
}
