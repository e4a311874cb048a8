//! The Chunk type - a sequenced batch of delimited values.

use bytes::Bytes;
use std::fmt;
use std::ops::RangeInclusive;

use super::ChunkHash;

/// A completed chunk with its sequencing metadata.
///
/// The payload holds consecutive accepted values joined by the delimiter,
/// without a trailing delimiter. It is an exclusive copy, so handlers may keep
/// it for as long as they like.
///
/// # Example
///
/// ```
/// use splitrs::Chunk;
/// use bytes::Bytes;
///
/// let chunk = Chunk {
///     sn: 0,
///     start_value_sn: 0,
///     end_value_sn: 2,
///     data: Bytes::from_static(b"apple,pear,peach"),
///     scanned_bytes: 30,
///     hash: None,
/// };
///
/// assert_eq!(chunk.value_count(), 3);
/// assert_eq!(chunk.values(b",").count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk sequence number.
    pub sn: u64,

    /// Sequence number of the first value in this chunk.
    pub start_value_sn: u64,

    /// Sequence number of the last value in this chunk (inclusive).
    pub end_value_sn: u64,

    /// Delimiter-stripped payload.
    pub data: Bytes,

    /// Stream bytes scanned so far when this chunk was completed.
    pub scanned_bytes: u64,

    /// BLAKE3 hash of the payload (if enabled).
    pub hash: Option<ChunkHash>,
}

impl Chunk {
    /// Returns the payload length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a reference to the payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the hash, if computed.
    pub fn hash(&self) -> Option<ChunkHash> {
        self.hash
    }

    /// Returns the inclusive range of value sequence numbers.
    pub fn value_range(&self) -> RangeInclusive<u64> {
        self.start_value_sn..=self.end_value_sn
    }

    /// Returns the number of values in this chunk.
    pub fn value_count(&self) -> u64 {
        self.end_value_sn - self.start_value_sn + 1
    }

    /// Iterates over the values in the payload.
    ///
    /// Values substituted by a filter may themselves contain the delimiter,
    /// in which case they are split further here.
    pub fn values<'a>(&'a self, delimiter: &'a [u8]) -> Values<'a> {
        Values {
            rest: Some(&self.data[..]),
            delimiter,
        }
    }

    /// Consumes the chunk and returns the payload.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk #{} [{}..={}] ({} bytes",
            self.sn,
            self.start_value_sn,
            self.end_value_sn,
            self.len()
        )?;
        if let Some(hash) = self.hash {
            write!(f, ", hash={}", hash)?;
        }
        write!(f, ")")
    }
}

/// Iterator over the values of a chunk payload, see [`Chunk::values`].
#[derive(Debug, Clone)]
pub struct Values<'a> {
    rest: Option<&'a [u8]>,
    delimiter: &'a [u8],
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        if rest.is_empty() {
            self.rest = None;
            return None;
        }
        let found = if self.delimiter.is_empty() {
            None
        } else {
            rest.windows(self.delimiter.len())
                .position(|window| window == self.delimiter)
        };
        match found {
            Some(pos) => {
                self.rest = Some(&rest[pos + self.delimiter.len()..]);
                Some(&rest[..pos])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}
