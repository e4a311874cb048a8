//! The value scanner - reads one delimiter-terminated value at a time.
//!
//! # Example
//!
//! ```
//! use splitrs::ValueScanner;
//!
//! let mut scanner = ValueScanner::new(&b"apple,pear"[..], ",", 4096)?;
//!
//! let scan = scanner.next_value()?;
//! assert_eq!(scan.value(), b"apple");
//! assert!(!scan.is_end_of_stream());
//!
//! let scan = scanner.next_value()?;
//! assert_eq!(scan.value(), b"pear");
//! assert!(scan.is_end_of_stream());
//! # Ok::<(), splitrs::SplitError>(())
//! ```

use std::io::Read;

use bytes::Bytes;

use super::{BufferedSource, ByteSource, DelimiterMatcher, Step, Throttled};
use crate::config::MIN_VALUE_MAX_SCAN_SIZE;
use crate::error::{Result, SplitError};

/// One scanned value.
///
/// The value borrows the scanner's scratch buffer, so it must be copied if it
/// is needed after the next call to [`ValueScanner::next_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scan<'a> {
    value: &'a [u8],
    end_of_stream: bool,
    scanned_bytes: u64,
}

impl<'a> Scan<'a> {
    pub(crate) fn new(value: &'a [u8], end_of_stream: bool, scanned_bytes: u64) -> Self {
        Self {
            value,
            end_of_stream,
            scanned_bytes,
        }
    }

    /// Returns the value bytes, without the delimiter.
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Returns true if the stream ended while scanning this value.
    ///
    /// The value is then whatever followed the last delimiter, possibly empty.
    pub fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    /// Returns the total number of bytes consumed from the stream so far.
    pub fn scanned_bytes(&self) -> u64 {
        self.scanned_bytes
    }
}

/// Splits a byte stream into delimiter-separated values.
///
/// Bytes are pulled one at a time from a [`ByteSource`] into a scratch buffer
/// capped at the scan limit. A value that reaches the cap without a delimiter
/// is an error; the scanner cannot recover from it.
///
/// End of stream is sticky: once seen, every further call returns an empty
/// end-of-stream [`Scan`] without touching the source.
#[derive(Debug)]
pub struct ValueScanner<S> {
    source: S,
    matcher: DelimiterMatcher,
    scanned: u64,
    finished: bool,
}

impl<R: Read> ValueScanner<BufferedSource<R>> {
    /// Creates a scanner over a reader.
    ///
    /// `max_scan_size` is raised to 4096 if smaller. Returns error if the
    /// delimiter is empty.
    pub fn new(reader: R, delimiter: impl Into<Bytes>, max_scan_size: usize) -> Result<Self> {
        Self::from_source(BufferedSource::new(reader), delimiter, max_scan_size)
    }
}

impl<R: Read> ValueScanner<Throttled<BufferedSource<R>>> {
    /// Creates a scanner over a reader limited to `bytes_per_sec`.
    pub fn throttled(
        reader: R,
        delimiter: impl Into<Bytes>,
        max_scan_size: usize,
        bytes_per_sec: u32,
    ) -> Result<Self> {
        let source = Throttled::new(BufferedSource::new(reader), bytes_per_sec);
        Self::from_source(source, delimiter, max_scan_size)
    }
}

impl<S: ByteSource> ValueScanner<S> {
    /// Creates a scanner over any byte source.
    pub fn from_source(source: S, delimiter: impl Into<Bytes>, max_scan_size: usize) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(SplitError::InvalidConfig {
                message: "delimiter must not be empty",
            });
        }
        let limit = max_scan_size.max(MIN_VALUE_MAX_SCAN_SIZE);

        Ok(Self {
            source,
            matcher: DelimiterMatcher::new(delimiter, limit),
            scanned: 0,
            finished: false,
        })
    }

    /// Reads the next value.
    ///
    /// # Errors
    ///
    /// - [`SplitError::ScanLimitExceeded`] if the scan limit is reached
    ///   without finding a delimiter
    /// - [`SplitError::Io`] for any error from the source
    pub fn next_value(&mut self) -> Result<Scan<'_>> {
        self.matcher.reset();
        if self.finished {
            return Ok(Scan::new(&[], true, self.scanned));
        }

        loop {
            let Some(byte) = self.source.next_byte()? else {
                self.finished = true;
                return Ok(Scan::new(self.matcher.pending(), true, self.scanned));
            };
            self.scanned += 1;

            match self.matcher.update(byte) {
                Step::Pending => {}
                Step::Boundary => return Ok(Scan::new(self.matcher.value(), false, self.scanned)),
                Step::Full => {
                    return Err(SplitError::ScanLimitExceeded {
                        limit: self.matcher.limit(),
                    });
                }
            }
        }
    }

    /// Returns the total number of bytes consumed from the source.
    pub fn scanned_bytes(&self) -> u64 {
        self.scanned
    }

    /// Returns true once end of stream has been reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the bytes read so far for the current value.
    ///
    /// After [`SplitError::ScanLimitExceeded`] this is the full scan buffer.
    /// It is cleared by the next call to [`next_value`](Self::next_value).
    pub fn pending(&self) -> &[u8] {
        self.matcher.pending()
    }

    /// Returns the effective scan limit.
    pub fn scan_limit(&self) -> usize {
        self.matcher.limit()
    }

    /// Unwraps the byte source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn collect<S: ByteSource>(scanner: &mut ValueScanner<S>) -> Vec<Vec<u8>> {
        let mut values = Vec::new();
        loop {
            let scan = scanner.next_value().unwrap();
            values.push(scan.value().to_vec());
            if scan.is_end_of_stream() {
                return values;
            }
        }
    }

    #[test]
    fn test_splits_values() {
        let mut scanner = ValueScanner::new(Cursor::new("a,bb,,ccc"), ",", 0).unwrap();
        let values = collect(&mut scanner);
        assert_eq!(values, vec![b"a".to_vec(), b"bb".to_vec(), vec![], b"ccc".to_vec()]);
        assert_eq!(scanner.scanned_bytes(), 9);
    }

    #[test]
    fn test_trailing_delimiter_gives_empty_final_value() {
        let mut scanner = ValueScanner::new(Cursor::new("x,y,"), ",", 0).unwrap();
        let values = collect(&mut scanner);
        assert_eq!(values, vec![b"x".to_vec(), b"y".to_vec(), vec![]]);
    }

    #[test]
    fn test_empty_stream() {
        let mut scanner = ValueScanner::new(io::empty(), ",", 0).unwrap();
        let scan = scanner.next_value().unwrap();
        assert!(scan.is_end_of_stream());
        assert!(scan.value().is_empty());
        assert_eq!(scan.scanned_bytes(), 0);
    }

    #[test]
    fn test_end_of_stream_is_sticky() {
        let mut scanner = ValueScanner::new(Cursor::new("last"), ",", 0).unwrap();
        assert_eq!(scanner.next_value().unwrap().value(), b"last");
        assert!(scanner.is_finished());

        for _ in 0..3 {
            let scan = scanner.next_value().unwrap();
            assert!(scan.is_end_of_stream());
            assert!(scan.value().is_empty());
            assert_eq!(scan.scanned_bytes(), 4);
        }
    }

    #[test]
    fn test_multi_byte_delimiter_across_read_blocks() {
        let source = BufferedSource::with_capacity(1, Cursor::new("one\r\ntwo\r\nthree"));
        let mut scanner = ValueScanner::from_source(source, "\r\n", 0).unwrap();
        let values = collect(&mut scanner);
        assert_eq!(values, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn test_scan_limit_is_clamped() {
        let scanner = ValueScanner::new(io::empty(), ",", 10).unwrap();
        assert_eq!(scanner.scan_limit(), MIN_VALUE_MAX_SCAN_SIZE);
    }

    #[test]
    fn test_scan_limit_exceeded() {
        let data = vec![b'z'; 5000];
        let mut scanner = ValueScanner::new(Cursor::new(data), ",", 4096).unwrap();
        let err = scanner.next_value().unwrap_err();
        assert!(matches!(err, SplitError::ScanLimitExceeded { limit: 4096 }));
        assert_eq!(scanner.scanned_bytes(), 4096);
        assert_eq!(scanner.pending(), &[b'z'; 4096][..]);
    }

    #[test]
    fn test_value_filling_limit_with_delimiter_is_ok() {
        let mut data = vec![b'z'; 4095];
        data.push(b',');
        let mut scanner = ValueScanner::new(Cursor::new(data), ",", 4096).unwrap();
        assert_eq!(scanner.next_value().unwrap().value().len(), 4095);
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        assert!(ValueScanner::new(io::empty(), "", 0).is_err());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn test_io_error_propagates() {
        let mut scanner = ValueScanner::new(FailingReader, ",", 0).unwrap();
        match scanner.next_value() {
            Err(SplitError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[test]
    fn test_throttled_scanner() {
        let mut scanner = ValueScanner::throttled(Cursor::new("a,b"), ",", 0, 1_000_000).unwrap();
        let values = collect(&mut scanner);
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec()]);
    }
}
