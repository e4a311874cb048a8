//! Async value scanner.

use std::future::poll_fn;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_io::AsyncRead;

use crate::config::MIN_VALUE_MAX_SCAN_SIZE;
use crate::error::{Result, SplitError};
use crate::scan::{DelimiterMatcher, Scan, Step};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Splits an async byte stream into delimiter-separated values.
///
/// Same contract as [`ValueScanner`](crate::ValueScanner): a scan limit of at
/// least 4096 bytes, sticky end of stream, and values borrowed until the next
/// call.
///
/// # Example
///
/// ```ignore
/// use splitrs::AsyncValueScanner;
///
/// async fn first_line<R: futures_io::AsyncRead + Unpin>(reader: R) -> splitrs::Result<Vec<u8>> {
///     let mut scanner = AsyncValueScanner::new(reader, "\n", 4096)?;
///     Ok(scanner.next_value().await?.value().to_vec())
/// }
/// ```
#[derive(Debug)]
pub struct AsyncValueScanner<R> {
    reader: R,
    read_buf: Box<[u8]>,
    pos: usize,
    filled: usize,
    matcher: DelimiterMatcher,
    scanned: u64,
    finished: bool,
}

impl<R: AsyncRead + Unpin> AsyncValueScanner<R> {
    /// Creates a scanner over an async reader.
    ///
    /// Returns error if the delimiter is empty.
    pub fn new(reader: R, delimiter: impl Into<Bytes>, max_scan_size: usize) -> Result<Self> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(SplitError::InvalidConfig {
                message: "delimiter must not be empty",
            });
        }
        let limit = max_scan_size.max(MIN_VALUE_MAX_SCAN_SIZE);

        Ok(Self {
            reader,
            read_buf: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            pos: 0,
            filled: 0,
            matcher: DelimiterMatcher::new(delimiter, limit),
            scanned: 0,
            finished: false,
        })
    }

    /// Reads the next value.
    pub async fn next_value(&mut self) -> Result<Scan<'_>> {
        self.matcher.reset();
        if self.finished {
            return Ok(Scan::new(&[], true, self.scanned));
        }

        loop {
            let Some(byte) = self.next_byte().await? else {
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

    /// Returns the total number of bytes consumed from the reader.
    pub fn scanned_bytes(&self) -> u64 {
        self.scanned
    }

    /// Returns true once end of stream has been reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the bytes read so far for the current value, see
    /// [`ValueScanner::pending`](crate::ValueScanner::pending).
    pub fn pending(&self) -> &[u8] {
        self.matcher.pending()
    }

    async fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos == self.filled {
            let n = loop {
                let read = poll_fn(|cx| Pin::new(&mut self.reader).poll_read(cx, &mut self.read_buf));
                match read.await {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            };
            if n == 0 {
                return Ok(None);
            }
            self.pos = 0;
            self.filled = n;
        }
        let byte = self.read_buf[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }
}
