//! Byte-at-a-time input sources.

use std::io::{self, BufRead, BufReader, Read};

/// Default read-ahead for [`BufferedSource`] (8 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// A sequential source of single bytes.
///
/// `Ok(None)` signals end of stream. Implementations may block.
pub trait ByteSource {
    /// Returns the next byte, or `None` at end of stream.
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).next_byte()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).next_byte()
    }
}

/// A [`ByteSource`] over any [`std::io::Read`], reading ahead in blocks.
#[derive(Debug)]
pub struct BufferedSource<R> {
    reader: BufReader<R>,
}

impl<R: Read> BufferedSource<R> {
    /// Wraps a reader with the default read-ahead.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_READ_BUFFER_SIZE, reader)
    }

    /// Wraps a reader with a custom read-ahead.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
        }
    }

    /// Unwraps the reader. Read-ahead bytes not yet consumed are lost.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: Read> ByteSource for BufferedSource<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok([]) => return Ok(None),
                Ok(buf) => {
                    let byte = buf[0];
                    self.reader.consume(1);
                    return Ok(Some(byte));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
