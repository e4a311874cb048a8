//! Thread-local buffer pool for memory reuse across splitters.

use std::cell::RefCell;
use std::ops::Deref;

/// Buffers larger than this are freed instead of pooled.
pub const MAX_POOLED_CAPACITY: usize = 1024 * 1024; // 1 MiB

/// Maximum number of buffers to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// A reusable, growable byte buffer.
#[derive(Debug)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Takes a buffer from the thread-local pool, reserving at least `capacity` bytes.
    pub fn take(capacity: usize) -> Self {
        let mut data = THREAD_BUFFER_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_default();
        data.reserve(capacity);
        Self { data }
    }

    /// Clears the buffer without deallocating.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Appends one byte.
    pub fn push(&mut self, byte: u8) {
        self.data.push(byte);
    }

    /// Appends a slice.
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.data.capacity()
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.data.capacity() <= MAX_POOLED_CAPACITY {
            self.data.clear();
            let data = std::mem::take(&mut self.data);
            // The pool may already be gone during thread teardown.
            let _ = THREAD_BUFFER_POOL.try_with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(data);
                }
            });
        }
    }
}

thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_take() {
        let buf = Buffer::take(4096);
        assert!(buf.capacity() >= 4096);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_buffer_extend_and_clear() {
        let mut buf = Buffer::take(64);
        buf.extend_from_slice(b"apple,");
        buf.push(b'p');
        assert_eq!(&buf[..], b"apple,p");

        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 64);
    }

    #[test]
    fn test_buffer_reuse() {
        {
            let mut buf = Buffer::take(8192);
            buf.extend_from_slice(b"leftover");
        }

        let buf = Buffer::take(16);
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 8192);
    }
}
