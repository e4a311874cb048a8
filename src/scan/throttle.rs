//! Rate limiting for byte sources.
//!
//! A token bucket refilled at `rate` tokens per second with a burst of
//! `max(rate / 10, 1)`. Each byte read costs one token; when the bucket is
//! empty the reading thread sleeps until the next token is due.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use super::ByteSource;

#[derive(Debug)]
struct TokenBucket {
    rate: f64,
    burst: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(bytes_per_sec: u32) -> Self {
        let rate = f64::from(bytes_per_sec.max(1));
        let burst = (bytes_per_sec / 10).max(1) as f64;
        Self {
            rate,
            burst,
            tokens: burst,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.burst);
        self.last_refill = now;
    }

    /// Blocks until one token is available and takes it.
    fn acquire(&mut self) {
        self.refill(Instant::now());
        if self.tokens < 1.0 {
            let wait = Duration::from_secs_f64((1.0 - self.tokens) / self.rate);
            thread::sleep(wait);
            self.refill(Instant::now());
        }
        // Sleep may undershoot by a hair; never go negative by more than that.
        self.tokens = (self.tokens - 1.0).max(0.0);
    }
}

/// A [`ByteSource`] decorator that limits throughput to a fixed byte rate.
///
/// # Example
///
/// ```
/// use splitrs::{BufferedSource, Throttled, ValueScanner};
///
/// let source = Throttled::new(BufferedSource::new(&b"a,b"[..]), 1_000_000);
/// let mut scanner = ValueScanner::from_source(source, ",", 4096)?;
/// assert_eq!(scanner.next_value()?.value(), b"a");
/// # Ok::<(), splitrs::SplitError>(())
/// ```
#[derive(Debug)]
pub struct Throttled<S> {
    inner: S,
    bucket: TokenBucket,
}

impl<S: ByteSource> Throttled<S> {
    /// Limits `inner` to `bytes_per_sec`. A rate of zero is treated as one.
    pub fn new(inner: S, bytes_per_sec: u32) -> Self {
        Self {
            inner,
            bucket: TokenBucket::new(bytes_per_sec),
        }
    }

    /// Unwraps the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ByteSource> ByteSource for Throttled<S> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        self.bucket.acquire();
        self.inner.next_byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::BufferedSource;

    #[test]
    fn test_burst() {
        assert_eq!(TokenBucket::new(1000).burst, 100.0);
        assert_eq!(TokenBucket::new(5).burst, 1.0);
        assert_eq!(TokenBucket::new(0).rate, 1.0);
    }

    #[test]
    fn test_burst_is_not_delayed() {
        let data = vec![b'x'; 50];
        let mut source = Throttled::new(BufferedSource::new(&data[..]), 1000);

        let start = Instant::now();
        for _ in 0..50 {
            source.next_byte().unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(40));
    }

    #[test]
    fn test_rate_is_enforced() {
        // Burst of 100 at 1000 B/s, so the remaining 50 bytes need ~50ms.
        let data = vec![b'x'; 150];
        let mut source = Throttled::new(BufferedSource::new(&data[..]), 1000);

        let start = Instant::now();
        let mut count = 0;
        while source.next_byte().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 150);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
