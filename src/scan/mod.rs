//! Value scanning: turning a byte stream into delimiter-separated values.
//!
//! - [`ValueScanner`] - Pulls bytes one at a time and yields the next value
//! - [`Scan`] - One scanned value, borrowed from the scanner
//! - [`ByteSource`] - Byte-at-a-time input, with [`BufferedSource`] over any reader
//! - [`Throttled`] - Rate-limiting decorator for any [`ByteSource`]

mod matcher;
mod scanner;
mod source;
mod throttle;

pub(crate) use matcher::{DelimiterMatcher, Step};
pub use scanner::{Scan, ValueScanner};
pub use source::{BufferedSource, ByteSource};
pub use throttle::Throttled;
