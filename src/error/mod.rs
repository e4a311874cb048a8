//! Error types for splitrs.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = SplitError> = std::result::Result<T, E>;

/// Errors that can occur while configuring or running a split.
#[derive(Debug, Error)]
pub enum SplitError {
    /// An I/O error occurred while reading the input stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// `run` was called on a splitter that has already been started.
    #[error("splitter already started")]
    AlreadyStarted,

    /// A single value grew to the scan limit without a delimiter in sight.
    #[error("value exceeded scan limit of {limit} bytes without a delimiter")]
    ScanLimitExceeded {
        /// The effective scan limit in bytes.
        limit: usize,
    },
}

impl SplitError {
    /// Returns true if this error came from the underlying stream.
    pub fn is_io(&self) -> bool {
        matches!(self, SplitError::Io(_))
    }
}
