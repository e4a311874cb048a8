//! Async splitting support.
//!
//! This module runs the same scan/accumulate state machine over
//! `futures_io::AsyncRead`, so it works with tokio (through
//! `tokio_util::compat`), async-std, smol and other runtimes.
//!
//! - [`AsyncValueScanner`] - Async counterpart of [`ValueScanner`](crate::ValueScanner)
//! - [`Splitter::run_async`](crate::Splitter::run_async) - Async counterpart of `run`
//!
//! This module requires the `async-io` feature to be enabled.

mod run;
mod scanner;

pub use scanner::AsyncValueScanner;
