//! The run driver - Splitter with a one-shot `run()` and cooperative stop.
//!
//! A [`Splitter`] pulls values from a [`ValueScanner`], feeds them to a
//! [`ChunkAccumulator`] and hands every completed chunk to the flush handler
//! on the calling thread. It runs exactly once.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use splitrs::{FilterAction, RunStatus, SplitConfig, Splitter};
//!
//! let chunks = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&chunks);
//!
//! let config = SplitConfig::new(",")?
//!     .with_chunk_size_limit(16)
//!     .with_value_filter(|v: &[u8]| {
//!         if v == b"banana" { FilterAction::Drop } else { FilterAction::Keep }
//!     })
//!     .with_flush_handler(move |chunk| sink.lock().unwrap().push(chunk));
//!
//! let splitter = Splitter::new(config);
//! let report = splitter.run(&b"apple,banana,pear,peach,cherry"[..])?;
//! assert_eq!(report.status, RunStatus::Completed);
//!
//! let chunks = chunks.lock().unwrap();
//! assert_eq!(&chunks[0].data[..], b"apple,pear,peach");
//! assert_eq!(&chunks[1].data[..], b"cherry");
//! # Ok::<(), splitrs::SplitError>(())
//! ```

use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::chunk::Chunk;
use crate::config::SplitConfig;
use crate::error::{Result, SplitError};
use crate::scan::{BufferedSource, ByteSource, Scan, Throttled, ValueScanner};

use super::ChunkAccumulator;

/// Lifecycle of a [`Splitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    /// `run` has not been called yet.
    Idle = 0,
    /// A run is in progress.
    Running = 1,
    /// The run has ended, successfully or not.
    Finished = 2,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RunState::Idle,
            1 => RunState::Running,
            _ => RunState::Finished,
        }
    }
}

/// How a run that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The stream was consumed to the end and the last chunk flushed.
    Completed,
    /// A stop was requested. Buffered values that were not yet flushed are dropped.
    Stopped,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// How the run ended.
    pub status: RunStatus,
    /// Number of chunks delivered to the flush handler.
    pub chunks: u64,
    /// Number of accepted values, including any dropped by a stop.
    pub values: u64,
    /// Number of bytes consumed from the stream.
    pub scanned_bytes: u64,
}

/// Splits a stream into sequenced chunks and delivers them to a handler.
///
/// A splitter is built once, run once, and then discarded. It is `Sync`, so
/// it can be shared behind an [`Arc`](std::sync::Arc) to request a stop from
/// another thread while [`run`](Splitter::run) blocks.
///
/// # Stopping
///
/// [`request_stop`](Splitter::request_stop) is observed before each value is
/// read. A value already being scanned is read to its end first, and blocking
/// reads are not interrupted. A stopped run does not flush its partial chunk.
pub struct Splitter {
    config: SplitConfig,
    state: AtomicU8,
    stop_requested: AtomicBool,
}

impl Splitter {
    /// Creates a splitter.
    pub fn new(config: SplitConfig) -> Self {
        if config.is_clamped() {
            log::debug!(
                "split limits raised to minimum: chunk_size_limit={} value_max_scan_size={}",
                config.chunk_size_limit(),
                config.value_max_scan_size()
            );
        }
        Self {
            config,
            state: AtomicU8::new(RunState::Idle as u8),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Asks a running (or future) run to stop at the next value boundary.
    ///
    /// Idempotent; may be called from any thread at any time.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Returns true once a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Consumes `reader` to the end, delivering chunks to the flush handler.
    ///
    /// # Errors
    ///
    /// - [`SplitError::AlreadyStarted`] if this splitter has run before or is
    ///   running on another thread; nothing is read in that case
    /// - [`SplitError::ScanLimitExceeded`] if a value outgrows the scan limit
    /// - [`SplitError::Io`] if reading fails
    ///
    /// On error the chunk under construction is not flushed.
    pub fn run<R: Read>(&self, reader: R) -> Result<RunReport> {
        self.begin()?;

        let delimiter = self.config.delimiter().clone();
        let max_scan = self.config.value_max_scan_size();
        let result = match self.config.rate_limit() {
            Some(rate) => {
                let source = Throttled::new(BufferedSource::new(reader), rate);
                ValueScanner::from_source(source, delimiter, max_scan).and_then(|s| self.drive(s))
            }
            None => ValueScanner::new(reader, delimiter, max_scan).and_then(|s| self.drive(s)),
        };

        self.end(result)
    }

    fn drive<S: ByteSource>(&self, mut scanner: ValueScanner<S>) -> Result<RunReport> {
        let mut run = RunLoop::new(self);
        loop {
            if let Some(report) = run.check_stop() {
                return Ok(report);
            }
            let scan = scanner.next_value()?;
            if let Some(report) = run.accept(scan) {
                return Ok(report);
            }
        }
    }

    pub(crate) fn begin(&self) -> Result<()> {
        self.state
            .compare_exchange(
                RunState::Idle as u8,
                RunState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| SplitError::AlreadyStarted)?;

        log::debug!(
            "split run started: delimiter={:?} chunk_size_limit={} value_max_scan_size={}",
            self.config.delimiter(),
            self.config.chunk_size_limit(),
            self.config.value_max_scan_size()
        );
        Ok(())
    }

    pub(crate) fn end(&self, result: Result<RunReport>) -> Result<RunReport> {
        self.state.store(RunState::Finished as u8, Ordering::Release);
        match &result {
            Ok(report) => log::debug!(
                "split run finished: status={:?} chunks={} values={} scanned_bytes={}",
                report.status,
                report.chunks,
                report.values,
                report.scanned_bytes
            ),
            Err(e) => log::warn!("split run aborted: {}", e),
        }
        result
    }

    /// Marks a run that ended without reaching [`end`](Self::end) as finished.
    pub(crate) fn abandon(&self) {
        if self
            .state
            .compare_exchange(
                RunState::Running as u8,
                RunState::Finished as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            log::warn!("split run abandoned before completion");
        }
    }

    fn deliver(&self, chunk: Chunk) {
        log::trace!(
            "flushing chunk {} (values {}..={}, {} bytes)",
            chunk.sn,
            chunk.start_value_sn,
            chunk.end_value_sn,
            chunk.len()
        );
        match self.config.flush_handler() {
            Some(handler) => handler(chunk),
            None => print_chunk(chunk),
        }
    }
}

impl std::fmt::Debug for Splitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Splitter")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("stop_requested", &self.is_stop_requested())
            .finish()
    }
}

/// Default flush handler: `chunk_sn start_value_sn end_value_sn payload`.
fn print_chunk(chunk: Chunk) {
    println!(
        "{} {} {} {}",
        chunk.sn,
        chunk.start_value_sn,
        chunk.end_value_sn,
        String::from_utf8_lossy(&chunk.data)
    );
}

/// Per-run state shared by the blocking and async drivers.
pub(crate) struct RunLoop<'s> {
    splitter: &'s Splitter,
    acc: ChunkAccumulator,
    scanned_bytes: u64,
}

impl<'s> RunLoop<'s> {
    pub(crate) fn new(splitter: &'s Splitter) -> Self {
        Self {
            splitter,
            acc: ChunkAccumulator::from_config(&splitter.config),
            scanned_bytes: 0,
        }
    }

    /// Returns a report if a stop was requested.
    pub(crate) fn check_stop(&self) -> Option<RunReport> {
        if !self.splitter.is_stop_requested() {
            return None;
        }
        if self.acc.pending_len() > 0 {
            log::debug!(
                "stop requested, dropping {} unflushed bytes",
                self.acc.pending_len()
            );
        }
        Some(self.report(RunStatus::Stopped))
    }

    /// Processes one scanned value. Returns a report once the stream has ended.
    pub(crate) fn accept(&mut self, scan: Scan<'_>) -> Option<RunReport> {
        self.scanned_bytes = scan.scanned_bytes();

        if let Some(chunk) = self.acc.push(scan.value(), self.scanned_bytes) {
            self.splitter.deliver(chunk);
        }
        if !scan.is_end_of_stream() {
            return None;
        }
        if let Some(chunk) = self.acc.finish(self.scanned_bytes) {
            self.splitter.deliver(chunk);
        }
        Some(self.report(RunStatus::Completed))
    }

    fn report(&self, status: RunStatus) -> RunReport {
        RunReport {
            status,
            chunks: self.acc.chunks_emitted(),
            values: self.acc.values_accepted(),
            scanned_bytes: self.scanned_bytes,
        }
    }
}
