//! splitrs
//!
//! Streaming delimiter splitting into sequenced, size-bounded chunks.
//!
//! `splitrs` reads a byte stream, cuts it into delimiter-separated values and
//! batches consecutive values into chunks no larger than a configured limit.
//! Each completed chunk is handed to a callback together with its sequence
//! numbers. It is designed as a small building block for:
//!
//! - batch writes of log lines or records
//! - batched network sends of message feeds
//! - bounded-memory processing of bulk text
//!
//! The crate intentionally:
//! - does NOT open files or sockets
//! - does NOT spawn threads
//! - does NOT retry failed reads
//! - does NOT interpret encodings (values are raw bytes)
//!
//! It only does one thing: **Read bytes → split values → flush chunks**
//!
//! # Sync
//!
//! ```no_run
//! use std::fs::File;
//! use splitrs::{SplitConfig, SplitError, Splitter};
//!
//! fn main() -> Result<(), SplitError> {
//!     let file = File::open("events.log")?;
//!     let config = SplitConfig::new("\n")?
//!         .with_chunk_size_limit(64 * 1024)
//!         .with_flush_handler(|chunk| {
//!             println!("chunk {} holds values {:?}", chunk.sn, chunk.value_range());
//!         });
//!
//!     let report = Splitter::new(config).run(file)?;
//!     println!("{} chunks", report.chunks);
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use splitrs::{SplitConfig, Splitter};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), splitrs::SplitError> {
//!     let splitter = Splitter::new(SplitConfig::new("\n")?);
//!     splitter.run_async(reader).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod config;
mod error;
mod scan;
mod splitter;

mod buffer; // internal (thread-local reuse)
mod hash; // internal blake3 impl

#[cfg(feature = "async-io")]
mod async_io;

//
// Public surface
//

pub use chunk::{Chunk, ChunkHash, Values};
pub use config::{
    DEFAULT_CHUNK_SIZE_LIMIT, DEFAULT_VALUE_MAX_SCAN_SIZE, FilterAction, FlushHandler, HashConfig,
    MIN_CHUNK_SIZE_LIMIT, MIN_VALUE_MAX_SCAN_SIZE, SplitConfig, ValueFilter,
};
pub use error::{Result, SplitError};
pub use scan::{BufferedSource, ByteSource, Scan, Throttled, ValueScanner};
pub use splitter::{ChunkAccumulator, RunReport, RunState, RunStatus, Splitter};

#[cfg(feature = "async-io")]
pub use async_io::AsyncValueScanner;
