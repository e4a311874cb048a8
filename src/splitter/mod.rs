//! Chunk accumulation and the run driver.
//!
//! - [`ChunkAccumulator`] - Batches values into size-bounded, sequenced chunks
//! - [`Splitter`] - Runs scanner and accumulator over a stream exactly once

mod accumulator;
mod engine;

pub use accumulator::ChunkAccumulator;
pub use engine::{RunReport, RunState, RunStatus, Splitter};

pub(crate) use engine::RunLoop;
