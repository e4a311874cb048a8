//! Internal buffer management.
//!
//! This module provides a thread-local pool of byte buffers so that the
//! scan scratch space and chunk accumulation buffer of short-lived splitters
//! are reused instead of reallocated. It is an implementation detail and not
//! part of the public API.

mod pool;

pub(crate) use pool::Buffer;
