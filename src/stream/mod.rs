//! Pipe-style byte transforms
//!
//! Transport compression runs on a producer thread per stream, connected to
//! the consumer through a bounded channel so the slowest stage sets the pace.

pub mod compress;
pub mod pipe;

pub use compress::{compress, decompress};
pub use pipe::{pipe, spawn_producer, PipeReader, PipeWriter};
