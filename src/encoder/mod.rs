//! Encoder sinks
//!
//! Implementations of [`EncoderSink`](crate::recorder::EncoderSink) for an
//! FFmpeg child process and for memory, plus the PNG sequence writer used by
//! local recordings.

pub mod ffmpeg;
pub mod memory;
pub mod sequence;

pub use ffmpeg::{FfmpegOpener, FfmpegPipeSink};
pub use memory::{MemoryOpener, MemorySink};
pub use sequence::SequenceWriter;
