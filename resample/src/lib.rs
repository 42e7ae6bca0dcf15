//! Sample rate conversion for interleaved linear PCM.
//!
//! This crate provides:
//!
//! - `codec`: raw bytes ↔ normalized samples for I16, F32 and F64
//! - `kernel`: windowed-sinc polyphase resampling of one channel
//! - `coordinator`: per-channel kernels driven in lockstep
//! - `pipeline`: chunked sessions with exact frame accounting
//! - `io`: buffer, `i16` array, file and stream entry points
//!
//! The output of a resampling run always holds exactly
//! `floor(input_frames * output_rate / input_rate)` frames, and splitting the
//! input into chunks never changes a single output bit.
//!
//! # Example
//!
//! ```rust
//! use giztoy_resample::{resample_buffer, SampleFormat};
//!
//! // 100ms of 44.1kHz stereo silence.
//! let input = vec![0u8; 4410 * 2 * 2];
//! let output = resample_buffer(&input, SampleFormat::I16, 2, 44100, 16000).unwrap();
//! assert_eq!(output.len(), 1600 * 2 * 2);
//! ```

pub mod codec;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod io;
pub mod kernel;
pub mod pipeline;

pub use config::{KernelConfig, Quality, ResampleConfig, Window};
pub use error::{ResampleError, Result};
pub use format::{ByteOrder, Descriptor, SampleFormat};
pub use io::{
    StreamStats, resample_buffer, resample_buffer_with, resample_file, resample_file_with,
    resample_i16, resample_int16, resample_stream,
};
pub use pipeline::{ChunkPlan, ChunkSpan, Session};
