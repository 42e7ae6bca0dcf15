//! Entry points: whole buffers, `i16` arrays, files and generic streams.
//!
//! All of them are thin translators onto one [`Session`]; buffers are still
//! processed chunk by chunk so that every mode shares one code path.

mod frame_reader;

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::codec;
use crate::config::ResampleConfig;
use crate::error::{ResampleError, Result};
use crate::format::{Descriptor, SampleFormat};
use crate::pipeline::Session;

use frame_reader::FrameReader;

/// Totals reported by the streaming entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub frames_in: u64,
    pub frames_out: u64,
    pub bytes_written: u64,
}

/// Resamples a little-endian interleaved buffer. Output has the same format.
pub fn resample_buffer(
    bytes: &[u8],
    format: SampleFormat,
    channels: usize,
    input_rate: u32,
    output_rate: u32,
) -> Result<Vec<u8>> {
    let descriptor = Descriptor::new(channels, input_rate, output_rate, format)?;
    resample_buffer_with(bytes, &descriptor, &ResampleConfig::default())
}

/// Resamples an interleaved buffer described by `descriptor`.
pub fn resample_buffer_with(
    bytes: &[u8],
    descriptor: &Descriptor,
    config: &ResampleConfig,
) -> Result<Vec<u8>> {
    descriptor.frames_in_bytes(bytes.len())?;
    Session::new(*descriptor, config)?.run(bytes)
}

/// Resamples a buffer of little-endian 16-bit samples.
pub fn resample_int16(
    bytes: &[u8],
    channels: usize,
    input_rate: u32,
    output_rate: u32,
) -> Result<Vec<u8>> {
    resample_buffer(bytes, SampleFormat::I16, channels, input_rate, output_rate)
}

/// Resamples interleaved `i16` samples.
pub fn resample_i16(
    samples: &[i16],
    channels: usize,
    input_rate: u32,
    output_rate: u32,
) -> Result<Vec<i16>> {
    let descriptor = Descriptor::new(channels, input_rate, output_rate, SampleFormat::I16)?;
    let mut session = Session::new(descriptor, &ResampleConfig::default())?;

    let input: Vec<f64> = samples.iter().map(|&v| codec::i16_to_f64(v)).collect();
    let out = session.run_samples(&input)?;
    Ok(out.iter().map(|&s| codec::f64_to_i16(s)).collect())
}

/// Resamples a headerless little-endian PCM file into a new file.
///
/// Fails with [`ResampleError::OutputAlreadyExists`] if `output` exists.
pub fn resample_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    format: SampleFormat,
    channels: usize,
    input_rate: u32,
    output_rate: u32,
) -> Result<()> {
    let descriptor = Descriptor::new(channels, input_rate, output_rate, format)?;
    resample_file_with(input, output, &descriptor, &ResampleConfig::default())?;
    Ok(())
}

/// Resamples `input` into a freshly created `output` file.
///
/// The input is opened and its length checked before the output is created,
/// so an unreadable or malformed input leaves no file behind. If resampling
/// fails after writing has started, the truncated output must be discarded.
pub fn resample_file_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    descriptor: &Descriptor,
    config: &ResampleConfig,
) -> Result<StreamStats> {
    let input = input.as_ref();
    let output = output.as_ref();
    config.validate()?;

    let file_in = File::open(input)?;
    let len = file_in.metadata()?.len();
    let frame_bytes = descriptor.frame_bytes() as u64;
    if len % frame_bytes != 0 {
        return Err(ResampleError::MalformedInput {
            len: len as usize,
            unit: frame_bytes as usize,
        });
    }

    let file_out = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ResampleError::OutputAlreadyExists {
                path: output.to_path_buf(),
            },
            _ => ResampleError::Io(e),
        })?;
    debug!(
        "resampling {} ({} bytes) into {}",
        input.display(),
        len,
        output.display()
    );

    resample_stream(
        BufReader::new(file_in),
        BufWriter::new(file_out),
        descriptor,
        config,
    )
}

/// Resamples everything `reader` yields into `writer`.
///
/// Holds at most two input windows of `config.chunk_frames` frames at a
/// time: the one being processed and one read ahead to learn whether it is
/// the last.
pub fn resample_stream<R: Read, W: Write>(
    reader: R,
    mut writer: W,
    descriptor: &Descriptor,
    config: &ResampleConfig,
) -> Result<StreamStats> {
    let mut session = Session::new(*descriptor, config)?;
    let mut reader = FrameReader::new(reader, descriptor.frame_bytes());
    let chunk = config.chunk_frames;

    let mut current = Vec::new();
    let mut next = Vec::new();
    let mut out = Vec::new();
    let mut bytes_written = 0u64;

    reader.read_frames(&mut current, chunk)?;
    loop {
        let is_final = reader.read_frames(&mut next, chunk)? == 0;

        out.clear();
        session.process_bytes_into(&current, is_final, &mut out)?;
        writer.write_all(&out)?;
        bytes_written += out.len() as u64;

        if is_final {
            break;
        }
        std::mem::swap(&mut current, &mut next);
    }
    writer.flush()?;
    debug!(
        "stream done: {} bytes read, {} bytes written",
        reader.consumed(),
        bytes_written
    );

    Ok(StreamStats {
        frames_in: session.frames_consumed(),
        frames_out: session.frames_produced(),
        bytes_written,
    })
}
