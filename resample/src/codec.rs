//! Conversion between raw PCM bytes and normalized `f64` samples.
//!
//! I16 samples are scaled into [-1, 1) on decode and saturated on encode.
//! Float samples are only (un)packed; their values are never rescaled.

use crate::error::{ResampleError, Result};
use crate::format::{ByteOrder, SampleFormat};

const I16_SCALE: f64 = 32768.0;

/// Decodes `bytes` into normalized samples.
///
/// Fails with [`ResampleError::MalformedInput`] if `bytes` ends with a
/// partial sample.
pub fn decode(bytes: &[u8], format: SampleFormat, order: ByteOrder) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    decode_into(bytes, format, order, &mut out)?;
    Ok(out)
}

/// Like [`decode`], but appends to `out`.
pub fn decode_into(
    bytes: &[u8],
    format: SampleFormat,
    order: ByteOrder,
    out: &mut Vec<f64>,
) -> Result<()> {
    let width = format.byte_width();
    if bytes.len() % width != 0 {
        return Err(ResampleError::MalformedInput {
            len: bytes.len(),
            unit: width,
        });
    }
    out.reserve(bytes.len() / width);

    match format {
        SampleFormat::I16 => {
            for b in bytes.chunks_exact(2) {
                let raw = [b[0], b[1]];
                let v = match order {
                    ByteOrder::Little => i16::from_le_bytes(raw),
                    ByteOrder::Big => i16::from_be_bytes(raw),
                };
                out.push(v as f64 / I16_SCALE);
            }
        }
        SampleFormat::F32 => {
            for b in bytes.chunks_exact(4) {
                let raw = [b[0], b[1], b[2], b[3]];
                let v = match order {
                    ByteOrder::Little => f32::from_le_bytes(raw),
                    ByteOrder::Big => f32::from_be_bytes(raw),
                };
                out.push(v as f64);
            }
        }
        SampleFormat::F64 => {
            for b in bytes.chunks_exact(8) {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(b);
                let v = match order {
                    ByteOrder::Little => f64::from_le_bytes(raw),
                    ByteOrder::Big => f64::from_be_bytes(raw),
                };
                out.push(v);
            }
        }
    }
    Ok(())
}

/// Encodes normalized samples into raw bytes.
pub fn encode(samples: &[f64], format: SampleFormat, order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(samples, format, order, &mut out);
    out
}

/// Like [`encode`], but appends to `out`.
pub fn encode_into(samples: &[f64], format: SampleFormat, order: ByteOrder, out: &mut Vec<u8>) {
    out.reserve(samples.len() * format.byte_width());

    match format {
        SampleFormat::I16 => {
            for &s in samples {
                let v = f64_to_i16(s);
                match order {
                    ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
                    ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
                }
            }
        }
        SampleFormat::F32 => {
            for &s in samples {
                let v = f64_to_f32(s);
                match order {
                    ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
                    ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
                }
            }
        }
        SampleFormat::F64 => {
            for &s in samples {
                match order {
                    ByteOrder::Little => out.extend_from_slice(&s.to_le_bytes()),
                    ByteOrder::Big => out.extend_from_slice(&s.to_be_bytes()),
                }
            }
        }
    }
}

/// Scales a normalized sample to i16, rounding and saturating.
#[inline]
pub(crate) fn f64_to_i16(s: f64) -> i16 {
    // `as` saturates and maps NaN to 0.
    (s * I16_SCALE).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[inline]
pub(crate) fn i16_to_f64(v: i16) -> f64 {
    v as f64 / I16_SCALE
}

#[inline]
fn f64_to_f32(s: f64) -> f32 {
    if s.is_nan() {
        return f32::NAN;
    }
    s.clamp(f32::MIN as f64, f32::MAX as f64) as f32
}

/// Splits interleaved samples into one buffer per channel.
pub fn deinterleave(samples: &[f64], channels: usize) -> Result<Vec<Vec<f64>>> {
    if channels == 0 {
        return Err(ResampleError::InvalidConfig(
            "channel count must be positive".into(),
        ));
    }
    if samples.len() % channels != 0 {
        return Err(ResampleError::MalformedInput {
            len: samples.len(),
            unit: channels,
        });
    }

    let frames = samples.len() / channels;
    let mut out: Vec<Vec<f64>> = (0..channels).map(|_| Vec::with_capacity(frames)).collect();
    for frame in samples.chunks_exact(channels) {
        for (ch, &s) in out.iter_mut().zip(frame) {
            ch.push(s);
        }
    }
    Ok(out)
}

/// Interleaves per-channel buffers frame by frame.
///
/// All channels must have the same length.
pub fn interleave<C: AsRef<[f64]>>(channels: &[C]) -> Result<Vec<f64>> {
    let Some(first) = channels.first() else {
        return Ok(Vec::new());
    };
    let frames = first.as_ref().len();
    for ch in channels {
        if ch.as_ref().len() != frames {
            return Err(ResampleError::ChannelLengthMismatch {
                expected: frames,
                got: ch.as_ref().len(),
            });
        }
    }

    let mut out = Vec::with_capacity(frames * channels.len());
    for i in 0..frames {
        for ch in channels {
            out.push(ch.as_ref()[i]);
        }
    }
    Ok(out)
}
