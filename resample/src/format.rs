//! Sample formats and the stream descriptor.

use std::time::Duration;

use crate::error::{ResampleError, Result};

/// Encoding of a single PCM sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// 16-bit signed integer, scaled to [-1, 1) for processing.
    I16,
    /// 32-bit IEEE float.
    F32,
    /// 64-bit IEEE float.
    F64,
}

impl SampleFormat {
    /// Returns the number of bytes per sample.
    pub const fn byte_width(self) -> usize {
        match self {
            SampleFormat::I16 => 2,
            SampleFormat::F32 => 4,
            SampleFormat::F64 => 8,
        }
    }

    /// Returns the bit depth.
    pub const fn depth(self) -> usize {
        self.byte_width() * 8
    }
}

/// Byte order of samples in a raw buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Describes one resampling invocation: channel layout, rates and sample encoding.
///
/// Raw PCM carries no header, so everything here is asserted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    channels: usize,
    input_rate: u32,
    output_rate: u32,
    format: SampleFormat,
    byte_order: ByteOrder,
}

impl Descriptor {
    /// Creates a little-endian descriptor.
    ///
    /// Fails with [`ResampleError::InvalidRatio`] when either rate is zero and
    /// with [`ResampleError::InvalidConfig`] when `channels` is zero.
    pub fn new(
        channels: usize,
        input_rate: u32,
        output_rate: u32,
        format: SampleFormat,
    ) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(ResampleError::InvalidRatio {
                input_rate,
                output_rate,
            });
        }
        if channels == 0 {
            return Err(ResampleError::InvalidConfig(
                "channel count must be positive".into(),
            ));
        }
        Ok(Self {
            channels,
            input_rate,
            output_rate,
            format,
            byte_order: ByteOrder::Little,
        })
    }

    /// Returns a copy of this descriptor with the given byte order.
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Returns the number of bytes per interleaved frame.
    pub fn frame_bytes(&self) -> usize {
        self.channels * self.format.byte_width()
    }

    /// Returns `output_rate / input_rate`.
    pub fn ratio(&self) -> f64 {
        self.output_rate as f64 / self.input_rate as f64
    }

    /// Returns `floor(input_frames * output_rate / input_rate)`.
    pub fn output_frames(&self, input_frames: u64) -> u64 {
        (input_frames as u128 * self.output_rate as u128 / self.input_rate as u128) as u64
    }

    /// Returns the number of whole frames in `len` bytes, or
    /// [`ResampleError::MalformedInput`] if `len` is not frame aligned.
    pub fn frames_in_bytes(&self, len: usize) -> Result<usize> {
        let unit = self.frame_bytes();
        if len % unit != 0 {
            return Err(ResampleError::MalformedInput { len, unit });
        }
        Ok(len / unit)
    }

    /// Returns the playback duration of `frames` at the input rate.
    pub fn input_duration(&self, frames: u64) -> Duration {
        frames_duration(frames, self.input_rate)
    }

    /// Returns the playback duration of `frames` at the output rate.
    pub fn output_duration(&self, frames: u64) -> Duration {
        frames_duration(frames, self.output_rate)
    }
}

fn frames_duration(frames: u64, rate: u32) -> Duration {
    let nanos = frames as u128 * 1_000_000_000 / rate as u128;
    Duration::from_nanos(nanos as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_width() {
        assert_eq!(SampleFormat::I16.byte_width(), 2);
        assert_eq!(SampleFormat::F32.byte_width(), 4);
        assert_eq!(SampleFormat::F64.byte_width(), 8);
        assert_eq!(SampleFormat::F32.depth(), 32);
    }

    #[test]
    fn test_descriptor_validation() {
        assert!(matches!(
            Descriptor::new(2, 0, 16000, SampleFormat::I16),
            Err(ResampleError::InvalidRatio { input_rate: 0, .. })
        ));
        assert!(matches!(
            Descriptor::new(2, 44100, 0, SampleFormat::I16),
            Err(ResampleError::InvalidRatio { output_rate: 0, .. })
        ));
        assert!(matches!(
            Descriptor::new(0, 44100, 16000, SampleFormat::I16),
            Err(ResampleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_descriptor_frame_bytes() {
        let d = Descriptor::new(2, 44100, 16000, SampleFormat::I16).unwrap();
        assert_eq!(d.frame_bytes(), 4);
        assert_eq!(d.byte_order(), ByteOrder::Little);

        let d = Descriptor::new(3, 48000, 48000, SampleFormat::F64).unwrap();
        assert_eq!(d.frame_bytes(), 24);
    }

    #[test]
    fn test_output_frames_floor() {
        let d = Descriptor::new(2, 44100, 16000, SampleFormat::I16).unwrap();
        assert_eq!(d.output_frames(8), 2);
        assert_eq!(d.output_frames(44100), 16000);
        assert_eq!(d.output_frames(0), 0);

        // Large inputs must not overflow.
        let frames = 44100u64 * 3600 * 24;
        assert_eq!(d.output_frames(frames), 16000 * 3600 * 24);
    }

    #[test]
    fn test_frames_in_bytes() {
        let d = Descriptor::new(2, 44100, 16000, SampleFormat::I16).unwrap();
        assert_eq!(d.frames_in_bytes(32).unwrap(), 8);
        assert!(matches!(
            d.frames_in_bytes(30),
            Err(ResampleError::MalformedInput { len: 30, unit: 4 })
        ));
    }

    #[test]
    fn test_durations() {
        let d = Descriptor::new(1, 16000, 48000, SampleFormat::F32).unwrap();
        assert_eq!(d.input_duration(16000), Duration::from_secs(1));
        assert_eq!(d.output_duration(4800), Duration::from_millis(100));
        assert!((d.ratio() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_byte_order() {
        let d = Descriptor::new(1, 16000, 8000, SampleFormat::I16)
            .unwrap()
            .with_byte_order(ByteOrder::Big);
        assert_eq!(d.byte_order(), ByteOrder::Big);
        assert_eq!(d.channels(), 1);
    }
}
