//! Frame-aligned reader wrapper.

use std::io::{self, Read};

use crate::error::{ResampleError, Result};

/// Wraps an `io::Read` and hands out windows of whole frames.
///
/// Short reads from the inner reader are retried until the window is full or
/// the reader is exhausted. A partial frame left over at EOF is reported as
/// [`ResampleError::MalformedInput`] instead of being dropped.
pub(crate) struct FrameReader<R: Read> {
    inner: R,
    /// Bytes per frame.
    frame_size: usize,
    /// Total bytes read so far.
    consumed: u64,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R, frame_size: usize) -> Self {
        Self {
            inner: reader,
            frame_size,
            consumed: 0,
        }
    }

    /// Total bytes read from the inner reader.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Replaces the contents of `buf` with up to `max_frames` frames.
    /// Returns the number of frames read; 0 means EOF.
    pub fn read_frames(&mut self, buf: &mut Vec<u8>, max_frames: usize) -> Result<usize> {
        let want = max_frames * self.frame_size;
        buf.resize(want, 0);

        let mut filled = 0;
        while filled < want {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.consumed += filled as u64;
        buf.truncate(filled);

        if filled % self.frame_size != 0 {
            return Err(ResampleError::MalformedInput {
                len: self.consumed as usize,
                unit: self.frame_size,
            });
        }
        Ok(filled / self.frame_size)
    }
}
