//! Chunked resampling with exact frame accounting.
//!
//! A [`Session`] owns everything one invocation needs: the descriptor, one
//! kernel per channel and the running frame counters. Callers feed it
//! frame-aligned chunks in order and mark the last one final. [`ChunkPlan`]
//! splits a known frame count so that the final chunk carries exactly the
//! frames that remain.

use tracing::{debug, trace};

use crate::codec;
use crate::config::ResampleConfig;
use crate::coordinator::ChannelBank;
use crate::error::{ResampleError, Result};
use crate::format::Descriptor;

/// One chunk of a [`ChunkPlan`], in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub start: u64,
    pub frames: u64,
    pub is_final: bool,
}

/// Splits `total_frames` into spans of at most `chunk_frames`.
///
/// Always yields at least one span: an empty input is a single empty final
/// span, and an input shorter than one chunk is a single final span.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    total: u64,
    chunk: u64,
    next: u64,
    done: bool,
}

impl ChunkPlan {
    pub fn new(total_frames: u64, chunk_frames: usize) -> Self {
        Self {
            total: total_frames,
            chunk: chunk_frames.max(1) as u64,
            next: 0,
            done: false,
        }
    }
}

impl Iterator for ChunkPlan {
    type Item = ChunkSpan;

    fn next(&mut self) -> Option<ChunkSpan> {
        if self.done {
            return None;
        }
        let remaining = self.total - self.next;
        let frames = remaining.min(self.chunk);
        let span = ChunkSpan {
            start: self.next,
            frames,
            is_final: frames == remaining,
        };
        self.next += frames;
        self.done = span.is_final;
        Some(span)
    }
}

/// State of one resampling invocation.
#[derive(Debug)]
pub struct Session {
    descriptor: Descriptor,
    config: ResampleConfig,
    bank: ChannelBank,
    frames_consumed: u64,
    frames_produced: u64,
    finished: bool,
}

impl Session {
    pub fn new(descriptor: Descriptor, config: &ResampleConfig) -> Result<Self> {
        config.validate()?;
        let bank = ChannelBank::new(
            descriptor.channels(),
            descriptor.input_rate(),
            descriptor.output_rate(),
            &config.kernel,
        )?;
        debug!(
            "resample session: {} ch, {} Hz -> {} Hz, {:?} {:?}, chunk {} frames, {} taps",
            descriptor.channels(),
            descriptor.input_rate(),
            descriptor.output_rate(),
            descriptor.format(),
            descriptor.byte_order(),
            config.chunk_frames,
            config.kernel.taps,
        );
        Ok(Self {
            descriptor,
            config: *config,
            bank,
            frames_consumed: 0,
            frames_produced: 0,
            finished: false,
        })
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    pub fn frames_consumed(&self) -> u64 {
        self.frames_consumed
    }

    pub fn frames_produced(&self) -> u64 {
        self.frames_produced
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Output frames the stream will have once finished, given the input
    /// consumed so far.
    pub fn expected_output_frames(&self) -> u64 {
        self.descriptor.output_frames(self.frames_consumed)
    }

    /// Resamples one chunk of interleaved normalized samples.
    pub fn process_samples(&mut self, interleaved: &[f64], is_final: bool) -> Result<Vec<f64>> {
        if self.finished {
            return Err(ResampleError::SessionFinished);
        }
        let channels = self.descriptor.channels();
        if interleaved.len() % channels != 0 {
            return Err(ResampleError::MalformedInput {
                len: interleaved.len(),
                unit: channels,
            });
        }

        let frames_in = (interleaved.len() / channels) as u64;
        let out = self.bank.process_interleaved(interleaved, is_final)?;
        let frames_out = (out.len() / channels) as u64;

        self.frames_consumed += frames_in;
        self.frames_produced += frames_out;
        trace!(
            "chunk: {} frames in, {} frames out, final={}",
            frames_in, frames_out, is_final
        );

        if is_final {
            self.finish()?;
        }
        Ok(out)
    }

    /// Resamples one chunk of raw interleaved bytes in the descriptor's
    /// format. The chunk must hold whole frames.
    pub fn process_bytes(&mut self, chunk: &[u8], is_final: bool) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.process_bytes_into(chunk, is_final, &mut out)?;
        Ok(out)
    }

    /// Like [`Session::process_bytes`], but appends to `out`.
    pub fn process_bytes_into(
        &mut self,
        chunk: &[u8],
        is_final: bool,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        self.descriptor.frames_in_bytes(chunk.len())?;
        let format = self.descriptor.format();
        let order = self.descriptor.byte_order();

        let samples = codec::decode(chunk, format, order)?;
        let resampled = self.process_samples(&samples, is_final)?;
        codec::encode_into(&resampled, format, order, out);
        Ok(())
    }

    /// Resamples a whole buffer of raw bytes, chunk by chunk, and finishes
    /// the session.
    pub fn run(&mut self, bytes: &[u8]) -> Result<Vec<u8>> {
        let frame_bytes = self.descriptor.frame_bytes();
        let total = self.descriptor.frames_in_bytes(bytes.len())? as u64;

        let expected = self.descriptor.output_frames(total) as usize * frame_bytes;
        let mut out = Vec::with_capacity(expected);
        self.run_chunks(bytes, frame_bytes, |session, chunk, is_final| {
            session.process_bytes_into(chunk, is_final, &mut out)
        })?;
        Ok(out)
    }

    /// Resamples a whole buffer of interleaved normalized samples, chunk by
    /// chunk, and finishes the session.
    pub fn run_samples(&mut self, interleaved: &[f64]) -> Result<Vec<f64>> {
        let channels = self.descriptor.channels();
        let total = (interleaved.len() / channels) as u64;

        let mut out = Vec::with_capacity(self.descriptor.output_frames(total) as usize * channels);
        self.run_chunks(interleaved, channels, |session, chunk, is_final| {
            out.extend(session.process_samples(chunk, is_final)?);
            Ok(())
        })?;
        Ok(out)
    }

    /// Feeds `input` to `step` in [`ChunkPlan`] order, `unit` elements per
    /// frame. The last call is the only one marked final.
    fn run_chunks<T>(
        &mut self,
        input: &[T],
        unit: usize,
        mut step: impl FnMut(&mut Self, &[T], bool) -> Result<()>,
    ) -> Result<()> {
        if input.len() % unit != 0 {
            return Err(ResampleError::MalformedInput {
                len: input.len(),
                unit,
            });
        }
        let total = (input.len() / unit) as u64;
        for span in ChunkPlan::new(total, self.config.chunk_frames) {
            let start = span.start as usize * unit;
            let end = start + span.frames as usize * unit;
            step(self, &input[start..end], span.is_final)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        let expected = self.expected_output_frames();
        if self.frames_produced != expected {
            return Err(ResampleError::FrameAccounting {
                expected,
                produced: self.frames_produced,
            });
        }
        debug!(
            "resample session finished: {} frames in, {} frames out",
            self.frames_consumed, self.frames_produced
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SampleFormat;

    fn spans(total: u64, chunk: usize) -> Vec<(u64, u64, bool)> {
        ChunkPlan::new(total, chunk)
            .map(|s| (s.start, s.frames, s.is_final))
            .collect()
    }

    #[test]
    fn test_plan_exact_multiple() {
        assert_eq!(spans(8, 4), vec![(0, 4, false), (4, 4, true)]);
    }

    #[test]
    fn test_plan_partial_tail() {
        assert_eq!(spans(10, 4), vec![(0, 4, false), (4, 4, false), (8, 2, true)]);
    }

    #[test]
    fn test_plan_short_input_is_single_final() {
        assert_eq!(spans(3, 4096), vec![(0, 3, true)]);
    }

    #[test]
    fn test_plan_empty() {
        assert_eq!(spans(0, 4096), vec![(0, 0, true)]);
    }

    #[test]
    fn test_plan_never_exceeds_total() {
        for total in 0..50u64 {
            for chunk in 1..9usize {
                let plan = spans(total, chunk);
                let sum: u64 = plan.iter().map(|s| s.1).sum();
                assert_eq!(sum, total);
                assert!(plan.last().unwrap().2);
                assert_eq!(plan.iter().filter(|s| s.2).count(), 1);
            }
        }
    }

    fn i16_bytes(values: impl IntoIterator<Item = i16>) -> Vec<u8> {
        values.into_iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_session_counts() {
        let d = Descriptor::new(2, 44100, 16000, SampleFormat::I16).unwrap();
        let mut s = Session::new(d, &ResampleConfig::default().chunk_frames(256)).unwrap();
        let bytes = i16_bytes((0..2000).map(|i| (i % 200) as i16 * 10));
        let out = s.run(&bytes).unwrap();

        assert!(s.is_finished());
        assert_eq!(s.frames_consumed(), 1000);
        assert_eq!(s.frames_produced(), 1000 * 16000 / 44100);
        assert_eq!(out.len() as u64, s.frames_produced() * 4);
    }

    #[test]
    fn test_session_sixteen_samples_stereo() {
        let d = Descriptor::new(2, 44100, 16000, SampleFormat::I16).unwrap();
        let bytes = i16_bytes([
            100, -100, 200, -200, 300, -300, 400, -400, 500, -500, 600, -600, 700, -700, 800, -800,
        ]);

        let mut s = Session::new(d, &ResampleConfig::default()).unwrap();
        let first = s.run(&bytes).unwrap();
        assert_eq!(first.len(), 2 * 2 * 2);

        let mut again = Session::new(d, &ResampleConfig::default()).unwrap();
        assert_eq!(again.run(&bytes).unwrap(), first);
    }

    #[test]
    fn test_session_malformed_chunk() {
        let d = Descriptor::new(2, 44100, 16000, SampleFormat::I16).unwrap();
        let mut s = Session::new(d, &ResampleConfig::default()).unwrap();
        let err = s.process_bytes(&[0u8; 6], false).unwrap_err();
        assert!(matches!(err, ResampleError::MalformedInput { len: 6, unit: 4 }));
        assert_eq!(s.frames_consumed(), 0);
    }

    #[test]
    fn test_session_after_final() {
        let d = Descriptor::new(1, 8000, 16000, SampleFormat::F32).unwrap();
        let mut s = Session::new(d, &ResampleConfig::default()).unwrap();
        s.process_samples(&[0.0; 100], true).unwrap();
        assert!(matches!(
            s.process_samples(&[0.0; 4], true),
            Err(ResampleError::SessionFinished)
        ));
    }

    #[test]
    fn test_session_rejects_small_chunks() {
        let d = Descriptor::new(1, 8000, 16000, SampleFormat::F32).unwrap();
        let err = Session::new(d, &ResampleConfig::default().chunk_frames(8)).unwrap_err();
        assert!(matches!(err, ResampleError::InvalidConfig(_)));
    }

    #[test]
    fn test_run_samples_matches_run() {
        let d = Descriptor::new(2, 22050, 16000, SampleFormat::F64).unwrap();
        let cfg = ResampleConfig::default().chunk_frames(128);
        let samples: Vec<f64> = (0..2 * 1500)
            .map(|i| ((i * 13) % 97) as f64 / 97.0 - 0.5)
            .collect();
        let bytes = codec::encode(&samples, SampleFormat::F64, d.byte_order());

        let mut by_bytes = Session::new(d, &cfg).unwrap();
        let expected = by_bytes.run(&bytes).unwrap();

        let mut by_samples = Session::new(d, &cfg).unwrap();
        let out = by_samples.run_samples(&samples).unwrap();
        assert!(by_samples.is_finished());
        assert_eq!(by_samples.frames_produced(), 1500 * 16000 / 22050);
        assert_eq!(codec::encode(&out, SampleFormat::F64, d.byte_order()), expected);
    }

    #[test]
    fn test_run_samples_uneven() {
        let d = Descriptor::new(2, 44100, 16000, SampleFormat::F32).unwrap();
        let mut s = Session::new(d, &ResampleConfig::default()).unwrap();
        let err = s.run_samples(&[0.0; 5]).unwrap_err();
        assert!(matches!(err, ResampleError::MalformedInput { len: 5, unit: 2 }));
        assert_eq!(s.frames_consumed(), 0);
    }

    #[test]
    fn test_session_manual_chunks_match_run() {
        let d = Descriptor::new(1, 48000, 22050, SampleFormat::F64).unwrap();
        let samples: Vec<f64> = (0..3000).map(|i| ((i * 7) % 101) as f64 / 101.0 - 0.5).collect();
        let bytes = codec::encode(&samples, SampleFormat::F64, d.byte_order());

        let mut whole = Session::new(d, &ResampleConfig::default()).unwrap();
        let reference = whole.run(&bytes).unwrap();

        let mut manual = Session::new(d, &ResampleConfig::default()).unwrap();
        let mut out = manual.process_bytes(&bytes[..8 * 1234], false).unwrap();
        out.extend(manual.process_bytes(&bytes[8 * 1234..], true).unwrap());
        assert_eq!(out, reference);
    }
}
