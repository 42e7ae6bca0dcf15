//! Single-channel band-limited resampling kernel.
//!
//! Output sample `n` sits at input position `n * M / L`, where `L / M` is the
//! reduced `output_rate / input_rate`. The position is tracked exactly as an
//! integer index plus a remainder in `[0, L)`, so there is no drift however
//! long the stream runs, and the same input split into different chunks
//! yields bit-identical output.
//!
//! # Example
//!
//! ```rust
//! use giztoy_resample::config::KernelConfig;
//! use giztoy_resample::kernel::Kernel;
//!
//! let mut kernel = Kernel::new(48000, 16000, &KernelConfig::default()).unwrap();
//! let mut out = kernel.process(&vec![0.0; 480], false).unwrap();
//! out.extend(kernel.process(&[], true).unwrap());
//! assert_eq!(out.len(), 160);
//! ```

pub mod sinc;

use std::sync::Arc;

use crate::config::KernelConfig;
use crate::error::{ResampleError, Result};

pub use sinc::SincTable;

/// Reduced rate pair shared by all channels of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRatio {
    /// Output steps per input cycle (`output_rate / gcd`).
    pub up: u64,
    /// Input steps per output cycle (`input_rate / gcd`).
    pub down: u64,
}

impl RateRatio {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(ResampleError::InvalidRatio {
                input_rate,
                output_rate,
            });
        }
        let g = gcd(input_rate as u64, output_rate as u64);
        Ok(Self {
            up: output_rate as u64 / g,
            down: input_rate as u64 / g,
        })
    }

    /// `min(1, output_rate / input_rate)`, the fraction of the input band
    /// that survives conversion.
    pub fn bandwidth(&self) -> f64 {
        (self.up as f64 / self.down as f64).min(1.0)
    }

    /// Number of outputs due for `frames` inputs: `floor(frames * up / down)`.
    pub fn output_frames(&self, frames: u64) -> u64 {
        (frames as u128 * self.up as u128 / self.down as u128) as u64
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Resampling state for one channel.
///
/// Holds the input history still needed by future outputs and the exact
/// position of the next output. Create one per channel per session.
#[derive(Debug, Clone)]
pub struct Kernel {
    table: Arc<SincTable>,
    ratio: RateRatio,
    half: usize,
    /// Samples from absolute input index `base` onward. Negative indices
    /// are the zero pre-roll before the start of signal.
    history: Vec<f64>,
    base: i64,
    /// Integer input index of the next output.
    pos: i64,
    /// Fractional part of the next output position, in units of `1 / up`.
    phase: u64,
    frames_in: u64,
    frames_out: u64,
    finished: bool,
}

impl Kernel {
    /// Creates a kernel with its own sinc table.
    pub fn new(input_rate: u32, output_rate: u32, config: &KernelConfig) -> Result<Self> {
        let ratio = RateRatio::new(input_rate, output_rate)?;
        let table = SincTable::new(config, ratio.bandwidth())?;
        Ok(Self::with_table(Arc::new(table), ratio))
    }

    /// Creates a kernel over a table shared with other channels.
    pub fn with_table(table: Arc<SincTable>, ratio: RateRatio) -> Self {
        let half = table.taps() / 2;
        Self {
            table,
            ratio,
            half,
            history: vec![0.0; half],
            base: -(half as i64),
            pos: 0,
            phase: 0,
            frames_in: 0,
            frames_out: 0,
            finished: false,
        }
    }

    /// Kernel width in input samples.
    pub fn taps(&self) -> usize {
        self.table.taps()
    }

    pub fn ratio(&self) -> RateRatio {
        self.ratio
    }

    /// Total input samples received.
    pub fn frames_in(&self) -> u64 {
        self.frames_in
    }

    /// Total output samples emitted.
    pub fn frames_out(&self) -> u64 {
        self.frames_out
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Resamples `input` and returns every output that can be completed.
    ///
    /// With `is_final`, the look-ahead past the end of signal is zero-padded
    /// and the output is completed up to `floor(frames_in * up / down)`
    /// samples in total.
    pub fn process(&mut self, input: &[f64], is_final: bool) -> Result<Vec<f64>> {
        let capacity = self.ratio.output_frames(input.len() as u64) as usize + 1;
        let mut out = Vec::with_capacity(capacity);
        self.process_into(input, is_final, &mut out)?;
        Ok(out)
    }

    /// Like [`Kernel::process`], but appends to `out` and returns the number
    /// of samples appended.
    pub fn process_into(
        &mut self,
        input: &[f64],
        is_final: bool,
        out: &mut Vec<f64>,
    ) -> Result<usize> {
        if self.finished {
            return Err(ResampleError::SessionFinished);
        }

        self.history.extend_from_slice(input);
        self.frames_in += input.len() as u64;

        let target = self.ratio.output_frames(self.frames_in);
        let mut emitted = 0;

        if is_final {
            // Zero look-ahead past the true end of signal.
            self.history.resize(self.history.len() + self.half, 0.0);
            while self.frames_out < target {
                out.push(self.next_sample()?);
                emitted += 1;
            }
            self.finished = true;
            self.history = Vec::new();
            return Ok(emitted);
        }

        let received = self.frames_in as i64;
        while self.frames_out < target && self.pos + (self.half as i64) < received {
            out.push(self.next_sample()?);
            emitted += 1;
        }
        self.discard_consumed();
        Ok(emitted)
    }

    /// Computes the output at the current position and advances it.
    fn next_sample(&mut self) -> Result<f64> {
        let first = self.pos - self.half as i64;
        if first < self.base {
            return Err(ResampleError::InsufficientHistory {
                needed: first,
                available: self.base,
            });
        }
        let start = (first - self.base) as usize;
        let end = start + self.table.taps() + 1;
        if end > self.history.len() {
            return Err(ResampleError::InsufficientHistory {
                needed: self.base + end as i64 - 1,
                available: self.base + self.history.len() as i64 - 1,
            });
        }

        let y = self.table.interpolate(&self.history[start..end], self.phase, self.ratio.up);

        self.pos += (self.ratio.down / self.ratio.up) as i64;
        self.phase += self.ratio.down % self.ratio.up;
        if self.phase >= self.ratio.up {
            self.phase -= self.ratio.up;
            self.pos += 1;
        }
        self.frames_out += 1;
        Ok(y)
    }

    /// Drops history that no future output can reach.
    fn discard_consumed(&mut self) {
        let first = self.pos - self.half as i64;
        let drop = (first - self.base).clamp(0, self.history.len() as i64) as usize;
        if drop > 0 {
            self.history.drain(..drop);
            self.base += drop as i64;
        }
    }
}
