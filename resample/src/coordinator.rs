//! Lockstep driver for per-channel kernels.

use std::sync::Arc;

use crate::codec;
use crate::config::KernelConfig;
use crate::error::{ResampleError, Result};
use crate::kernel::{Kernel, RateRatio, SincTable};

/// One [`Kernel`] per channel, fed equal-length chunks.
///
/// Kernels share an immutable sinc table but no mutable state. Because every
/// channel sees the same ratio and chunk lengths, their output lengths match
/// after every call.
#[derive(Debug)]
pub struct ChannelBank {
    kernels: Vec<Kernel>,
}

impl ChannelBank {
    pub fn new(
        channels: usize,
        input_rate: u32,
        output_rate: u32,
        config: &KernelConfig,
    ) -> Result<Self> {
        if channels == 0 {
            return Err(ResampleError::InvalidConfig(
                "channel count must be positive".into(),
            ));
        }
        let ratio = RateRatio::new(input_rate, output_rate)?;
        let table = Arc::new(SincTable::new(config, ratio.bandwidth())?);
        let kernels = (0..channels)
            .map(|_| Kernel::with_table(Arc::clone(&table), ratio))
            .collect();
        Ok(Self { kernels })
    }

    pub fn channels(&self) -> usize {
        self.kernels.len()
    }

    /// Kernel width in input frames.
    pub fn taps(&self) -> usize {
        self.kernels[0].taps()
    }

    /// Resamples one chunk per channel.
    ///
    /// Fails with [`ResampleError::ChannelLengthMismatch`] if the number of
    /// inputs is not the channel count or the inputs differ in length.
    pub fn process<C: AsRef<[f64]>>(
        &mut self,
        inputs: &[C],
        is_final: bool,
    ) -> Result<Vec<Vec<f64>>> {
        if inputs.len() != self.kernels.len() {
            return Err(ResampleError::ChannelLengthMismatch {
                expected: self.kernels.len(),
                got: inputs.len(),
            });
        }
        let frames = inputs[0].as_ref().len();
        if let Some(bad) = inputs.iter().find(|c| c.as_ref().len() != frames) {
            return Err(ResampleError::ChannelLengthMismatch {
                expected: frames,
                got: bad.as_ref().len(),
            });
        }

        let mut outputs = Vec::with_capacity(self.kernels.len());
        for (kernel, input) in self.kernels.iter_mut().zip(inputs) {
            outputs.push(kernel.process(input.as_ref(), is_final)?);
        }

        let produced = outputs[0].len();
        if let Some(bad) = outputs.iter().find(|c| c.len() != produced) {
            return Err(ResampleError::ChannelLengthMismatch {
                expected: produced,
                got: bad.len(),
            });
        }
        Ok(outputs)
    }

    /// Resamples an interleaved chunk and returns interleaved output.
    pub fn process_interleaved(&mut self, samples: &[f64], is_final: bool) -> Result<Vec<f64>> {
        let planar = codec::deinterleave(samples, self.kernels.len())?;
        let out = self.process(&planar, is_final)?;
        codec::interleave(&out)
    }
}
