//! Oversampled windowed-sinc filter backed by rubato's interpolator.

use std::fmt;

use rubato::sinc_interpolator::{ScalarInterpolator, SincInterpolator};

use crate::config::KernelConfig;
use crate::error::Result;

/// Windowed-sinc low-pass filter tabulated at `phases` sub-sample offsets.
///
/// Filtering always reads a window of `taps + 1` input samples starting at
/// `pos - taps / 2`, where `pos` is the integer part of the output position.
/// Sub-sinc `s` of rubato's table is centred on window index
/// `taps / 2 - (phases - 1 - s) / phases`, so grid point `g` (an offset of
/// `g / phases` past `pos`) is sub-sinc `phases - 1` at window index 0 when
/// `g == 0`, and sub-sinc `g - 1` at window index 1 otherwise.
pub struct SincTable {
    taps: usize,
    phases: usize,
    cutoff: f64,
    interpolator: ScalarInterpolator<f64>,
}

impl fmt::Debug for SincTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SincTable")
            .field("taps", &self.taps)
            .field("phases", &self.phases)
            .field("cutoff", &self.cutoff)
            .finish()
    }
}

impl SincTable {
    /// Builds the table for `config`, scaling the cutoff by `bandwidth`
    /// (`min(1, output_rate / input_rate)`) to keep downsampled output free
    /// of aliasing.
    pub fn new(config: &KernelConfig, bandwidth: f64) -> Result<Self> {
        config.validate()?;

        let cutoff = config.resolved_cutoff() * bandwidth.clamp(0.0, 1.0);
        let interpolator = ScalarInterpolator::<f64>::new(
            config.taps,
            config.oversampling,
            cutoff as f32,
            config.window.into(),
        );

        Ok(Self {
            taps: config.taps,
            phases: config.oversampling,
            cutoff,
            interpolator,
        })
    }

    pub fn taps(&self) -> usize {
        self.taps
    }

    pub fn phases(&self) -> usize {
        self.phases
    }

    /// Effective cutoff relative to the input Nyquist frequency.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Filters `wave` at offset `phase / up` past its centre sample.
    ///
    /// `wave` holds `taps + 1` samples, the centre one at index `taps / 2`,
    /// and `phase < up`. The offset is placed on the sub-sinc grid with
    /// integer arithmetic, then interpolated linearly between the two
    /// nearest grid points.
    #[inline]
    pub fn interpolate(&self, wave: &[f64], phase: u64, up: u64) -> f64 {
        debug_assert_eq!(wave.len(), self.taps + 1);
        debug_assert!(phase < up);

        let scaled = phase * self.phases as u64;
        let g = (scaled / up) as usize;
        let rem = scaled % up;

        let a = self.at_grid(wave, g);
        if rem == 0 {
            return a;
        }
        let b = self.at_grid(wave, g + 1);
        a + (b - a) * (rem as f64 / up as f64)
    }

    #[inline]
    fn at_grid(&self, wave: &[f64], g: usize) -> f64 {
        if g == 0 {
            self.interpolator.get_sinc_interpolated(wave, 0, self.phases - 1)
        } else {
            self.interpolator.get_sinc_interpolated(wave, 1, g - 1)
        }
    }
}
