//! Resampler configuration.
//!
//! Configuration can be built in code, picked from a [`Quality`] preset, or
//! loaded from YAML:
//!
//! ```yaml
//! chunk_frames: 8192
//! kernel:
//!   taps: 128
//!   oversampling: 512
//!   window: blackman_harris2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ResampleError, Result};

/// Default number of frames per pipeline chunk.
pub const DEFAULT_CHUNK_FRAMES: usize = 4096;

/// Upper bound on tabulated sub-sample phases.
pub const MAX_OVERSAMPLING: usize = 1 << 16;

/// Window applied to the sinc filter.
///
/// The `2` variants are the squared windows, trading a wider transition band
/// for lower stopband leakage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    Blackman,
    Blackman2,
    BlackmanHarris,
    #[default]
    BlackmanHarris2,
    Hann,
    Hann2,
}

impl From<Window> for rubato::WindowFunction {
    fn from(window: Window) -> Self {
        match window {
            Window::Blackman => rubato::WindowFunction::Blackman,
            Window::Blackman2 => rubato::WindowFunction::Blackman2,
            Window::BlackmanHarris => rubato::WindowFunction::BlackmanHarris,
            Window::BlackmanHarris2 => rubato::WindowFunction::BlackmanHarris2,
            Window::Hann => rubato::WindowFunction::Hann,
            Window::Hann2 => rubato::WindowFunction::Hann2,
        }
    }
}

/// Kernel quality presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// 32 taps, 128 phases.
    Fast,
    /// 64 taps, 256 phases.
    #[default]
    Balanced,
    /// 128 taps, 512 phases.
    High,
}

/// Parameters of the windowed-sinc kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Number of input samples contributing to one output sample. Must be a
    /// multiple of 8.
    pub taps: usize,
    /// Number of tabulated sub-sample phases.
    pub oversampling: usize,
    /// Window applied to the sinc.
    pub window: Window,
    /// Cutoff relative to Nyquist in (0, 1]. When unset, derived from
    /// `taps` and `window`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f64>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Quality::default().into()
    }
}

impl From<Quality> for KernelConfig {
    fn from(quality: Quality) -> Self {
        let (taps, oversampling) = match quality {
            Quality::Fast => (32, 128),
            Quality::Balanced => (64, 256),
            Quality::High => (128, 512),
        };
        Self {
            taps,
            oversampling,
            window: Window::default(),
            cutoff: None,
        }
    }
}

impl KernelConfig {
    /// Returns the configured cutoff, or the one that fits `taps` and `window`.
    pub fn resolved_cutoff(&self) -> f64 {
        self.cutoff
            .unwrap_or_else(|| rubato::calculate_cutoff::<f64>(self.taps, self.window.into()))
    }

    pub fn validate(&self) -> Result<()> {
        // rubato tabulates sincs in blocks of 8 taps.
        if self.taps == 0 || self.taps % 8 != 0 {
            return Err(ResampleError::InvalidConfig(format!(
                "taps must be a positive multiple of 8, got {}",
                self.taps
            )));
        }
        if self.oversampling == 0 || self.oversampling > MAX_OVERSAMPLING {
            return Err(ResampleError::InvalidConfig(format!(
                "oversampling must be in 1..={}, got {}",
                MAX_OVERSAMPLING, self.oversampling
            )));
        }
        if let Some(cutoff) = self.cutoff {
            if !(cutoff > 0.0 && cutoff <= 1.0) {
                return Err(ResampleError::InvalidConfig(format!(
                    "cutoff must be in (0, 1], got {}",
                    cutoff
                )));
            }
        }
        Ok(())
    }
}

/// Top-level resampler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Frames per pipeline chunk. Bounds working memory in streaming mode.
    pub chunk_frames: usize,
    /// Kernel parameters.
    pub kernel: KernelConfig,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            chunk_frames: DEFAULT_CHUNK_FRAMES,
            kernel: KernelConfig::default(),
        }
    }
}

impl ResampleConfig {
    /// Creates a config using the given kernel preset.
    pub fn with_quality(quality: Quality) -> Self {
        Self {
            kernel: quality.into(),
            ..Self::default()
        }
    }

    /// Sets the chunk size in frames.
    pub fn chunk_frames(mut self, chunk_frames: usize) -> Self {
        self.chunk_frames = chunk_frames;
        self
    }

    /// Parses and validates a YAML config.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(s)
            .map_err(|e| ResampleError::InvalidConfig(format!("yaml: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads and validates a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serializes the config to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ResampleError::InvalidConfig(format!("yaml: {}", e)))
    }

    /// Checks the kernel parameters and that a chunk holds at least one
    /// full kernel window.
    pub fn validate(&self) -> Result<()> {
        self.kernel.validate()?;
        if self.chunk_frames < self.kernel.taps {
            return Err(ResampleError::InvalidConfig(format!(
                "chunk_frames ({}) must be at least the kernel width ({})",
                self.chunk_frames, self.kernel.taps
            )));
        }
        Ok(())
    }
}
