use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by resampling operations.
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("malformed input: length {len} is not a multiple of {unit}")]
    MalformedInput { len: usize, unit: usize },

    #[error("invalid ratio: input rate {input_rate} Hz, output rate {output_rate} Hz")]
    InvalidRatio { input_rate: u32, output_rate: u32 },

    #[error("channel length mismatch: expected {expected}, got {got}")]
    ChannelLengthMismatch { expected: usize, got: usize },

    #[error("insufficient history: need sample {needed}, oldest retained is {available}")]
    InsufficientHistory { needed: i64, available: i64 },

    #[error("output already exists: {}", path.display())]
    OutputAlreadyExists { path: PathBuf },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("session already received its final chunk")]
    SessionFinished,

    #[error("frame accounting: expected {expected} output frames, produced {produced}")]
    FrameAccounting { expected: u64, produced: u64 },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for resampling operations.
pub type Result<T> = std::result::Result<T, ResampleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResampleError::MalformedInput { len: 7, unit: 4 };
        assert_eq!(
            err.to_string(),
            "malformed input: length 7 is not a multiple of 4"
        );

        let err = ResampleError::InvalidRatio {
            input_rate: 0,
            output_rate: 16000,
        };
        assert!(err.to_string().contains("input rate 0 Hz"));

        let err = ResampleError::OutputAlreadyExists {
            path: PathBuf::from("/tmp/out.raw"),
        };
        assert!(err.to_string().contains("/tmp/out.raw"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: ResampleError = io_err.into();
        assert!(matches!(err, ResampleError::Io(_)));
        assert!(err.to_string().contains("missing"));
    }
}
