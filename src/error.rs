use thiserror::Error;

/// Errors raised by the signal pipeline and the scoring engine.
///
/// None of these are recovered from locally: a failed frame aborts the
/// whole computation it belongs to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("degenerate covariance: {0}")]
    DegenerateCovariance(String),

    #[error("non-positive density {density} at frame {index}")]
    NonPositiveDensity { index: usize, density: f64 },

    #[error("invalid framing parameters: frame length {frame_len}, frame step {frame_step}")]
    InvalidFramingParameters { frame_len: f64, frame_step: f64 },

    #[error("FFT size {nfft} cannot hold frames of length {frame_len}")]
    InvalidFftSize { nfft: usize, frame_len: usize },

    #[error("mixture weights must lie in (0, 1] and sum to 1, got sum {sum}")]
    InvalidWeights { sum: f64 },

    #[error("mixture has no components")]
    EmptyMixture,

    #[error("feature dimension must be at least 1")]
    ZeroDimension,

    #[error("cannot score an empty sequence")]
    EmptySequence,
}

pub type Result<T> = std::result::Result<T, Error>;
