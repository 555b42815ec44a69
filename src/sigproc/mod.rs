//! Signal to spectrum: pre-emphasis, framing/windowing and FFT magnitudes.

pub mod framing;
pub mod spectrum;
pub mod window;

pub use framing::{frame, frame_with, preemphasize, FrameSet};
pub use spectrum::SpectralAnalyzer;
pub use window::Window;

/// Mono sample sequence with its sample rate. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

impl Signal {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
