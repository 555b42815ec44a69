use std::sync::Arc;

use log::debug;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::{Error, Result};
use crate::sigproc::FrameSet;

/// Magnitude and power spectra of real frames over an `nfft`-point FFT.
///
/// Frames shorter than `nfft` are zero-padded; longer frames are rejected.
/// Only the `nfft / 2 + 1` non-redundant bins are returned. The FFT is
/// planned once and shared read-only by every worker.
pub struct SpectralAnalyzer {
    nfft: usize,
    fft: Arc<dyn Fft<f64>>,
}

impl SpectralAnalyzer {
    pub fn new(nfft: usize) -> Result<Self> {
        if nfft == 0 {
            return Err(Error::InvalidFftSize { nfft, frame_len: 0 });
        }
        let fft = FftPlanner::<f64>::new().plan_fft_forward(nfft);
        debug!("Planned forward FFT of size {}", nfft);
        Ok(Self { nfft, fft })
    }

    pub fn nfft(&self) -> usize {
        self.nfft
    }

    pub fn bins(&self) -> usize {
        self.nfft / 2 + 1
    }

    /// Centre frequency in Hz of every returned bin.
    pub fn bin_frequencies(&self, sample_rate: u32) -> Vec<f64> {
        (0..self.bins())
            .map(|k| k as f64 * sample_rate as f64 / self.nfft as f64)
            .collect()
    }

    fn check_len(&self, frame_len: usize) -> Result<()> {
        if frame_len > self.nfft {
            return Err(Error::InvalidFftSize { nfft: self.nfft, frame_len });
        }
        Ok(())
    }

    fn transform(&self, frame: &[f64]) -> Vec<f64> {
        let mut buffer = vec![Complex::new(0.0, 0.0); self.nfft];
        for (slot, &x) in buffer.iter_mut().zip(frame) {
            slot.re = x;
        }
        self.fft.process(&mut buffer);
        buffer.iter().take(self.bins()).map(|c| c.norm()).collect()
    }

    fn to_power(&self, magnitudes: Vec<f64>) -> Vec<f64> {
        let scale = 1.0 / self.nfft as f64;
        magnitudes.into_iter().map(|m| scale * m * m).collect()
    }

    /// `|FFT(frame)|` for a single frame.
    pub fn magnitude(&self, frame: &[f64]) -> Result<Vec<f64>> {
        self.check_len(frame.len())?;
        Ok(self.transform(frame))
    }

    /// `|FFT(frame)|^2 / nfft` for a single frame.
    pub fn power(&self, frame: &[f64]) -> Result<Vec<f64>> {
        self.magnitude(frame).map(|m| self.to_power(m))
    }

    /// One magnitude spectrum per frame, in frame order.
    pub fn magnitude_spectrum(&self, frames: &FrameSet) -> Result<Vec<Vec<f64>>> {
        self.check_len(frames.frame_len())?;
        debug!(
            "Magnitude spectrum: {} frames, NFFT {}, {} bins",
            frames.len(),
            self.nfft,
            self.bins()
        );
        Ok(frames
            .par_iter()
            .map(|frame| self.transform(frame))
            .collect())
    }

    /// One periodogram estimate per frame, in frame order.
    pub fn power_spectrum(&self, frames: &FrameSet) -> Result<Vec<Vec<f64>>> {
        let magnitudes = self.magnitude_spectrum(frames)?;
        Ok(magnitudes.into_par_iter().map(|m| self.to_power(m)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigproc::{frame, Window};
    use std::f64::consts::PI;

    #[test]
    fn test_bin_count() {
        let analyzer = SpectralAnalyzer::new(512).unwrap();
        for len in [1, 100, 320, 512] {
            let frame = vec![0.5; len];
            assert_eq!(analyzer.magnitude(&frame).unwrap().len(), 257);
        }
        let odd = SpectralAnalyzer::new(9).unwrap();
        assert_eq!(odd.magnitude(&[1.0; 9]).unwrap().len(), 5);
    }

    #[test]
    fn test_frame_longer_than_nfft() {
        let analyzer = SpectralAnalyzer::new(256).unwrap();
        assert_eq!(
            analyzer.magnitude(&vec![0.0; 320]),
            Err(Error::InvalidFftSize { nfft: 256, frame_len: 320 })
        );
        assert!(SpectralAnalyzer::new(0).is_err());
    }

    #[test]
    fn test_impulse_is_flat() {
        let analyzer = SpectralAnalyzer::new(16).unwrap();
        let mut frame = vec![0.0; 16];
        frame[0] = 2.0;
        let mag = analyzer.magnitude(&frame).unwrap();
        assert!(mag.iter().all(|&m| (m - 2.0).abs() < 1e-12));
        let pow = analyzer.power(&frame).unwrap();
        assert!(pow.iter().all(|&p| (p - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_sinusoid_peak() {
        let nfft = 64;
        let analyzer = SpectralAnalyzer::new(nfft).unwrap();
        let frame: Vec<f64> = (0..nfft)
            .map(|n| (2.0 * PI * 8.0 * n as f64 / nfft as f64).cos())
            .collect();
        let mag = analyzer.magnitude(&frame).unwrap();
        assert!((mag[8] - nfft as f64 / 2.0).abs() < 1e-9);
        assert!(mag.iter().enumerate().filter(|(k, _)| *k != 8).all(|(_, &m)| m < 1e-9));
    }

    #[test]
    fn test_batch_matches_single() {
        let signal: Vec<f64> = (0..1000).map(|n| (n as f64 * 0.37).sin()).collect();
        let frames = frame(&signal, 320.0, 160.0, Window::Hamming).unwrap();
        let analyzer = SpectralAnalyzer::new(512).unwrap();
        let batch = analyzer.power_spectrum(&frames).unwrap();
        assert_eq!(batch.len(), frames.len());
        for (row, f) in batch.iter().zip(frames.iter()) {
            assert_eq!(row, &analyzer.power(f).unwrap());
            assert!(row.iter().all(|&p| p >= 0.0));
        }
        assert_eq!(batch, analyzer.power_spectrum(&frames).unwrap());
    }

    #[test]
    fn test_bin_frequencies() {
        let analyzer = SpectralAnalyzer::new(512).unwrap();
        let freqs = analyzer.bin_frequencies(16000);
        assert_eq!(freqs.len(), 257);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[256] - 8000.0).abs() < 1e-9);
    }
}
