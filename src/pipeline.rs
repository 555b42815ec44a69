//! Pre-emphasis, framing and spectrum computation bundled per configuration.

use log::info;

use crate::config::{FramingConfig, SpectrumConfig};
use crate::error::Result;
use crate::sigproc::{frame, preemphasize, FrameSet, SpectralAnalyzer, Window};

pub struct SpectralPipeline {
    pub preemphasis: f64,
    pub frame_length: f64,
    pub frame_step: f64,
    pub window: Window,
    analyzer: SpectralAnalyzer,
}

impl SpectralPipeline {
    pub fn new(preemphasis: f64, frame_length: f64, frame_step: f64, window: Window, nfft: usize) -> Result<Self> {
        Ok(Self {
            preemphasis,
            frame_length,
            frame_step,
            window,
            analyzer: SpectralAnalyzer::new(nfft)?,
        })
    }

    pub fn from_config(framing: &FramingConfig, spectrum: &SpectrumConfig) -> anyhow::Result<Self> {
        let pipeline = Self::new(
            framing.preemphasis(),
            framing.frame_length(),
            framing.frame_step(),
            framing.window()?,
            spectrum.nfft(),
        )?;
        Ok(pipeline)
    }

    pub fn analyzer(&self) -> &SpectralAnalyzer {
        &self.analyzer
    }

    pub fn frames(&self, samples: &[f64]) -> Result<FrameSet> {
        let emphasized = preemphasize(samples, self.preemphasis);
        frame(&emphasized, self.frame_length, self.frame_step, self.window)
    }

    pub fn magnitude_spectra(&self, samples: &[f64]) -> Result<Vec<Vec<f64>>> {
        let frames = self.frames(samples)?;
        let spectra = self.analyzer.magnitude_spectrum(&frames)?;
        info!("Extracted {} magnitude spectra", spectra.len());
        Ok(spectra)
    }

    pub fn power_spectra(&self, samples: &[f64]) -> Result<Vec<Vec<f64>>> {
        let frames = self.frames(samples)?;
        let spectra = self.analyzer.power_spectrum(&frames)?;
        info!("Extracted {} power spectra", spectra.len());
        Ok(spectra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::features::fit_rows;
    use crate::gmm::{score_against, score_sequence, GaussianComponent, MixtureModel};
    use nalgebra::DMatrix;

    #[test]
    fn test_silence_end_to_end() {
        let pipeline = SpectralPipeline::new(0.97, 320.0, 160.0, Window::Hamming, 512).unwrap();
        let silence = vec![0.0; 1000];

        let frames = pipeline.frames(&silence).unwrap();
        assert_eq!(frames.len(), 6);
        assert!(frames.iter().all(|f| f.len() == 320 && f.iter().all(|&x| x == 0.0)));

        let spectra = pipeline.magnitude_spectra(&silence).unwrap();
        assert_eq!(spectra.len(), 6);
        assert!(spectra.iter().all(|s| s.len() == 257 && s.iter().all(|&m| m == 0.0)));

        let dim = 13;
        let features = fit_rows(&spectra, dim).unwrap();
        let model = MixtureModel::single(GaussianComponent::new(
            vec![7.5; dim],
            DMatrix::<f64>::identity(dim, dim) * 50.0,
        ));
        let p = model.evaluate(&features[0]).unwrap();
        assert!(p > 0.0 && p.is_finite());

        let models = vec![&model; features.len()];
        let score = score_sequence(&models, &features).unwrap();
        assert!((score - p.log10()).abs() < 1e-12);
        assert_eq!(score_against(&model, &features).unwrap(), score);
    }

    #[test]
    fn test_power_matches_magnitude() {
        let pipeline = SpectralPipeline::new(0.97, 256.0, 128.0, Window::Hann, 256).unwrap();
        let tone: Vec<f64> = (0..2048).map(|n| (n as f64 * 0.05).sin()).collect();
        let mags = pipeline.magnitude_spectra(&tone).unwrap();
        let pows = pipeline.power_spectra(&tone).unwrap();
        for (m, p) in mags.iter().zip(&pows) {
            for (a, b) in m.iter().zip(p) {
                assert!((a * a / 256.0 - b).abs() <= 1e-12 * a.max(1.0) * a.max(1.0));
            }
        }
    }

    #[test]
    fn test_nfft_smaller_than_frame() {
        let pipeline = SpectralPipeline::new(0.97, 320.0, 160.0, Window::Hamming, 256).unwrap();
        assert_eq!(
            pipeline.magnitude_spectra(&[0.0; 500]),
            Err(Error::InvalidFftSize { nfft: 256, frame_len: 320 })
        );
    }

    #[test]
    fn test_from_config() {
        let pipeline = SpectralPipeline::from_config(&FramingConfig::default(), &SpectrumConfig::default()).unwrap();
        assert_eq!(pipeline.frame_length, 320.0);
        assert_eq!(pipeline.analyzer().nfft(), 512);
        assert_eq!(pipeline.window, Window::Hamming);
    }
}
