//! Turning spectra into fixed-size feature vectors for scoring.

use log::debug;

use crate::audio::{FeatureSource, SignalSource};
use crate::config::{FramingConfig, SpectrumConfig};
use crate::error::{Error, Result};
use crate::pipeline::SpectralPipeline;

/// Zero-pads or truncates `row` to exactly `dim` entries.
pub fn fit_dimension(row: &[f64], dim: usize) -> Result<Vec<f64>> {
    if dim == 0 {
        return Err(Error::ZeroDimension);
    }
    let mut out: Vec<f64> = row.iter().take(dim).copied().collect();
    out.resize(dim, 0.0);
    Ok(out)
}

pub fn fit_rows(rows: &[Vec<f64>], dim: usize) -> Result<Vec<Vec<f64>>> {
    rows.iter().map(|row| fit_dimension(row, dim)).collect()
}

/// Features taken straight from the spectra of a signal source: one
/// spectrum per frame, fitted to `dimension` bins.
///
/// Frame durations in seconds, when set, are converted with each signal's
/// own sample rate.
pub struct SpectralFeatureSource<S> {
    signals: S,
    framing: FramingConfig,
    spectrum: SpectrumConfig,
    dimension: usize,
    frame_secs: Option<f64>,
    step_secs: Option<f64>,
}

impl<S: SignalSource> SpectralFeatureSource<S> {
    pub fn new(signals: S, framing: FramingConfig, spectrum: SpectrumConfig, dimension: usize) -> Self {
        Self {
            signals,
            framing,
            spectrum,
            dimension,
            frame_secs: None,
            step_secs: None,
        }
    }

    pub fn with_seconds(mut self, frame_secs: Option<f64>, step_secs: Option<f64>) -> Self {
        self.frame_secs = frame_secs;
        self.step_secs = step_secs;
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl<S: SignalSource> FeatureSource for SpectralFeatureSource<S> {
    fn read_features(&self, id: &str) -> anyhow::Result<Vec<Vec<f64>>> {
        let signal = self.signals.read_signal(id)?;
        let framing = self
            .framing
            .with_seconds(self.frame_secs, self.step_secs, signal.sample_rate);
        let pipeline = SpectralPipeline::from_config(&framing, &self.spectrum)?;
        let spectra = if self.spectrum.power() {
            pipeline.power_spectra(&signal.samples)?
        } else {
            pipeline.magnitude_spectra(&signal.samples)?
        };
        debug!("{}: {} feature vectors of {}", id, spectra.len(), self.dimension);
        Ok(fit_rows(&spectra, self.dimension)?)
    }
}
