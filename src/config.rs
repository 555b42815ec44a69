use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use knuffel::Decode;
use log::{debug, info};

use crate::sigproc::Window;
use crate::util::seconds_to_samples;

pub const DEFAULT_FRAME_LENGTH: f64 = 320.0;
pub const DEFAULT_FRAME_STEP: f64 = 160.0;
pub const DEFAULT_PREEMPHASIS: f64 = 0.97;
pub const DEFAULT_NFFT: usize = 512;
pub const DEFAULT_MIXTURES: usize = 32;
pub const DEFAULT_DIMENSION: usize = 13;

#[derive(Decode, Debug, Clone, Default)]
pub struct ToolkitConfig {
    #[knuffel(child)]
    pub general: Option<GeneralConfig>,
    #[knuffel(child)]
    pub corpus: Option<CorpusConfig>,
    #[knuffel(child)]
    pub framing: Option<FramingConfig>,
    #[knuffel(child)]
    pub spectrum: Option<SpectrumConfig>,
    #[knuffel(child)]
    pub model: Option<ModelConfig>,
}

#[derive(Decode, Debug, Clone, Default)]
pub struct GeneralConfig {
    #[knuffel(property)]
    pub threads: Option<usize>,
}

#[derive(Decode, Debug, Clone, Default)]
pub struct CorpusConfig {
    #[knuffel(property)]
    pub root: Option<String>,
}

/// Lengths are in samples; fractional values are rounded when framing.
#[derive(Decode, Debug, Clone, Default)]
pub struct FramingConfig {
    #[knuffel(property(name = "frame-length"))]
    pub frame_length: Option<f64>,
    #[knuffel(property(name = "frame-step"))]
    pub frame_step: Option<f64>,
    #[knuffel(property)]
    pub preemphasis: Option<f64>,
    #[knuffel(property)]
    pub window: Option<String>,
}

#[derive(Decode, Debug, Clone, Default)]
pub struct SpectrumConfig {
    #[knuffel(property)]
    pub nfft: Option<usize>,
    #[knuffel(property)]
    pub power: Option<bool>,
}

#[derive(Decode, Debug, Clone, Default)]
pub struct ModelConfig {
    #[knuffel(property)]
    pub mixtures: Option<usize>,
    #[knuffel(property)]
    pub dimension: Option<usize>,
    #[knuffel(property)]
    pub seed: Option<u64>,
}

impl FramingConfig {
    pub fn frame_length(&self) -> f64 {
        self.frame_length.unwrap_or(DEFAULT_FRAME_LENGTH)
    }

    pub fn frame_step(&self) -> f64 {
        self.frame_step.unwrap_or(DEFAULT_FRAME_STEP)
    }

    pub fn preemphasis(&self) -> f64 {
        self.preemphasis.unwrap_or(DEFAULT_PREEMPHASIS)
    }

    /// Copy with the lengths overridden by durations in seconds.
    pub fn with_seconds(&self, frame_secs: Option<f64>, step_secs: Option<f64>, sample_rate: u32) -> Self {
        let mut framing = self.clone();
        if let Some(secs) = frame_secs {
            framing.frame_length = Some(seconds_to_samples(secs, sample_rate));
        }
        if let Some(secs) = step_secs {
            framing.frame_step = Some(seconds_to_samples(secs, sample_rate));
        }
        framing
    }

    pub fn window(&self) -> anyhow::Result<Window> {
        match &self.window {
            Some(name) => name.parse(),
            None => Ok(Window::default()),
        }
    }
}

impl SpectrumConfig {
    pub fn nfft(&self) -> usize {
        self.nfft.unwrap_or(DEFAULT_NFFT)
    }

    pub fn power(&self) -> bool {
        self.power.unwrap_or(false)
    }
}

impl ModelConfig {
    pub fn mixtures(&self) -> usize {
        self.mixtures.unwrap_or(DEFAULT_MIXTURES)
    }

    pub fn dimension(&self) -> usize {
        self.dimension.unwrap_or(DEFAULT_DIMENSION)
    }
}

impl ToolkitConfig {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config = knuffel::parse("config.kdl", content)?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "speakid", "speakid").map(|dirs| dirs.config_dir().join("config.kdl"))
    }

    /// An explicit path must exist. Otherwise the default location is tried
    /// and built-in defaults are used when nothing is there.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::load(path)
            }
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn threads(&self) -> usize {
        self.general.as_ref().and_then(|g| g.threads).unwrap_or(0)
    }

    pub fn corpus(&self) -> CorpusConfig {
        self.corpus.clone().unwrap_or_default()
    }

    pub fn framing(&self) -> FramingConfig {
        self.framing.clone().unwrap_or_default()
    }

    pub fn spectrum(&self) -> SpectrumConfig {
        self.spectrum.clone().unwrap_or_default()
    }

    pub fn model(&self) -> ModelConfig {
        self.model.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolkitConfig::default();
        assert_eq!(config.threads(), 0);
        assert_eq!(config.framing().frame_length(), 320.0);
        assert_eq!(config.framing().frame_step(), 160.0);
        assert_eq!(config.framing().preemphasis(), 0.97);
        assert_eq!(config.framing().window().unwrap(), Window::Hamming);
        assert_eq!(config.spectrum().nfft(), 512);
        assert!(!config.spectrum().power());
        assert_eq!(config.model().mixtures(), 32);
        assert_eq!(config.model().dimension(), 13);
        assert!(config.model().seed.is_none());
        assert!(config.corpus().root.is_none());
    }

    #[test]
    fn test_parse() {
        let config = ToolkitConfig::parse(
            r#"
            general threads=4
            corpus root="/data/corpora"
            framing frame-length=400.0 frame-step=200.0 preemphasis=0.95 window="hann"
            spectrum nfft=1024 power=true
            model mixtures=8 dimension=20 seed=99
            "#,
        )
        .unwrap();
        assert_eq!(config.threads(), 4);
        assert_eq!(config.corpus().root.as_deref(), Some("/data/corpora"));
        let framing = config.framing();
        assert_eq!(framing.frame_length(), 400.0);
        assert_eq!(framing.frame_step(), 200.0);
        assert_eq!(framing.preemphasis(), 0.95);
        assert_eq!(framing.window().unwrap(), Window::Hann);
        assert_eq!(config.spectrum().nfft(), 1024);
        assert!(config.spectrum().power());
        assert_eq!(config.model().mixtures(), 8);
        assert_eq!(config.model().dimension(), 20);
        assert_eq!(config.model().seed, Some(99));
    }

    #[test]
    fn test_partial() {
        let config = ToolkitConfig::parse("model seed=5").unwrap();
        assert_eq!(config.model().seed, Some(5));
        assert_eq!(config.model().mixtures(), 32);
        assert_eq!(config.framing().frame_length(), 320.0);
    }

    #[test]
    fn test_bad_window() {
        let config = ToolkitConfig::parse(r#"framing window="triangle""#).unwrap();
        assert!(config.framing().window().is_err());
    }

    #[test]
    fn test_framing_with_seconds() {
        let framing = ToolkitConfig::parse("framing frame-step=80.0").unwrap().framing();
        let scaled = framing.with_seconds(Some(0.025), None, 16000);
        assert_eq!(scaled.frame_length(), 400.0);
        assert_eq!(scaled.frame_step(), 80.0);
        assert_eq!(framing.with_seconds(None, None, 16000).frame_length(), 320.0);
    }
}
