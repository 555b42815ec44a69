use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::config::CorpusConfig;
use crate::sigproc::Signal;

/// Supplies signals by identifier (a speaker/session name, a file name...).
pub trait SignalSource {
    fn read_signal(&self, id: &str) -> Result<Signal>;
}

/// Supplies one feature vector per frame by identifier.
pub trait FeatureSource {
    fn read_features(&self, id: &str) -> Result<Vec<Vec<f64>>>;
}

/// Decodes audio files with symphonia, resolving identifiers against an
/// optional root directory. Multi-channel audio is averaged to mono.
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn from_config(corpus: &CorpusConfig) -> Self {
        Self::new(corpus.root.as_ref().map(PathBuf::from))
    }

    pub fn resolve(&self, id: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(id),
            None => PathBuf::from(id),
        }
    }
}

impl SignalSource for FileSource {
    fn read_signal(&self, id: &str) -> Result<Signal> {
        load_signal(self.resolve(id))
    }
}

pub fn downmix(interleaved: &[f64], channels: usize) -> Vec<f64> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|chunk| chunk.iter().sum::<f64>() / channels as f64)
        .collect()
}

pub fn load_signal<P: AsRef<Path>>(path: P) -> Result<Signal> {
    let path = path.as_ref();
    info!("Loading audio from {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(ReadOnlySource::new(BufReader::new(file))), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio format")?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No supported audio tracks found")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Audio track has no sample rate")?;
    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                debug!("Decoder reset required");
                continue;
            }
            Err(_) => break,
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let duration = decoded.capacity() as u64;
                if duration == 0 {
                    continue;
                }
                let mut buf = SampleBuffer::<f64>::new(duration, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend(downmix(buf.samples(), spec.channels.count()));
            }
            Err(SymphoniaError::DecodeError(_)) => {
                debug!("Decode error encountered, skipping packet");
                continue;
            }
            Err(e) => return Err(anyhow::anyhow!("Decode error: {}", e)),
        }
    }

    info!("Loaded {} samples at {}Hz", samples.len(), sample_rate);
    Ok(Signal::new(samples, sample_rate))
}
