use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use speakid::args::{Cli, Commands, FramingArgs};
use speakid::audio::{FeatureSource, FileSource, SignalSource};
use speakid::config::{FramingConfig, ToolkitConfig};
use speakid::features::SpectralFeatureSource;
use speakid::gmm::{score_against, score_sequence, MixtureModel, RandomMixtureInitializer};
use speakid::pipeline::SpectralPipeline;
use speakid::sigproc::Signal;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn framing_for(config: &ToolkitConfig, args: &FramingArgs, signal: &Signal) -> FramingConfig {
    config
        .framing()
        .with_seconds(args.frame_secs, args.step_secs, signal.sample_rate)
}

fn compute_spectra(pipeline: &SpectralPipeline, signal: &Signal, power: bool) -> Result<Vec<Vec<f64>>> {
    let spectra = if power {
        pipeline.power_spectra(&signal.samples)?
    } else {
        pipeline.magnitude_spectra(&signal.samples)?
    };
    Ok(spectra)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = ToolkitConfig::resolve(cli.config.as_deref())?;

    if config.threads() > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads())
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let source = FileSource::from_config(&config.corpus());
    let spectrum_config = config.spectrum();

    match cli.command {
        Commands::Frames { id, framing } => {
            let signal = source.read_signal(&id)?;
            let pipeline = SpectralPipeline::from_config(&framing_for(&config, &framing, &signal), &spectrum_config)?;
            let frames = pipeline.frames(&signal.samples)?;
            println!("sample rate: {} Hz", signal.sample_rate);
            println!("samples: {} ({:.3} s)", signal.len(), signal.duration_secs());
            println!("frames: {} x {} (step {})", frames.len(), frames.frame_len(), frames.frame_step());
        }
        Commands::Spectrum { id, power, frame, framing } => {
            let signal = source.read_signal(&id)?;
            let pipeline = SpectralPipeline::from_config(&framing_for(&config, &framing, &signal), &spectrum_config)?;
            let spectra = compute_spectra(&pipeline, &signal, power || spectrum_config.power())?;
            let row = spectra
                .get(frame)
                .with_context(|| format!("Frame {} out of range ({} frames)", frame, spectra.len()))?;
            let freqs = pipeline.analyzer().bin_frequencies(signal.sample_rate);
            for (f, v) in freqs.iter().zip(row) {
                println!("{:.2}\t{:.6e}", f, v);
            }
        }
        Commands::Score { id, power, mixtures, dimension, seed, shared, framing } => {
            let model_config = config.model();
            let mixtures = mixtures.unwrap_or(model_config.mixtures());
            let dimension = dimension.unwrap_or(model_config.dimension());

            let mut spectrum_config = spectrum_config;
            spectrum_config.power = Some(power || spectrum_config.power());
            let features = SpectralFeatureSource::new(source, config.framing(), spectrum_config, dimension)
                .with_seconds(framing.frame_secs, framing.step_secs)
                .read_features(&id)?;

            let mut init = match seed.or(model_config.seed) {
                Some(seed) => RandomMixtureInitializer::from_seed(seed),
                None => RandomMixtureInitializer::from_entropy(),
            };

            let logprob = if shared {
                let model = init.create_model(mixtures, dimension)?;
                score_against(&model, &features)?
            } else {
                let models = (0..features.len())
                    .map(|_| init.create_model(mixtures, dimension))
                    .collect::<speakid::Result<Vec<MixtureModel>>>()?;
                score_sequence(&models, &features)?
            };

            println!("T = {} M = {} D = {}", features.len(), mixtures, dimension);
            println!("logprob = {}", logprob);
        }
    }

    Ok(())
}
