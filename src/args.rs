use crate::util::{positive_f64_parser, positive_usize_parser};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spectral framing and GMM scoring for speaker recognition experiments.")]
pub struct Cli {
    /// KDL configuration file (defaults to the per-user config location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Frame geometry in seconds, overriding the sample counts from the config.
#[derive(Args, Clone, Default)]
pub struct FramingArgs {
    #[arg(long, value_parser = positive_f64_parser)]
    pub frame_secs: Option<f64>,
    #[arg(long, value_parser = positive_f64_parser)]
    pub step_secs: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print framing geometry for a signal
    Frames {
        id: String,
        #[command(flatten)]
        framing: FramingArgs,
    },
    /// Print the spectrum of one frame
    Spectrum {
        id: String,
        #[arg(long)]
        power: bool,
        #[arg(long, default_value_t = 0)]
        frame: usize,
        #[command(flatten)]
        framing: FramingArgs,
    },
    /// Score a signal's spectra against random mixtures
    Score {
        id: String,
        #[arg(long)]
        power: bool,
        #[arg(long, value_parser = positive_usize_parser)]
        mixtures: Option<usize>,
        #[arg(long, value_parser = positive_usize_parser)]
        dimension: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// One mixture for every frame instead of one per frame
        #[arg(long)]
        shared: bool,
        #[command(flatten)]
        framing: FramingArgs,
    },
}
