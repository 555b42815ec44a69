pub mod args;
pub mod audio;
pub mod config;
pub mod error;
pub mod features;
pub mod gmm;
pub mod pipeline;
pub mod sigproc;
pub mod util;

pub use error::{Error, Result};
