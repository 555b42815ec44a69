use std::borrow::Borrow;

use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::gmm::MixtureModel;

/// Average base-10 log-likelihood of `features[i]` under `models[i]`:
/// `(1/T) Σ log10(p_i)`.
///
/// Densities are evaluated in parallel and summed in frame order. Any frame
/// whose density is not strictly positive aborts the whole score.
pub fn score_sequence<M, F>(models: &[M], features: &[F]) -> Result<f64>
where
    M: Borrow<MixtureModel> + Sync,
    F: AsRef<[f64]> + Sync,
{
    if models.len() != features.len() {
        return Err(Error::DimensionMismatch {
            expected: models.len(),
            found: features.len(),
        });
    }
    if features.is_empty() {
        return Err(Error::EmptySequence);
    }

    let log_probs: Vec<f64> = models
        .par_iter()
        .zip(features.par_iter())
        .enumerate()
        .map(|(index, (model, x))| {
            let density = model.borrow().evaluate(x.as_ref())?;
            if density.is_nan() || density <= 0.0 {
                return Err(Error::NonPositiveDensity { index, density });
            }
            Ok(density.log10())
        })
        .collect::<Result<_>>()?;

    let frames = log_probs.len();
    let score = (1.0 / frames as f64) * log_probs.iter().sum::<f64>();
    debug!("Scored {} frames: average log10 likelihood {:.6}", frames, score);
    Ok(score)
}

/// `score_sequence` with one model shared by every frame.
pub fn score_against<F>(model: &MixtureModel, features: &[F]) -> Result<f64>
where
    F: AsRef<[f64]> + Sync,
{
    let models = vec![model; features.len()];
    score_sequence(&models, features)
}
