use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::gmm::{diagonal_covariance, GaussianComponent};

/// Allowed drift of the weight sum away from 1.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Weighted sum of Gaussian components. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureModel {
    components: Vec<(f64, GaussianComponent)>,
}

impl MixtureModel {
    /// Every weight must lie in (0, 1] and the weights must sum to 1.
    pub fn new(components: Vec<(f64, GaussianComponent)>) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::EmptyMixture);
        }
        let sum: f64 = components.iter().map(|(w, _)| w).sum();
        let in_range = components.iter().all(|&(w, _)| w > 0.0 && w <= 1.0);
        if !in_range || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::InvalidWeights { sum });
        }
        Ok(Self { components })
    }

    pub fn single(component: GaussianComponent) -> Self {
        Self { components: vec![(1.0, component)] }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[(f64, GaussianComponent)] {
        &self.components
    }

    /// `Σ_k w_k N(x; μ_k, Σ_k)`. A density, so it may exceed 1. The first
    /// failing component aborts the evaluation.
    pub fn evaluate(&self, x: &[f64]) -> Result<f64> {
        self.components
            .iter()
            .try_fold(0.0, |acc, (weight, component)| Ok(acc + weight * component.density(x)?))
    }
}

/// Parameter estimation from feature data.
///
/// The crate ships no estimator. Implementors (EM training, for instance)
/// plug in here and may produce full covariances.
pub trait MixtureEstimator {
    fn fit(&mut self, features: &[Vec<f64>]) -> Result<MixtureModel>;
}

/// Random placeholder models for experiments. This is not training: the
/// parameters never look at any data.
///
/// Weights are drawn from [1, 10] and normalised, means from [5, 10] and
/// diagonal covariances from [50·D, 100·D), which keeps them
/// positive-definite.
pub struct RandomMixtureInitializer<R = StdRng> {
    rng: R,
}

impl RandomMixtureInitializer<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomMixtureInitializer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn create_model(&mut self, mixtures: usize, dim: usize) -> Result<MixtureModel> {
        if mixtures == 0 {
            return Err(Error::EmptyMixture);
        }
        if dim == 0 {
            return Err(Error::ZeroDimension);
        }

        let raw: Vec<f64> = (0..mixtures).map(|_| self.rng.gen_range(1.0..=10.0)).collect();
        let total: f64 = raw.iter().sum();

        let d = dim as f64;
        let components = raw
            .into_iter()
            .map(|w| {
                let mean: Vec<f64> = (0..dim).map(|_| self.rng.gen_range(5.0..=10.0)).collect();
                let diag: Vec<f64> = (0..dim)
                    .map(|_| self.rng.gen_range(50.0 * d..100.0 * d))
                    .collect();
                (w / total, GaussianComponent::new(mean, diagonal_covariance(&diag)))
            })
            .collect();

        debug!("Random mixture: M={}, D={}", mixtures, dim);
        MixtureModel::new(components)
    }
}
