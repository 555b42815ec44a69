//! Gaussian mixture scoring: densities, mixtures and sequence log-likelihood.

pub mod density;
pub mod linalg;
pub mod mixture;
pub mod scorer;

pub use density::{density, log_density, GaussianComponent};
pub use linalg::{covariance_from_rows, diagonal_covariance, CovarianceFactor};
pub use mixture::{MixtureEstimator, MixtureModel, RandomMixtureInitializer, WEIGHT_TOLERANCE};
pub use scorer::{score_against, score_sequence};
