use std::f64::consts::PI;

use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::gmm::CovarianceFactor;

/// Natural log of the multivariate normal pdf
/// `(2π)^(-D/2) |Σ|^(-1/2) exp(-½ (x-μ)ᵀ Σ⁻¹ (x-μ))`.
pub fn log_density(x: &[f64], mean: &[f64], covariance: &DMatrix<f64>) -> Result<f64> {
    let d = x.len();
    if mean.len() != d {
        return Err(Error::DimensionMismatch { expected: d, found: mean.len() });
    }
    if covariance.nrows() != d {
        return Err(Error::DimensionMismatch { expected: d, found: covariance.nrows() });
    }

    let factor = CovarianceFactor::new(covariance)?;
    let diff: Vec<f64> = x.iter().zip(mean).map(|(a, m)| a - m).collect();
    let exponent = factor.mahalanobis(&diff)?;

    Ok(-0.5 * (d as f64 * (2.0 * PI).ln() + factor.log_determinant() + exponent))
}

/// Multivariate normal pdf of `x`. Full covariances are supported; `covariance`
/// must be symmetric positive-definite.
pub fn density(x: &[f64], mean: &[f64], covariance: &DMatrix<f64>) -> Result<f64> {
    log_density(x, mean, covariance).map(f64::exp)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianComponent {
    pub mean: Vec<f64>,
    pub covariance: DMatrix<f64>,
}

impl GaussianComponent {
    /// The covariance is not checked here; a degenerate one fails on evaluation.
    pub fn new(mean: Vec<f64>, covariance: DMatrix<f64>) -> Self {
        Self { mean, covariance }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn density(&self, x: &[f64]) -> Result<f64> {
        density(x, &self.mean, &self.covariance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmm::{covariance_from_rows, diagonal_covariance};

    #[test]
    fn test_standard_normal() {
        let p = density(&[0.0], &[0.0], &DMatrix::identity(1, 1)).unwrap();
        assert!((p - 1.0 / (2.0 * PI).sqrt()).abs() < 1e-15);

        let p = density(&[1.0, 1.0], &[0.0, 0.0], &DMatrix::identity(2, 2)).unwrap();
        assert!((p - (-1.0_f64).exp() / (2.0 * PI)).abs() < 1e-15);
    }

    #[test]
    fn test_full_covariance() {
        // det = 1.75, inverse = [[1, -0.5], [-0.5, 2]] / 1.75
        let cov = covariance_from_rows(&[vec![2.0, 0.5], vec![0.5, 1.0]]).unwrap();
        let p = density(&[1.0, -1.0], &[0.0, 0.0], &cov).unwrap();
        let quad: f64 = (1.0 + 1.0 + 2.0) / 1.75;
        let expected = (-0.5 * quad).exp() / (2.0 * PI * 1.75_f64.sqrt());
        assert!((p - expected).abs() < 1e-14);
    }

    #[test]
    fn test_symmetric_about_mean() {
        let mean = [5.0, 7.0, 9.0];
        let cov = diagonal_covariance(&[150.0, 200.0, 290.0]);
        let delta = [3.0, -12.5, 0.75];
        let plus: Vec<f64> = mean.iter().zip(&delta).map(|(m, d)| m + d).collect();
        let minus: Vec<f64> = mean.iter().zip(&delta).map(|(m, d)| m - d).collect();
        assert_eq!(
            density(&plus, &mean, &cov).unwrap(),
            density(&minus, &mean, &cov).unwrap()
        );
    }

    #[test]
    fn test_integrates_to_one_1d() {
        let cov = diagonal_covariance(&[2.5]);
        let mean = [0.3];
        let step = 1e-3;
        let total: f64 = (-20_000..=20_000)
            .map(|i| density(&[i as f64 * step], &mean, &cov).unwrap() * step)
            .sum();
        assert!((total - 1.0).abs() < 1e-6, "integral = {}", total);
    }

    #[test]
    fn test_integrates_to_one_2d() {
        let cov = covariance_from_rows(&[vec![2.0, 0.5], vec![0.5, 1.0]]).unwrap();
        let mean = [0.5, -0.25];
        let step = 0.05;
        let mut total = 0.0;
        for i in -240..=240 {
            for j in -240..=240 {
                let x = [i as f64 * step, j as f64 * step];
                total += density(&x, &mean, &cov).unwrap() * step * step;
            }
        }
        assert!((total - 1.0).abs() < 1e-4, "integral = {}", total);
    }

    #[test]
    fn test_dimension_mismatch() {
        let cov = DMatrix::identity(2, 2);
        assert_eq!(
            density(&[0.0, 0.0], &[0.0], &cov),
            Err(Error::DimensionMismatch { expected: 2, found: 1 })
        );
        assert_eq!(
            density(&[0.0, 0.0, 0.0], &[0.0, 0.0, 0.0], &cov),
            Err(Error::DimensionMismatch { expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_degenerate_covariance() {
        let singular = covariance_from_rows(&[vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let component = GaussianComponent::new(vec![0.0, 0.0], singular);
        assert!(matches!(
            component.density(&[0.0, 0.0]),
            Err(Error::DegenerateCovariance(_))
        ));
    }
}
