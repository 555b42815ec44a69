use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

use crate::error::{Error, Result};

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Square covariance from row vectors. Ragged rows are a dimension mismatch.
pub fn covariance_from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let dim = rows.len();
    if let Some(row) = rows.iter().find(|row| row.len() != dim) {
        return Err(Error::DimensionMismatch { expected: dim, found: row.len() });
    }
    let data: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(dim, dim, &data))
}

pub fn diagonal_covariance(diag: &[f64]) -> DMatrix<f64> {
    DMatrix::from_diagonal(&DVector::from_column_slice(diag))
}

/// Cholesky factor `L Lᵀ = Σ` of a covariance.
pub struct CovarianceFactor {
    chol: Cholesky<f64, Dyn>,
}

impl CovarianceFactor {
    /// Fails unless `covariance` is square, finite, symmetric and
    /// positive-definite. The decomposition only reads the lower triangle,
    /// so symmetry is checked here first.
    pub fn new(covariance: &DMatrix<f64>) -> Result<Self> {
        let n = covariance.nrows();
        if covariance.ncols() != n {
            return Err(Error::DimensionMismatch { expected: n, found: covariance.ncols() });
        }
        for i in 0..n {
            for j in 0..=i {
                let (a, b) = (covariance[(i, j)], covariance[(j, i)]);
                if !a.is_finite() || !b.is_finite() {
                    return Err(Error::DegenerateCovariance(format!(
                        "non-finite entry at ({}, {})",
                        i, j
                    )));
                }
                let scale = a.abs().max(b.abs()).max(1.0);
                if (a - b).abs() > SYMMETRY_TOLERANCE * scale {
                    return Err(Error::DegenerateCovariance(format!(
                        "not symmetric at ({}, {}): {} vs {}",
                        i, j, a, b
                    )));
                }
            }
        }

        let chol = covariance
            .clone()
            .cholesky()
            .ok_or_else(|| Error::DegenerateCovariance("not positive-definite".to_string()))?;
        if let Some(pivot) = chol.l_dirty().diagonal().iter().find(|p| p.is_nan() || **p <= 0.0) {
            return Err(Error::DegenerateCovariance(format!(
                "not positive-definite (pivot {})",
                pivot
            )));
        }
        Ok(Self { chol })
    }

    pub fn dim(&self) -> usize {
        self.chol.l_dirty().nrows()
    }

    pub fn log_determinant(&self) -> f64 {
        2.0 * self.chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>()
    }

    pub fn determinant(&self) -> f64 {
        self.log_determinant().exp()
    }

    /// `vᵀ Σ⁻¹ v`, by solving `L z = v` and taking `zᵀ z`.
    pub fn mahalanobis(&self, v: &[f64]) -> Result<f64> {
        if v.len() != self.dim() {
            return Err(Error::DimensionMismatch { expected: self.dim(), found: v.len() });
        }
        let z = self
            .chol
            .l_dirty()
            .solve_lower_triangular(&DVector::from_column_slice(v))
            .ok_or_else(|| Error::DegenerateCovariance("singular factor".to_string()))?;
        Ok(z.norm_squared())
    }
}
