//! Validated square input matrix.

use nalgebra::DMatrix;

use crate::error::{EngineError, Result};

/// Immutable n×n matrix of finite real entries, n ≥ 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: DMatrix<f64>,
}

impl Matrix {
    /// Build a matrix from row-major rows, rejecting empty, ragged,
    /// non-square and non-finite input.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(EngineError::invalid("No matrix provided"));
        }
        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(EngineError::invalid(format!(
                    "Matrix must be square (row {} has {} entries, expected {})",
                    i + 1,
                    row.len(),
                    n
                )));
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(EngineError::invalid(format!(
                    "Matrix entry ({}, {}) is not a finite number",
                    i + 1,
                    j + 1
                )));
            }
        }

        Ok(Self {
            data: DMatrix::from_fn(n, n, |i, j| rows[i][j]),
        })
    }

    /// Wrap an existing nalgebra matrix after the same validation as `from_rows`.
    pub fn from_dmatrix(data: DMatrix<f64>) -> Result<Self> {
        if data.is_empty() {
            return Err(EngineError::invalid("No matrix provided"));
        }
        if !data.is_square() {
            return Err(EngineError::invalid(format!(
                "Matrix must be square (got {}×{})",
                data.nrows(),
                data.ncols()
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::invalid("Matrix entries must be finite numbers"));
        }
        Ok(Self { data })
    }

    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    pub fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.data
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }

    /// Largest absolute entry, or 1 for the zero matrix.
    pub fn scale(&self) -> f64 {
        let max = self.data.amax();
        if max > 0.0 { max } else { 1.0 }
    }

    /// The matrix divided by its scale.
    pub fn normalized(&self) -> DMatrix<f64> {
        &self.data / self.scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_square_rows() {
        let m = Matrix::from_rows(&[vec![4.0, 1.0], vec![2.0, 3.0]]).unwrap();
        assert_eq!(m.dim(), 2);
        assert_eq!(m.as_dmatrix()[(1, 0)], 2.0);
        assert_eq!(m.rows(), vec![vec![4.0, 1.0], vec![2.0, 3.0]]);
        assert_eq!(m.scale(), 4.0);
    }

    #[test]
    fn rejects_empty_input() {
        let err = Matrix::from_rows(&[]).unwrap_err();
        assert_eq!(err, EngineError::invalid("No matrix provided"));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(err.to_string().starts_with("Matrix must be square"));
    }

    #[test]
    fn rejects_non_square_shape() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap_err();
        assert!(err.is_client_error());

        let err = Matrix::from_dmatrix(DMatrix::zeros(2, 3)).unwrap_err();
        assert!(err.to_string().contains("2×3"));
    }

    #[test]
    fn rejects_non_finite_entries() {
        let err = Matrix::from_rows(&[vec![1.0, f64::NAN], vec![0.0, 1.0]]).unwrap_err();
        assert!(err.to_string().contains("(1, 2)"));

        let err = Matrix::from_rows(&[vec![f64::INFINITY]]).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn zero_matrix_has_unit_scale() {
        let m = Matrix::from_rows(&[vec![0.0, 0.0], vec![0.0, 0.0]]).unwrap();
        assert_eq!(m.scale(), 1.0);
        assert_eq!(m.normalized(), DMatrix::zeros(2, 2));
    }
}
