//! Diagonalization pipeline.
//!
//! Runs the four stages in order on one validated matrix:
//! characteristic polynomial → eigenvalues → eigenspaces → factorization.

use log::{debug, error, info};

use crate::charpoly::CharacteristicPolynomial;
use crate::config::EngineConfig;
use crate::eigenspace::{EigenspaceRecord, solve_eigenspaces};
use crate::error::{EngineError, Result};
use crate::factorization::{Factorization, assemble};
use crate::matrix::Matrix;
use crate::roots::{EigenvalueRecord, find_eigenvalues, root_finder};

/// Outcome of a diagonalization request.
///
/// `factorization` is `None` exactly when the matrix is not diagonalizable.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagonalization {
    /// One record per distinct eigenvalue, in eigenvalue order
    pub eigenspaces: Vec<EigenspaceRecord>,
    pub factorization: Option<Factorization>,
}

impl Diagonalization {
    pub fn is_diagonalizable(&self) -> bool {
        self.factorization.is_some()
    }

    /// Σ geometric multiplicities over all distinct eigenvalues.
    pub fn geometric_total(&self) -> usize {
        self.eigenspaces.iter().map(|s| s.geometric_multiplicity).sum()
    }

    pub fn eigenvalues(&self) -> impl Iterator<Item = &EigenvalueRecord> {
        self.eigenspaces.iter().map(|s| &s.eigenvalue)
    }
}

/// Stateless engine; one instance can serve any number of requests concurrently.
#[derive(Debug, Clone, Default)]
pub struct DiagonalizationEngine {
    config: EngineConfig,
}

impl DiagonalizationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate row-major input and diagonalize it.
    pub fn diagonalize_rows(&self, rows: &[Vec<f64>]) -> Result<Diagonalization> {
        let matrix = Matrix::from_rows(rows)?;
        self.diagonalize(&matrix)
    }

    /// det(A - λI) of the scale-normalised matrix A / scale.
    pub fn characteristic_polynomial(&self, matrix: &Matrix) -> Result<CharacteristicPolynomial> {
        CharacteristicPolynomial::from_matrix(&matrix.normalized())
    }

    pub fn diagonalize(&self, matrix: &Matrix) -> Result<Diagonalization> {
        let n = matrix.dim();
        if n > self.config.max_dimension {
            return Err(EngineError::invalid(format!(
                "Matrix size must be between 1 and {}",
                self.config.max_dimension
            )));
        }

        let tol = &self.config.tolerances;
        let scale = matrix.scale();
        debug!("diagonalizing {n}×{n} matrix, scale {scale:.3e}");

        let normalized = matrix.normalized();
        let poly = CharacteristicPolynomial::from_matrix(&normalized)?;
        debug!("characteristic polynomial of A/scale: {:?}", poly.coefficients());

        let finder = root_finder(&self.config);
        let eigenvalues = find_eigenvalues(&poly, &normalized, finder.as_ref(), &self.config, scale)?;

        let eigenspaces = solve_eigenspaces(
            matrix.as_dmatrix(),
            &eigenvalues,
            tol,
            scale,
            self.config.parallel_eigenspaces,
        )?;

        let factorization = assemble(matrix, &eigenspaces, tol).inspect_err(|err| {
            if let EngineError::IllFormedEigenbasis(detail) = err {
                error!("ill-formed eigenbasis for {n}×{n} input: {detail}");
            }
        })?;

        info!(
            "{n}×{n}: {} distinct eigenvalues, diagonalizable = {}",
            eigenspaces.len(),
            factorization.is_some()
        );

        Ok(Diagonalization {
            eigenspaces,
            factorization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::Scalar;

    #[test]
    fn rejects_oversized_matrix() {
        let engine = DiagonalizationEngine::new(EngineConfig {
            max_dimension: 2,
            ..Default::default()
        });
        let rows = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        let err = engine.diagonalize_rows(&rows).unwrap_err();
        assert_eq!(err, EngineError::invalid("Matrix size must be between 1 and 2"));
    }

    #[test]
    fn jordan_block_reports_eigenspace_but_no_factorization() {
        let engine = DiagonalizationEngine::default();
        let result = engine
            .diagonalize_rows(&[vec![1.0, 1.0], vec![0.0, 1.0]])
            .unwrap();
        assert!(!result.is_diagonalizable());
        assert_eq!(result.geometric_total(), 1);
        let values: Vec<_> = result.eigenvalues().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].algebraic_multiplicity, 2);
    }

    #[test]
    fn polynomial_is_built_from_the_normalised_matrix() {
        let engine = DiagonalizationEngine::default();
        let m = Matrix::from_rows(&[vec![4.0, 1.0], vec![2.0, 3.0]]).unwrap();
        // (λ - 5/4)(λ - 2/4)
        let poly = engine.characteristic_polynomial(&m).unwrap();
        let expected = [1.0, -1.75, 0.625];
        for (a, e) in poly.coefficients().iter().zip(expected) {
            assert!((a - e).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_matrix_is_trivially_diagonal() {
        let engine = DiagonalizationEngine::default();
        let result = engine
            .diagonalize_rows(&[vec![0.0, 0.0], vec![0.0, 0.0]])
            .unwrap();
        let f = result.factorization.unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let identity = if i == j { 1.0 } else { 0.0 };
                assert_eq!(f.p[(i, j)], Scalar::Real(identity));
                assert_eq!(f.d[(i, j)], Scalar::Real(0.0));
            }
        }
    }
}
