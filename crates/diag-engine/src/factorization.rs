//! Factorization assembler.
//!
//! Decides diagonalizability (Σ geometric multiplicities == n), stacks the
//! eigenvector bases into P in eigenvalue order, places the matching
//! eigenvalues on the diagonal of D, inverts P and recomputes P·D·P⁻¹.
//! The recomputed matrix is compared against A; a factorization that does
//! not reproduce its input is never returned.

use log::{error, info};
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::config::Tolerances;
use crate::eigenspace::EigenspaceRecord;
use crate::elimination::{invert, to_complex};
use crate::error::{EngineError, Result};
use crate::matrix::Matrix;
use crate::scalar::{ScalarMatrix, collapse_matrix};

/// A verified A = P·D·P⁻¹.
#[derive(Debug, Clone, PartialEq)]
pub struct Factorization {
    /// Eigenvectors as columns
    pub p: ScalarMatrix,
    /// Eigenvalues on the diagonal, in the column order of `p`
    pub d: ScalarMatrix,
    pub p_inverse: ScalarMatrix,
    /// P·D·P⁻¹ as recomputed from the three factors
    pub verification: ScalarMatrix,
    /// Largest cellwise |P·D·P⁻¹ - A|
    pub max_deviation: f64,
}

/// Assemble P and D from the eigenspaces, or `None` when some eigenvalue is defective.
pub fn assemble(
    matrix: &Matrix,
    spaces: &[EigenspaceRecord],
    tol: &Tolerances,
) -> Result<Option<Factorization>> {
    let n = matrix.dim();
    let scale = matrix.scale();
    let total: usize = spaces.iter().map(|s| s.geometric_multiplicity).sum();

    if total > n {
        error!("eigenspaces hold {total} vectors for a {n}×{n} matrix");
        return Err(EngineError::ill_formed(format!(
            "geometric multiplicities sum to {total}, more than the dimension {n}"
        )));
    }
    if total < n {
        let defective: Vec<String> = spaces
            .iter()
            .filter(|s| s.is_defective())
            .map(|s| {
                format!(
                    "{} (algebraic {}, geometric {})",
                    s.eigenvalue.value.to_complex(),
                    s.eigenvalue.algebraic_multiplicity,
                    s.geometric_multiplicity
                )
            })
            .collect();
        info!("not diagonalizable, defective eigenvalues: {}", defective.join(", "));
        return Ok(None);
    }

    let mut p = DMatrix::<Complex64>::zeros(n, n);
    let mut d = DMatrix::<Complex64>::zeros(n, n);
    let mut column = 0;
    for space in spaces {
        let lambda = space.eigenvalue.value.to_complex();
        for v in &space.basis {
            p.set_column(column, v);
            d[(column, column)] = lambda;
            column += 1;
        }
    }

    let p_inverse = invert(&p, tol.pivot).map_err(|pivot| {
        error!(
            "eigenvector matrix is singular: pivot {:.3e} in column {} (threshold {:.3e})",
            pivot.magnitude, pivot.column, tol.pivot
        );
        EngineError::ill_formed(format!(
            "eigenvector matrix P is singular at column {}",
            pivot.column
        ))
    })?;

    let verification = &p * &d * &p_inverse;
    let original = to_complex(matrix.as_dmatrix());
    let max_deviation = (&verification - &original)
        .iter()
        .map(|z| z.norm())
        .fold(0.0, f64::max);

    let limit = tol.reconstruction * scale;
    if max_deviation > limit {
        error!(
            "P·D·P⁻¹ deviates from A by {max_deviation:.3e} (limit {limit:.3e})"
        );
        return Err(EngineError::ill_formed(format!(
            "reconstruction deviates from the input by {max_deviation:.3e}"
        )));
    }

    info!("diagonalizable, reconstruction deviation {max_deviation:.3e}");

    // D holds exact values, P has unit columns, the reconstruction is relative to A
    Ok(Some(Factorization {
        p: collapse_matrix(&p, tol.eigen),
        d: collapse_matrix(&d, f64::MIN_POSITIVE),
        p_inverse: collapse_matrix(&p_inverse, tol.eigen),
        verification: collapse_matrix(&verification, tol.eigen * scale),
        max_deviation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roots::EigenvalueRecord;
    use crate::scalar::Scalar;
    use nalgebra::DVector;

    fn space(value: f64, algebraic: usize, basis: Vec<Vec<f64>>) -> EigenspaceRecord {
        EigenspaceRecord {
            eigenvalue: EigenvalueRecord {
                value: Scalar::Real(value),
                algebraic_multiplicity: algebraic,
                spread: 0.0,
            },
            geometric_multiplicity: basis.len(),
            basis: basis
                .into_iter()
                .map(|v| DVector::from_iterator(v.len(), v.into_iter().map(|x| Complex64::new(x, 0.0))))
                .collect(),
        }
    }

    #[test]
    fn assembles_columns_in_eigenvalue_order() {
        let a = Matrix::from_rows(&[vec![3.0, 0.0], vec![0.0, 7.0]]).unwrap();
        let spaces = vec![
            space(7.0, 1, vec![vec![0.0, 1.0]]),
            space(3.0, 1, vec![vec![1.0, 0.0]]),
        ];
        let f = assemble(&a, &spaces, &Tolerances::default()).unwrap().unwrap();
        assert_eq!(f.d[(0, 0)], Scalar::Real(7.0));
        assert_eq!(f.d[(1, 1)], Scalar::Real(3.0));
        assert_eq!(f.d[(0, 1)], Scalar::Real(0.0));
        assert_eq!(f.p[(1, 0)], Scalar::Real(1.0));
        assert_eq!(f.p[(0, 1)], Scalar::Real(1.0));
        assert!(f.max_deviation < 1e-12);
        assert_eq!(f.verification[(1, 1)], Scalar::Real(7.0));
    }

    #[test]
    fn defective_eigenspace_is_not_diagonalizable() {
        let a = Matrix::from_rows(&[vec![1.0, 1.0], vec![0.0, 1.0]]).unwrap();
        let spaces = vec![space(1.0, 2, vec![vec![1.0, 0.0]])];
        assert!(assemble(&a, &spaces, &Tolerances::default()).unwrap().is_none());
    }

    #[test]
    fn duplicated_eigenvector_is_ill_formed() {
        let a = Matrix::from_rows(&[vec![2.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let spaces = vec![
            space(2.0, 1, vec![vec![1.0, 0.0]]),
            space(1.0, 1, vec![vec![1.0, 0.0]]),
        ];
        let err = assemble(&a, &spaces, &Tolerances::default()).unwrap_err();
        assert!(matches!(err, EngineError::IllFormedEigenbasis(_)));
    }

    #[test]
    fn wrong_eigenpair_fails_reconstruction() {
        let a = Matrix::from_rows(&[vec![2.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let spaces = vec![
            space(5.0, 1, vec![vec![1.0, 0.0]]),
            space(1.0, 1, vec![vec![0.0, 1.0]]),
        ];
        let err = assemble(&a, &spaces, &Tolerances::default()).unwrap_err();
        assert!(err.to_string().contains("reconstruction"));
    }

    #[test]
    fn too_many_eigenvectors_is_ill_formed() {
        let a = Matrix::from_rows(&[vec![1.0]]).unwrap();
        let spaces = vec![space(1.0, 1, vec![vec![1.0], vec![1.0]])];
        assert!(matches!(
            assemble(&a, &spaces, &Tolerances::default()),
            Err(EngineError::IllFormedEigenbasis(_))
        ));
    }
}
