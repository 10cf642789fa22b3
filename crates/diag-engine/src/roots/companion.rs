//! Companion-matrix root finder.
//!
//! The roots of a monic polynomial x^n + a_1 x^(n-1) + ... + a_n are the
//! eigenvalues of its companion matrix
//!
//! ```text
//! | -a_1  -a_2  ...  -a_(n-1)  -a_n |
//! |  1     0    ...   0         0   |
//! |  0     1    ...   0         0   |
//! |  ...                            |
//! |  0     0    ...   1         0   |
//! ```
//!
//! which nalgebra's real Schur decomposition (Hessenberg reduction followed by
//! implicitly double-shifted QR sweeps) extracts as real values and exact
//! complex-conjugate pairs.

use nalgebra::DMatrix;
use nalgebra::linalg::Schur;
use num_complex::Complex64;

use super::traits::*;
use crate::charpoly::Polynomial;
use crate::error::{EngineError, Result};

/// Companion matrix eigenvalues via the real Schur form.
pub struct CompanionQr {
    /// Maximum number of QR sweeps before giving up
    pub max_iterations: usize,
}

impl Default for CompanionQr {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }
}

/// Build the companion matrix of a polynomial, normalising it to monic first.
pub fn companion_matrix(poly: &Polynomial) -> Result<DMatrix<f64>> {
    let monic = poly.to_monic()?;
    let a = monic.coefficients();
    let n = monic.degree();

    let mut companion = DMatrix::zeros(n, n);
    for j in 0..n {
        companion[(0, j)] = -a[j + 1];
    }
    for i in 1..n {
        companion[(i, i - 1)] = 1.0;
    }
    Ok(companion)
}

impl RootFinder for CompanionQr {
    fn find_roots(&self, poly: &Polynomial) -> Result<(Vec<Complex64>, SolveInfo)> {
        let info = SolveInfo {
            iterations: 0,
            method: self.name().to_string(),
        };

        let n = poly.degree();
        if n == 0 {
            return Ok((Vec::new(), info));
        }

        let companion = companion_matrix(poly)?;
        if n == 1 {
            return Ok((vec![Complex64::new(companion[(0, 0)], 0.0)], info));
        }

        // max_niter = 0 means "unbounded" to nalgebra
        let budget = self.max_iterations.max(1);
        let schur = Schur::try_new(companion, f64::EPSILON, budget).ok_or_else(|| {
            EngineError::non_convergence(
                "companion QR",
                format!("Schur decomposition of the degree-{n} companion matrix exceeded {budget} sweeps"),
            )
        })?;

        let roots: Vec<Complex64> = schur.complex_eigenvalues().iter().copied().collect();
        if roots.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
            return Err(EngineError::non_convergence(
                "companion QR",
                "Schur decomposition produced non-finite eigenvalues",
            ));
        }

        Ok((roots, info))
    }

    fn name(&self) -> &str {
        "nalgebra-Schur"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_by_re(mut roots: Vec<Complex64>) -> Vec<Complex64> {
        roots.sort_by(|a, b| {
            if (a.re - b.re).abs() > 1e-6 {
                a.re.total_cmp(&b.re)
            } else {
                a.im.total_cmp(&b.im)
            }
        });
        roots
    }

    #[test]
    fn companion_layout() {
        // x² - 7x + 10
        let c = companion_matrix(&Polynomial::new(vec![1.0, -7.0, 10.0])).unwrap();
        assert_eq!(c, DMatrix::from_row_slice(2, 2, &[7.0, -10.0, 1.0, 0.0]));
    }

    #[test]
    fn companion_normalises_leading_coefficient() {
        // -(x - 2) = -x + 2
        let c = companion_matrix(&Polynomial::new(vec![-1.0, 2.0])).unwrap();
        assert_eq!(c[(0, 0)], 2.0);
    }

    #[test]
    fn finds_real_roots() {
        let finder = CompanionQr::default();
        let (roots, info) = finder
            .find_roots(&Polynomial::new(vec![1.0, -6.0, 11.0, -6.0]))
            .unwrap();
        assert_eq!(info.method, "nalgebra-Schur");
        let roots = sorted_by_re(roots);
        for (root, expected) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert!((root.re - expected).abs() < 1e-9);
            assert!(root.im.abs() < 1e-9);
        }
    }

    #[test]
    fn finds_conjugate_pair() {
        // x² + 1
        let finder = CompanionQr::default();
        let (roots, _) = finder
            .find_roots(&Polynomial::new(vec![1.0, 0.0, 1.0]))
            .unwrap();
        let roots = sorted_by_re(roots);
        assert_eq!(roots.len(), 2);
        assert!(roots[0].re.abs() < 1e-12);
        assert!((roots[0].im.abs() - 1.0).abs() < 1e-12);
        assert_eq!(roots[0], roots[1].conj());
    }

    #[test]
    fn linear_polynomial() {
        let (roots, _) = CompanionQr::default()
            .find_roots(&Polynomial::new(vec![-1.0, 3.5]))
            .unwrap();
        assert_eq!(roots, vec![Complex64::new(3.5, 0.0)]);
    }
}
