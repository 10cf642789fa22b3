//! Refinement of polynomial roots against the matrix.
//!
//! Roots of the characteristic polynomial inherit the conditioning of its
//! coefficients, which for clustered spectra is far worse than that of the
//! eigenvalues themselves. The real Schur form of A / scale yields
//! backward-stable eigenvalues (exact for triangular input). They replace the
//! polynomial roots when every one of them is a pseudo-zero of the
//! polynomial; otherwise the polynomial roots are kept.

use log::{debug, warn};
use nalgebra::DMatrix;
use nalgebra::linalg::Schur;
use num_complex::Complex64;

use crate::charpoly::Polynomial;
use crate::config::Tolerances;

/// Eigenvalues of `a` from its real Schur form, or `None` if the QR sweeps
/// do not converge within `max_iterations`.
pub fn schur_eigenvalues(a: &DMatrix<f64>, max_iterations: usize) -> Option<Vec<Complex64>> {
    if a.is_empty() {
        return Some(Vec::new());
    }
    // max_niter = 0 means "unbounded" to nalgebra
    let schur = Schur::try_new(a.clone(), f64::EPSILON, max_iterations.max(1))?;
    let values: Vec<Complex64> = schur.complex_eigenvalues().iter().copied().collect();
    let finite = values.iter().all(|z| z.re.is_finite() && z.im.is_finite());
    finite.then_some(values)
}

/// |p(z)| relative to Σ |c_i| |z|^i.
fn relative_residual(poly: &Polynomial, z: Complex64) -> f64 {
    let modulus = z.norm();
    let magnitude = poly
        .coefficients()
        .iter()
        .fold(0.0, |acc, c| acc * modulus + c.abs());
    if magnitude == 0.0 {
        return 0.0;
    }
    poly.eval(z).norm() / magnitude
}

/// Root estimates used for clustering, and whether they came from the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedRoots {
    pub roots: Vec<Complex64>,
    pub from_matrix: bool,
}

/// Replace `roots` of `poly` by the eigenvalues of `a` when the two agree.
///
/// `zeros` roots were deflated as exact zeros; that many eigenvalues of
/// smallest modulus are snapped to zero when within `tol.eigen`.
pub fn refine_roots(
    roots: Vec<Complex64>,
    a: &DMatrix<f64>,
    poly: &Polynomial,
    zeros: usize,
    tol: &Tolerances,
    max_iterations: usize,
) -> RefinedRoots {
    let keep = |roots: Vec<Complex64>| RefinedRoots {
        roots,
        from_matrix: false,
    };

    let Some(mut values) = schur_eigenvalues(a, max_iterations) else {
        warn!("Schur form of the matrix did not converge, clustering polynomial roots");
        return keep(roots);
    };
    if values.len() != roots.len() {
        warn!(
            "matrix has {} eigenvalues but the polynomial {} roots",
            values.len(),
            roots.len()
        );
        return keep(roots);
    }

    let worst = values
        .iter()
        .map(|&z| relative_residual(poly, z))
        .fold(0.0, f64::max);
    if worst > tol.pivot {
        warn!(
            "matrix eigenvalues are not roots of the characteristic polynomial (relative residual {worst:.3e}), clustering polynomial roots"
        );
        return keep(roots);
    }

    values.sort_by(|a, b| a.norm().total_cmp(&b.norm()));
    for z in values.iter_mut().take(zeros) {
        if z.norm() <= tol.eigen {
            *z = Complex64::new(0.0, 0.0);
        }
    }

    let drift = values
        .iter()
        .map(|v| roots.iter().map(|r| (v - r).norm()).fold(f64::INFINITY, f64::min))
        .fold(0.0, f64::max);
    debug!("matrix eigenvalues within {drift:.3e} of the polynomial roots");

    RefinedRoots {
        roots: values,
        from_matrix: true,
    }
}
