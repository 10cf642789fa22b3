//! Eigenspace solver.
//!
//! For each distinct eigenvalue λ the null space of (A - λI) is read off
//! the reduced row-echelon form: g = n - rank(A - λI) is the geometric
//! multiplicity and every free column contributes one basis vector.
//!
//! The pivot threshold starts at `max(tol.pivot · scale, spread)`, where
//! `spread` is the diameter of the root cluster the eigenvalue came from.
//! It is widened to the eigenvalue's uncertainty disc
//! `tol.eigen · (scale + |λ|)` when A - λI looks non-singular, or holds
//! fewer vectors than a split cluster's multiplicity; it is narrowed back to
//! `tol.pivot · scale` when the null space exceeds the algebraic
//! multiplicity. A retry is kept only if 1 ≤ g ≤ m.
//!
//! Eigenspaces of conjugate eigenvalues are solved independently and then
//! paired: the basis for λ̄ is replaced by the elementwise conjugate of the
//! basis for λ, which keeps P·D·P⁻¹ real for real input.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use rayon::prelude::*;

use crate::config::Tolerances;
use crate::elimination::{RowEchelon, row_reduce, to_complex};
use crate::error::{EngineError, Result};
use crate::roots::EigenvalueRecord;

/// Eigenvectors belonging to one distinct eigenvalue.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenspaceRecord {
    pub eigenvalue: EigenvalueRecord,
    pub geometric_multiplicity: usize,
    /// Unit-norm, linearly independent eigenvectors in extraction order
    pub basis: Vec<DVector<Complex64>>,
}

impl EigenspaceRecord {
    /// Fewer independent eigenvectors than the algebraic multiplicity.
    pub fn is_defective(&self) -> bool {
        self.geometric_multiplicity < self.eigenvalue.algebraic_multiplicity
    }
}

/// Rotate `v` so its largest-modulus entry is real and positive, then scale to unit norm.
///
/// For real eigenvalues, imaginary residue below `residue` is dropped first.
fn normalize(v: &mut DVector<Complex64>, real: bool, residue: f64) {
    if real {
        for z in v.iter_mut() {
            if z.im.abs() < residue {
                z.im = 0.0;
            }
        }
    }

    let largest = v.iter().map(|z| z.norm()).fold(0.0, f64::max);
    if largest == 0.0 {
        return;
    }
    if let Some(anchor) = v.iter().find(|z| z.norm() >= largest * (1.0 - 1e-9)).copied() {
        let phase = anchor.conj() / anchor.norm();
        for z in v.iter_mut() {
            *z *= phase;
        }
    }

    let norm = v.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
    for z in v.iter_mut() {
        *z /= norm;
        if real {
            z.im = 0.0;
        }
    }
}

/// Row-reduce A - λI, returning the echelon form and the threshold used.
fn reduce_shifted(
    shifted: &DMatrix<Complex64>,
    eigenvalue: &EigenvalueRecord,
    tol: &Tolerances,
    scale: f64,
) -> (RowEchelon, f64) {
    let n = shifted.ncols();
    let m = eigenvalue.algebraic_multiplicity;
    let floor = (tol.pivot * scale).max(eigenvalue.spread);
    let echelon = row_reduce(shifted.clone(), floor);
    let g = n - echelon.rank();

    let retry = if g == 0 || (g < m && eigenvalue.spread > 0.0) {
        floor.max(tol.eigen * (scale + eigenvalue.value.to_complex().norm()))
    } else if g > m {
        tol.pivot * scale
    } else {
        floor
    };
    if retry == floor {
        return (echelon, floor);
    }

    let candidate = row_reduce(shifted.clone(), retry);
    let g_retry = n - candidate.rank();
    if g_retry != g && (1..=m).contains(&g_retry) {
        debug!("pivot threshold {floor:.3e} gave {g} null vectors, {retry:.3e} gives {g_retry}");
        (candidate, retry)
    } else {
        (echelon, floor)
    }
}

/// Compute the eigenspace of a single eigenvalue.
pub fn solve_eigenspace(
    a: &DMatrix<f64>,
    eigenvalue: &EigenvalueRecord,
    tol: &Tolerances,
    scale: f64,
) -> Result<EigenspaceRecord> {
    let n = a.nrows();
    let lambda = eigenvalue.value.to_complex();
    let shifted = to_complex(a) - DMatrix::<Complex64>::identity(n, n) * lambda;

    let (echelon, threshold) = reduce_shifted(&shifted, eigenvalue, tol, scale);
    let mut basis = echelon.null_space();
    let g = basis.len();

    if g == 0 {
        return Err(EngineError::non_convergence(
            "eigenspace",
            format!(
                "A - λI is numerically non-singular for λ = {lambda} (pivot threshold {threshold:.3e})"
            ),
        ));
    }
    if g > eigenvalue.algebraic_multiplicity {
        return Err(EngineError::ill_formed(format!(
            "geometric multiplicity {g} exceeds algebraic multiplicity {} for λ = {lambda}",
            eigenvalue.algebraic_multiplicity
        )));
    }

    let real = eigenvalue.value.is_real();
    for v in basis.iter_mut() {
        normalize(v, real, tol.eigen);
    }

    debug!(
        "λ = {lambda}: rank {} at threshold {threshold:.3e}, geometric multiplicity {g}",
        echelon.rank()
    );

    Ok(EigenspaceRecord {
        eigenvalue: eigenvalue.clone(),
        geometric_multiplicity: g,
        basis,
    })
}

/// Replace the basis of every lower-half-plane eigenvalue with the conjugate
/// of its partner's basis.
pub fn pair_conjugate_eigenspaces(spaces: &mut [EigenspaceRecord]) -> Result<()> {
    for i in 0..spaces.len() {
        let value = spaces[i].eigenvalue.value;
        if value.im() <= 0.0 {
            continue;
        }

        let target = value.conj();
        let Some(j) = spaces.iter().position(|s| s.eigenvalue.value == target) else {
            return Err(EngineError::ill_formed(format!(
                "eigenvalue {} has no conjugate eigenspace",
                value.to_complex()
            )));
        };

        if spaces[j].geometric_multiplicity != spaces[i].geometric_multiplicity {
            warn!(
                "conjugate eigenspaces disagree on dimension ({} vs {}) for λ = {}",
                spaces[i].geometric_multiplicity,
                spaces[j].geometric_multiplicity,
                value.to_complex()
            );
            return Err(EngineError::ill_formed(format!(
                "eigenspaces of {} and its conjugate have dimensions {} and {}",
                value.to_complex(),
                spaces[i].geometric_multiplicity,
                spaces[j].geometric_multiplicity
            )));
        }

        let conjugated: Vec<DVector<Complex64>> = spaces[i]
            .basis
            .iter()
            .map(|v| v.map(|z| z.conj()))
            .collect();
        spaces[j].basis = conjugated;
    }
    Ok(())
}

/// Solve every eigenspace, optionally on the rayon pool, then pair conjugates.
pub fn solve_eigenspaces(
    a: &DMatrix<f64>,
    eigenvalues: &[EigenvalueRecord],
    tol: &Tolerances,
    scale: f64,
    parallel: bool,
) -> Result<Vec<EigenspaceRecord>> {
    let mut spaces = if parallel {
        eigenvalues
            .par_iter()
            .map(|record| solve_eigenspace(a, record, tol, scale))
            .collect::<Result<Vec<_>>>()?
    } else {
        eigenvalues
            .iter()
            .map(|record| solve_eigenspace(a, record, tol, scale))
            .collect::<Result<Vec<_>>>()?
    };

    pair_conjugate_eigenspaces(&mut spaces)?;
    Ok(spaces)
}
