//! Root finder stage.
//!
//! Turns the characteristic polynomial into distinct eigenvalue records:
//!
//! ```text
//! CharacteristicPolynomial (of A / scale)
//!         │
//!         ▼
//! RootFinder (CompanionQr | Aberth)  ── n complex roots
//!         │
//!         ▼
//! refine against Schur(A / scale)     ── polynomial roots kept on disagreement
//!         │
//!         ▼
//! cluster ─► merge confirmed defects ─► snap real ─► polish ─► pair conjugates ─► order
//!         │
//!         ▼
//! EigenvalueRecord × distinct (values rescaled to A)
//! ```

pub mod aberth;
pub mod cluster;
pub mod companion;
pub mod fallback;
pub mod refine;
pub mod traits;

pub use aberth::Aberth;
pub use cluster::RootCluster;
pub use companion::CompanionQr;
pub use fallback::WithFallback;
pub use refine::RefinedRoots;
pub use traits::*;

use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::charpoly::CharacteristicPolynomial;
use crate::config::{EngineConfig, RootFinderKind, Tolerances};
use crate::elimination::{row_reduce, to_complex};
use crate::error::Result;
use crate::scalar::Scalar;

/// A distinct eigenvalue with its algebraic multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenvalueRecord {
    pub value: Scalar,
    pub algebraic_multiplicity: usize,
    /// Diameter of the root cluster behind this value, in units of the input matrix
    pub spread: f64,
}

/// Returns the root finder selected by the configuration.
///
/// Companion QR falls back to Aberth iteration when its sweeps stagnate.
pub fn root_finder(config: &EngineConfig) -> Box<dyn RootFinder> {
    let aberth = Aberth {
        max_iterations: config.max_iterations,
    };
    match config.root_finder {
        RootFinderKind::CompanionQr => Box::new(WithFallback {
            primary: Box::new(CompanionQr {
                max_iterations: config.max_iterations,
            }),
            secondary: Box::new(aberth),
        }),
        RootFinderKind::Aberth => Box::new(aberth),
    }
}

/// Confirmation for merging split roots: `value` is a defective k-fold
/// eigenvalue of `a` when A - value·I has fewer than k null vectors at pivot
/// threshold `max(tol.pivot, spread)`.
fn defective_in(a: &DMatrix<f64>, tol: &Tolerances) -> impl Fn(Complex64, usize, f64) -> bool {
    let n = a.nrows();
    let complex = to_complex(a);
    let pivot = tol.pivot;
    move |value, k, spread| {
        let shifted = &complex - DMatrix::<Complex64>::identity(n, n) * value;
        let g = n - row_reduce(shifted, pivot.max(spread)).rank();
        debug!("{k} roots around {value} (spread {spread:.3e}): {g} null vectors");
        g < k
    }
}

/// Find the distinct eigenvalues of `normalized` (A / scale), whose
/// characteristic polynomial is `poly`.
///
/// Records come back ordered by descending real part, then descending
/// imaginary part, with multiplicities summing to the polynomial degree.
pub fn find_eigenvalues(
    poly: &CharacteristicPolynomial,
    normalized: &DMatrix<f64>,
    finder: &dyn RootFinder,
    config: &EngineConfig,
    scale: f64,
) -> Result<Vec<EigenvalueRecord>> {
    let tol = &config.tolerances;
    let monic = poly.monic()?;
    let (reduced, zeros) = monic.deflate_zero_roots();
    let (mut roots, info) = finder.find_roots(&reduced)?;
    roots.extend(std::iter::repeat_n(Complex64::new(0.0, 0.0), zeros));
    debug!(
        "{}: {} roots after {} iterations ({} exact zeros deflated)",
        info.method,
        roots.len(),
        info.iterations,
        zeros
    );

    let refined =
        refine::refine_roots(roots, normalized, &monic, zeros, tol, config.max_iterations);
    let clusters = cluster::resolve_clusters(
        &refined.roots,
        &monic,
        tol,
        !refined.from_matrix,
        defective_in(normalized, tol),
    )?;
    let records = clusters
        .into_iter()
        .map(|c| EigenvalueRecord {
            value: Scalar::from_complex(c.value * scale, f64::MIN_POSITIVE),
            algebraic_multiplicity: c.multiplicity,
            spread: c.diameter * scale,
        })
        .collect::<Vec<_>>();

    for record in &records {
        debug!(
            "eigenvalue {:?} with algebraic multiplicity {} (spread {:.3e})",
            record.value, record.algebraic_multiplicity, record.spread
        );
    }
    Ok(records)
}
