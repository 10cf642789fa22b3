//! Root finder trait definitions.

use num_complex::Complex64;

use crate::charpoly::Polynomial;
use crate::error::Result;

/// Convergence and diagnostic info.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveInfo {
    /// Iterations spent (QR sweeps are not reported by nalgebra, so 0 there)
    pub iterations: usize,
    /// Human-readable method name (e.g., "nalgebra-Schur", "Aberth-Ehrlich")
    pub method: String,
}

/// Trait for a polynomial root finder.
///
/// Implementations return all `degree` complex roots of a monic real
/// polynomial, repeated according to multiplicity, or fail with
/// `NumericalNonConvergence` when the iteration budget runs out.
pub trait RootFinder: Send + Sync {
    fn find_roots(&self, poly: &Polynomial) -> Result<(Vec<Complex64>, SolveInfo)>;

    /// Human-readable name of this root finder.
    fn name(&self) -> &str;
}
