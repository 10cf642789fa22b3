//! Aberth–Ehrlich simultaneous root iteration.
//!
//! Every approximation z_i is updated with
//!
//! ```text
//! w_i = (p/p')(z_i) / (1 - (p/p')(z_i) · Σ_{j≠i} 1/(z_i - z_j))
//! ```
//!
//! in Gauss–Seidel order. An approximation is frozen once |p(z_i)| falls
//! below the rounding-error bound of the Horner evaluation, or once its
//! correction is negligible relative to |z_i|.

use num_complex::Complex64;

use super::traits::*;
use crate::charpoly::Polynomial;
use crate::error::{EngineError, Result};

/// Aberth–Ehrlich root finder.
pub struct Aberth {
    /// Maximum number of sweeps over all approximations
    pub max_iterations: usize,
}

impl Default for Aberth {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }
}

/// Fujiwara's bound on the moduli of the roots of a monic polynomial.
fn fujiwara_bound(monic: &Polynomial) -> f64 {
    let a = monic.coefficients();
    let n = monic.degree();
    (1..=n)
        .map(|i| {
            let c = if i == n { a[i].abs() / 2.0 } else { a[i].abs() };
            c.powf(1.0 / i as f64)
        })
        .fold(0.0, f64::max)
        * 2.0
}

impl RootFinder for Aberth {
    fn find_roots(&self, poly: &Polynomial) -> Result<(Vec<Complex64>, SolveInfo)> {
        let n = poly.degree();
        let mut info = SolveInfo {
            iterations: 0,
            method: self.name().to_string(),
        };
        if n == 0 {
            return Ok((Vec::new(), info));
        }

        let monic = poly.to_monic()?;
        let derivative = monic.derivative();

        let radius = fujiwara_bound(&monic);
        if radius == 0.0 {
            // x^n
            return Ok((vec![Complex64::new(0.0, 0.0); n], info));
        }

        // Start on a circle inside the bound, rotated off the real axis
        let start = 0.5 * radius;
        let mut z: Vec<Complex64> = (0..n)
            .map(|k| {
                let angle = 2.0 * std::f64::consts::PI * k as f64 / n as f64 + 0.4;
                Complex64::from_polar(start, angle)
            })
            .collect();
        let mut converged = vec![false; n];

        for iteration in 0..self.max_iterations {
            if converged.iter().all(|&c| c) {
                info.iterations = iteration;
                return Ok((z, info));
            }

            for i in 0..n {
                if converged[i] {
                    continue;
                }

                let (value, bound) = monic.eval_with_bound(z[i]);
                if value.norm() <= bound {
                    converged[i] = true;
                    continue;
                }

                let slope = derivative.eval(z[i]);
                if slope.norm() == 0.0 {
                    // stationary point, nudge off it
                    z[i] += Complex64::new(radius * 1e-7, radius * 1e-7);
                    continue;
                }
                let ratio = value / slope;

                let repulsion: Complex64 = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| z[i] - z[j])
                    .filter(|d| d.norm() > 0.0)
                    .map(|d| d.inv())
                    .sum();

                let correction = ratio / (Complex64::new(1.0, 0.0) - ratio * repulsion);
                z[i] -= correction;

                if correction.norm() <= f64::EPSILON * z[i].norm() {
                    converged[i] = true;
                }
            }
        }

        if converged.iter().all(|&c| c) {
            info.iterations = self.max_iterations;
            return Ok((z, info));
        }

        let pending = converged.iter().filter(|&&c| !c).count();
        Err(EngineError::non_convergence(
            "Aberth iteration",
            format!(
                "{pending} of {n} roots unresolved after {} sweeps",
                self.max_iterations
            ),
        ))
    }

    fn name(&self) -> &str {
        "Aberth-Ehrlich"
    }
}
