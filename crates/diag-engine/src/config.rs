//! Engine configuration and numerical tolerances.
//!
//! All tolerances are relative to the matrix scale (largest absolute entry,
//! or 1 for the zero matrix). They decide where the boundary between
//! "diagonalizable" and "defective" lies for nearly defective input, so they
//! are kept as explicit, serialisable settings rather than literals scattered
//! through the numerical code.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Tolerances governing eigenvalue clustering, rank decisions and display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Two roots r1, r2 are the same eigenvalue iff
    /// |r1 - r2| < eigen * (1 + max(|r1|, |r2|)).
    pub eigen: f64,
    /// Pivots below `pivot * scale` are treated as zero during elimination.
    pub pivot: f64,
    /// Imaginary parts and distances to integers below this are dropped when formatting.
    pub display: f64,
    /// Maximum deviation of P·D·P⁻¹ from A, relative to the matrix scale.
    pub reconstruction: f64,
    /// Relative backward error assumed for computed eigenvalues. A k-fold
    /// defective eigenvalue perturbed by it splits over a disc of radius
    /// `backward^(1/k)`.
    pub backward: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            eigen: 1e-6,
            pivot: 1e-9,
            display: 1e-4,
            reconstruction: 1e-6,
            backward: 1e-14,
        }
    }
}

impl Tolerances {
    /// Largest diameter, relative to `1 + max|r|`, of `k` roots that may be
    /// one split defective eigenvalue.
    ///
    /// Never narrower than the pairwise rule. Groups wider than `eigen` are
    /// only candidates; they are merged once the matrix confirms the defect.
    pub fn multiple_root_diameter(&self, k: usize) -> f64 {
        let split = 2.0 * self.backward.powf(1.0 / k.max(1) as f64);
        split.max(self.eigen)
    }

    /// Reject non-positive or non-finite tolerances.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("eigen", self.eigen),
            ("pivot", self.pivot),
            ("display", self.display),
            ("reconstruction", self.reconstruction),
            ("backward", self.backward),
        ];
        for (name, value) in named {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::invalid(format!(
                    "tolerance `{name}` must be a positive finite number (got {value})"
                )));
            }
        }
        if self.backward >= 1.0 {
            return Err(EngineError::invalid("tolerance `backward` must be below 1"));
        }
        Ok(())
    }
}

/// Polynomial root-finding method used by the Root Finder stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootFinderKind {
    /// Real Schur decomposition (implicit double-shift QR) of the companion matrix.
    #[default]
    CompanionQr,
    /// Aberth–Ehrlich simultaneous iteration.
    Aberth,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tolerances: Tolerances,
    pub root_finder: RootFinderKind,
    /// Iteration budget for root finding
    pub max_iterations: usize,
    /// Largest accepted matrix dimension
    pub max_dimension: usize,
    /// Solve the eigenspaces of distinct eigenvalues on the rayon pool
    pub parallel_eigenspaces: bool,
    /// Decimal places kept when formatting non-integral values
    pub display_precision: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            root_finder: RootFinderKind::CompanionQr,
            max_iterations: 10_000,
            max_dimension: 10,
            parallel_eigenspaces: false,
            display_precision: 4,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.tolerances.validate()?;
        if self.max_dimension == 0 {
            return Err(EngineError::invalid("max_dimension must be at least 1"));
        }
        Ok(())
    }
}
