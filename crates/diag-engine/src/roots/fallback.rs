//! Chained root finders.
//!
//! Francis double shifts can stagnate on companion matrices that are
//! (scaled) cyclic permutations, e.g. for x³ - 1. Rerunning the same method
//! would fail identically, so on non-convergence the polynomial is handed to
//! a different method instead.

use log::warn;
use num_complex::Complex64;

use super::traits::*;
use crate::charpoly::Polynomial;
use crate::error::{EngineError, Result};

/// Runs `primary`, then `secondary` if the primary fails to converge.
pub struct WithFallback {
    pub primary: Box<dyn RootFinder>,
    pub secondary: Box<dyn RootFinder>,
}

impl RootFinder for WithFallback {
    fn find_roots(&self, poly: &Polynomial) -> Result<(Vec<Complex64>, SolveInfo)> {
        match self.primary.find_roots(poly) {
            Err(EngineError::NumericalNonConvergence { stage, detail }) => {
                warn!(
                    "{} failed ({stage}: {detail}), switching to {}",
                    self.primary.name(),
                    self.secondary.name()
                );
                self.secondary.find_roots(poly)
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}
