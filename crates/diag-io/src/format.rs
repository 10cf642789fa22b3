//! Display formatting of results.
//!
//! A value whose imaginary part is below the display tolerance is shown as a
//! real number; one within the tolerance of an integer is shown as that
//! integer. Everything else is rounded to the display precision with trailing
//! zeros stripped. Complex values become strings of the form `a+bi` / `a-bi`.

use diag_engine::{EngineConfig, Scalar, ScalarMatrix};
use serde::Serialize;

/// One matrix cell as it appears in a response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Number(f64),
    Text(String),
}

pub type CellMatrix = Vec<Vec<Cell>>;

/// Largest magnitude still rendered as a JSON integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Precision and tolerance used to render scalars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayFormat {
    /// Decimal places kept for non-integral values
    pub precision: usize,
    /// Snapping distance for integers and for imaginary parts
    pub tolerance: f64,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            precision: 4,
            tolerance: 1e-4,
        }
    }
}

impl From<&EngineConfig> for DisplayFormat {
    fn from(config: &EngineConfig) -> Self {
        Self {
            precision: config.display_precision,
            tolerance: config.tolerances.display,
        }
    }
}

impl DisplayFormat {
    /// Snap to a nearby integer or round to `precision` decimals. Never returns -0.
    pub fn round(&self, x: f64) -> f64 {
        let nearest = x.round();
        let rounded = if (x - nearest).abs() < self.tolerance {
            nearest
        } else {
            let factor = 10f64.powi(self.precision.min(15) as i32);
            (x * factor).round() / factor
        };
        if rounded == 0.0 { 0.0 } else { rounded }
    }

    fn is_integer(x: f64) -> bool {
        x.fract() == 0.0 && x.abs() < MAX_EXACT_INTEGER
    }

    /// Text form of an already rounded real number.
    fn number_text(&self, x: f64) -> String {
        if Self::is_integer(x) {
            return format!("{}", x as i64);
        }
        let text = format!("{:.*}", self.precision, x);
        if text.contains('.') {
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            text
        }
    }

    pub fn real(&self, x: f64) -> Cell {
        let rounded = self.round(x);
        if Self::is_integer(rounded) {
            Cell::Integer(rounded as i64)
        } else {
            Cell::Number(rounded)
        }
    }

    pub fn scalar(&self, value: Scalar) -> Cell {
        if value.im().abs() < self.tolerance {
            return self.real(value.re());
        }
        let re = self.round(value.re());
        let im = self.round(value.im());
        let sign = if im < 0.0 { '-' } else { '+' };
        Cell::Text(format!(
            "{}{}{}i",
            self.number_text(re),
            sign,
            self.number_text(im.abs())
        ))
    }

    pub fn matrix(&self, m: &ScalarMatrix) -> CellMatrix {
        (0..m.nrows())
            .map(|i| (0..m.ncols()).map(|j| self.scalar(m[(i, j)])).collect())
            .collect()
    }

    pub fn rows(&self, rows: &[Vec<f64>]) -> CellMatrix {
        rows.iter()
            .map(|row| row.iter().map(|&x| self.real(x)).collect())
            .collect()
    }
}
