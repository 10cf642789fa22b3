//! Gaussian elimination over the complex field.
//!
//! Shared by the Eigenspace Solver (row-echelon form and null space of
//! A - λI) and the Factorization Assembler (inverse of P). Both use partial
//! pivoting with an absolute threshold below which a candidate pivot counts
//! as zero.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

/// Reduced row-echelon form of a matrix together with its pivot columns.
#[derive(Debug, Clone)]
pub struct RowEchelon {
    pub reduced: DMatrix<Complex64>,
    pub pivot_columns: Vec<usize>,
}

impl RowEchelon {
    pub fn rank(&self) -> usize {
        self.pivot_columns.len()
    }

    /// Columns without a pivot, in ascending order.
    pub fn free_columns(&self) -> Vec<usize> {
        (0..self.reduced.ncols())
            .filter(|c| !self.pivot_columns.contains(c))
            .collect()
    }

    /// One null-space vector per free column: 1 at the free column, the
    /// negated reduced entries at the pivot columns, 0 elsewhere.
    pub fn null_space(&self) -> Vec<DVector<Complex64>> {
        let n = self.reduced.ncols();
        self.free_columns()
            .into_iter()
            .map(|free| {
                let mut v = DVector::from_element(n, Complex64::new(0.0, 0.0));
                v[free] = Complex64::new(1.0, 0.0);
                for (row, &pivot) in self.pivot_columns.iter().enumerate() {
                    v[pivot] = -self.reduced[(row, free)];
                }
                v
            })
            .collect()
    }
}

/// Index and modulus of the largest entry of `column` in rows `from..`.
fn pivot_candidate(m: &DMatrix<Complex64>, column: usize, from: usize) -> (usize, f64) {
    (from..m.nrows())
        .map(|r| (r, m[(r, column)].norm()))
        .fold((from, -1.0), |best, cand| if cand.1 > best.1 { cand } else { best })
}

/// Reduce `m` to reduced row-echelon form.
///
/// Columns whose best remaining pivot has modulus `<= threshold` are
/// zeroed below the current row and left without a pivot.
pub fn row_reduce(mut m: DMatrix<Complex64>, threshold: f64) -> RowEchelon {
    let (rows, cols) = m.shape();
    let mut pivot_columns = Vec::new();
    let mut row = 0;

    for col in 0..cols {
        if row >= rows {
            break;
        }

        let (best, magnitude) = pivot_candidate(&m, col, row);
        if magnitude <= threshold {
            for r in row..rows {
                m[(r, col)] = Complex64::new(0.0, 0.0);
            }
            continue;
        }

        m.swap_rows(row, best);
        let pivot = m[(row, col)];
        for c in col..cols {
            m[(row, c)] /= pivot;
        }
        m[(row, col)] = Complex64::new(1.0, 0.0);

        for r in 0..rows {
            if r == row {
                continue;
            }
            let factor = m[(r, col)];
            if factor.norm() == 0.0 {
                continue;
            }
            for c in col..cols {
                let delta = factor * m[(row, c)];
                m[(r, c)] -= delta;
            }
            m[(r, col)] = Complex64::new(0.0, 0.0);
        }

        pivot_columns.push(col);
        row += 1;
    }

    RowEchelon {
        reduced: m,
        pivot_columns,
    }
}

/// A pivot that could not be distinguished from zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingularPivot {
    pub column: usize,
    pub magnitude: f64,
}

/// Invert a square matrix by Gauss–Jordan elimination with partial pivoting.
pub fn invert(m: &DMatrix<Complex64>, threshold: f64) -> Result<DMatrix<Complex64>, SingularPivot> {
    let n = m.nrows();
    let mut work = m.clone();
    let mut inverse = DMatrix::<Complex64>::identity(n, n);

    for col in 0..n {
        let (best, magnitude) = pivot_candidate(&work, col, col);
        if magnitude <= threshold {
            return Err(SingularPivot {
                column: col,
                magnitude: magnitude.max(0.0),
            });
        }

        work.swap_rows(col, best);
        inverse.swap_rows(col, best);

        let pivot = work[(col, col)];
        for c in 0..n {
            work[(col, c)] /= pivot;
            inverse[(col, c)] /= pivot;
        }

        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = work[(r, col)];
            if factor.norm() == 0.0 {
                continue;
            }
            for c in 0..n {
                let w = factor * work[(col, c)];
                let i = factor * inverse[(col, c)];
                work[(r, c)] -= w;
                inverse[(r, c)] -= i;
            }
        }
    }

    Ok(inverse)
}

/// Lift a real matrix into the complex field.
pub fn to_complex(m: &DMatrix<f64>) -> DMatrix<Complex64> {
    m.map(|x| Complex64::new(x, 0.0))
}
