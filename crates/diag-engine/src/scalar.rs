//! Real-or-complex scalar carried through results.

use nalgebra::DMatrix;
use num_complex::Complex64;

/// A value that is either real or complex.
///
/// Numerical work is done on `Complex64`; results are collapsed to this
/// tagged form so callers never have to guess whether a cell is real.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Real(f64),
    Complex(Complex64),
}

impl Scalar {
    pub fn complex(re: f64, im: f64) -> Self {
        Scalar::Complex(Complex64::new(re, im))
    }

    /// Collapse a complex value to `Real` when its imaginary part is below `tol`.
    pub fn from_complex(z: Complex64, tol: f64) -> Self {
        if z.im.abs() < tol {
            Scalar::Real(z.re)
        } else {
            Scalar::Complex(z)
        }
    }

    pub fn re(&self) -> f64 {
        match self {
            Scalar::Real(x) => *x,
            Scalar::Complex(z) => z.re,
        }
    }

    pub fn im(&self) -> f64 {
        match self {
            Scalar::Real(_) => 0.0,
            Scalar::Complex(z) => z.im,
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Scalar::Real(_))
    }

    pub fn to_complex(&self) -> Complex64 {
        match self {
            Scalar::Real(x) => Complex64::new(*x, 0.0),
            Scalar::Complex(z) => *z,
        }
    }

    pub fn conj(&self) -> Self {
        match self {
            Scalar::Real(x) => Scalar::Real(*x),
            Scalar::Complex(z) => Scalar::Complex(z.conj()),
        }
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Real(x)
    }
}

/// Matrix of tagged scalars.
pub type ScalarMatrix = DMatrix<Scalar>;

/// Collapse every entry of a complex matrix.
pub fn collapse_matrix(m: &DMatrix<Complex64>, tol: f64) -> ScalarMatrix {
    m.map(|z| Scalar::from_complex(z, tol))
}
