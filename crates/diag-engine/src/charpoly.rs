//! Characteristic polynomial builder.
//!
//! Computes the coefficients of det(A - λI) with the Faddeev–LeVerrier
//! recurrence:
//!
//! ```text
//! M_0 = 0,                c_n = 1
//! M_k = A·M_{k-1} + c_{n-k+1}·I
//! c_{n-k} = -tr(A·M_k) / k
//! ```
//!
//! which yields det(λI - A) = Σ c_k λ^k using only matrix products and
//! traces. The stored coefficients follow the det(A - λI) convention, so the
//! leading coefficient is (-1)^n.

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{EngineError, Result};

/// Real polynomial with coefficients ordered from the highest power down.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation at a complex point.
    pub fn eval(&self, z: Complex64) -> Complex64 {
        self.coefficients
            .iter()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
    }

    /// Horner evaluation together with a bound on its rounding error.
    pub fn eval_with_bound(&self, z: Complex64) -> (Complex64, f64) {
        let modulus = z.norm();
        let mut value = Complex64::new(0.0, 0.0);
        let mut magnitude = 0.0;
        for &c in &self.coefficients {
            value = value * z + c;
            magnitude = magnitude * modulus + c.abs();
        }
        let bound = 4.0 * (self.degree() as f64 + 1.0) * f64::EPSILON * magnitude;
        (value, bound)
    }

    pub fn derivative(&self) -> Polynomial {
        let n = self.degree();
        if n == 0 {
            return Polynomial::new(vec![0.0]);
        }
        let coefficients = self.coefficients[..n]
            .iter()
            .enumerate()
            .map(|(i, &c)| c * (n - i) as f64)
            .collect();
        Polynomial::new(coefficients)
    }

    pub fn nth_derivative(&self, order: usize) -> Polynomial {
        (0..order).fold(self.clone(), |p, _| p.derivative())
    }

    /// Strip exactly-zero trailing coefficients.
    ///
    /// Returns the reduced polynomial and the number of roots at zero removed.
    pub fn deflate_zero_roots(&self) -> (Polynomial, usize) {
        let zeros = self
            .coefficients
            .iter()
            .rev()
            .take_while(|&&c| c == 0.0)
            .count()
            .min(self.degree());
        let kept = self.coefficients.len() - zeros;
        (Polynomial::new(self.coefficients[..kept].to_vec()), zeros)
    }

    /// Divide through by the leading coefficient.
    pub fn to_monic(&self) -> Result<Polynomial> {
        let lead = self.coefficients.first().copied().unwrap_or(0.0);
        if lead == 0.0 {
            return Err(EngineError::invalid("Polynomial has a zero leading coefficient"));
        }
        Ok(Polynomial::new(
            self.coefficients.iter().map(|c| c / lead).collect(),
        ))
    }
}

/// Coefficients [c_n, ..., c_0] of det(A - λI).
#[derive(Debug, Clone, PartialEq)]
pub struct CharacteristicPolynomial {
    poly: Polynomial,
}

impl CharacteristicPolynomial {
    /// Build det(A - λI) for a square matrix.
    pub fn from_matrix(a: &DMatrix<f64>) -> Result<Self> {
        if !a.is_square() || a.is_empty() {
            return Err(EngineError::invalid(format!(
                "Characteristic polynomial requires a non-empty square matrix (got {}×{})",
                a.nrows(),
                a.ncols()
            )));
        }

        let n = a.nrows();
        let identity = DMatrix::<f64>::identity(n, n);

        // c[k] is the coefficient of λ^k in det(λI - A)
        let mut c = vec![0.0; n + 1];
        c[n] = 1.0;
        let mut m = DMatrix::<f64>::zeros(n, n);
        for k in 1..=n {
            m = a * &m + &identity * c[n - k + 1];
            let am = a * &m;
            c[n - k] = -am.trace() / k as f64;
        }

        let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
        let coefficients = (0..=n).map(|i| sign * c[n - i]).collect();
        Ok(Self {
            poly: Polynomial::new(coefficients),
        })
    }

    pub fn degree(&self) -> usize {
        self.poly.degree()
    }

    /// Coefficients from the highest power down; the first is (-1)^n.
    pub fn coefficients(&self) -> &[f64] {
        self.poly.coefficients()
    }

    pub fn eval(&self, lambda: Complex64) -> Complex64 {
        self.poly.eval(lambda)
    }

    /// det(λI - A), the monic form consumed by the root finders.
    pub fn monic(&self) -> Result<Polynomial> {
        self.poly.to_monic()
    }
}
