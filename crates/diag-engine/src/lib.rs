//! Diagonalization engine for small dense real matrices.
//!
//! Given a square matrix A this crate decides whether A is diagonalizable
//! over the complex numbers and, if so, returns A = P·D·P⁻¹ together with
//! the recomputed product for verification.
//!
//! The pipeline has four stages with a strict forward data flow:
//! - **charpoly**: det(A - λI) by the Faddeev–LeVerrier recurrence
//! - **roots**: companion-matrix QR (or Aberth iteration), clustered into
//!   distinct eigenvalues with algebraic multiplicities
//! - **eigenspace**: null space of (A - λI) by complex Gaussian elimination
//! - **factorization**: P, D, P⁻¹ and the reconstruction self-check
//!
//! A defective matrix is a regular result (`factorization: None`), never an error.

pub mod charpoly;
pub mod config;
pub mod eigenspace;
pub mod elimination;
pub mod engine;
pub mod error;
pub mod factorization;
pub mod matrix;
pub mod roots;
pub mod scalar;

pub use charpoly::{CharacteristicPolynomial, Polynomial};
pub use config::{EngineConfig, RootFinderKind, Tolerances};
pub use eigenspace::EigenspaceRecord;
pub use engine::{Diagonalization, DiagonalizationEngine};
pub use error::{EngineError, Result};
pub use factorization::Factorization;
pub use matrix::Matrix;
pub use roots::{EigenvalueRecord, RootFinder, SolveInfo};
pub use scalar::{Scalar, ScalarMatrix};
