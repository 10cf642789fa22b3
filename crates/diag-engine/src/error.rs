//! Error types for diag-engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure modes of a diagonalization request.
///
/// A matrix that is not diagonalizable is a regular outcome and is never
/// reported through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{stage} did not converge: {detail}")]
    NumericalNonConvergence { stage: &'static str, detail: String },

    #[error("Ill-formed eigenbasis: {0}")]
    IllFormedEigenbasis(String),
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidInput(message.into())
    }

    pub fn non_convergence(stage: &'static str, detail: impl Into<String>) -> Self {
        EngineError::NumericalNonConvergence {
            stage,
            detail: detail.into(),
        }
    }

    pub fn ill_formed(detail: impl Into<String>) -> Self {
        EngineError::IllFormedEigenbasis(detail.into())
    }

    /// Whether the failure was caused by the caller's input rather than by the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(self, EngineError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_stage() {
        let err = EngineError::non_convergence("companion QR", "no convergence after 10 sweeps");
        assert_eq!(
            err.to_string(),
            "companion QR did not converge: no convergence after 10 sweeps"
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn invalid_input_is_a_client_error() {
        let err = EngineError::invalid("Matrix must be square");
        assert_eq!(err.to_string(), "Matrix must be square");
        assert!(err.is_client_error());
    }
}
