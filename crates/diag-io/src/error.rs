//! Error types for diag-io

use diag_engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ApiError {
    /// HTTP status code reported for this failure.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Json(_) => 400,
            ApiError::Engine(err) if err.is_client_error() => 400,
            ApiError::Engine(_) => 500,
        }
    }

    /// Message placed in the `error` field of the response.
    ///
    /// Ill-formed eigenbases are internal faults; their detail stays in the log.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Json(err) => format!("Invalid JSON: {err}"),
            ApiError::Engine(EngineError::InvalidInput(message)) => message.clone(),
            ApiError::Engine(err @ EngineError::NumericalNonConvergence { .. }) => {
                format!("numerical failure: {err}")
            }
            ApiError::Engine(EngineError::IllFormedEigenbasis(_)) => {
                "computation failed".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        let err = ApiError::from(EngineError::invalid("Matrix must be square"));
        assert_eq!(err.status(), 400);
        assert_eq!(err.public_message(), "Matrix must be square");

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::from(json);
        assert_eq!(err.status(), 400);
        assert!(err.public_message().starts_with("Invalid JSON"));
    }

    #[test]
    fn numerical_failures_map_to_500() {
        let err = ApiError::from(EngineError::non_convergence("companion QR", "budget exhausted"));
        assert_eq!(err.status(), 500);
        assert_eq!(
            err.public_message(),
            "numerical failure: companion QR did not converge: budget exhausted"
        );
    }

    #[test]
    fn ill_formed_basis_is_not_leaked() {
        let err = ApiError::from(EngineError::ill_formed("P is singular at column 1"));
        assert_eq!(err.status(), 500);
        assert_eq!(err.public_message(), "computation failed");
    }
}
