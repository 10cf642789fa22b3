//! Request parsing.

use diag_engine::EngineError;
use serde::Deserialize;

use crate::error::Result;

/// Body of a diagonalization request: `{ "matrix": [[number, ...], ...] }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiagonalizeRequest {
    #[serde(default)]
    pub matrix: Option<Vec<Vec<f64>>>,
}

impl DiagonalizeRequest {
    /// The matrix rows, or `InvalidInput` when the matrix is absent, null or empty.
    pub fn rows(&self) -> std::result::Result<&[Vec<f64>], EngineError> {
        match self.matrix.as_deref() {
            Some(rows) if !rows.is_empty() => Ok(rows),
            _ => Err(EngineError::invalid("No matrix provided")),
        }
    }
}

/// Parse a request body. Shape validation of the rows is left to the engine.
pub fn parse_request(body: &[u8]) -> Result<DiagonalizeRequest> {
    Ok(serde_json::from_slice(body)?)
}
