//! Response bodies and the request handler.

use diag_engine::{Diagonalization, DiagonalizationEngine, Matrix};
use log::{info, warn};
use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::format::{CellMatrix, DisplayFormat};
use crate::request::parse_request;

pub const NOT_DIAGONALIZABLE_MESSAGE: &str =
    "The matrix is NOT diagonalizable. It does not have n linearly independent eigenvectors.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorizationBody {
    pub diagonalizable: bool,
    #[serde(rename = "P")]
    pub p: CellMatrix,
    #[serde(rename = "D")]
    pub d: CellMatrix,
    #[serde(rename = "P_inv")]
    pub p_inv: CellMatrix,
    pub verification: CellMatrix,
    pub original: CellMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotDiagonalizableBody {
    pub diagonalizable: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Factorization(FactorizationBody),
    NotDiagonalizable(NotDiagonalizableBody),
    Error(ErrorBody),
}

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: ResponseBody,
}

impl Response {
    pub fn from_result(matrix: &Matrix, result: &Diagonalization, format: &DisplayFormat) -> Self {
        let body = match &result.factorization {
            Some(f) => ResponseBody::Factorization(FactorizationBody {
                diagonalizable: true,
                p: format.matrix(&f.p),
                d: format.matrix(&f.d),
                p_inv: format.matrix(&f.p_inverse),
                verification: format.matrix(&f.verification),
                original: format.rows(&matrix.rows()),
            }),
            None => ResponseBody::NotDiagonalizable(NotDiagonalizableBody {
                diagonalizable: false,
                message: NOT_DIAGONALIZABLE_MESSAGE.to_string(),
            }),
        };
        Self { status: 200, body }
    }

    pub fn from_error(err: &ApiError) -> Self {
        let status = err.status();
        if status >= 500 {
            warn!("request failed with status {status}: {err}");
        } else {
            info!("rejected request: {err}");
        }
        Self {
            status,
            body: ResponseBody::Error(ErrorBody {
                error: err.public_message(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn diagonalize_body(body: &[u8], engine: &DiagonalizationEngine) -> Result<Response> {
    let request = parse_request(body)?;
    let matrix = Matrix::from_rows(request.rows()?)?;
    let result = engine.diagonalize(&matrix)?;
    let format = DisplayFormat::from(engine.config());
    Ok(Response::from_result(&matrix, &result, &format))
}

/// Run one request body through the engine; every outcome becomes a response.
pub fn handle_request(body: &[u8], engine: &DiagonalizationEngine) -> Response {
    diagonalize_body(body, engine).unwrap_or_else(|err| Response::from_error(&err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Cell;

    fn handle(body: &str) -> Response {
        handle_request(body.as_bytes(), &DiagonalizationEngine::default())
    }

    #[test]
    fn success_carries_all_matrices() {
        let response = handle(r#"{"matrix": [[4, 1], [2, 3]]}"#);
        assert_eq!(response.status, 200);
        let ResponseBody::Factorization(body) = response.body else {
            panic!("expected a factorization");
        };
        assert!(body.diagonalizable);
        assert_eq!(body.d[0][0], Cell::Integer(5));
        assert_eq!(body.d[1][1], Cell::Integer(2));
        assert_eq!(body.d[0][1], Cell::Integer(0));
        assert_eq!(body.p[0][0], Cell::Number(0.7071));
        assert_eq!(body.verification, body.original);
        assert_eq!(body.p_inv.len(), 2);
    }

    #[test]
    fn defective_matrix_gets_message() {
        let response = handle(r#"{"matrix": [[1, 1], [0, 1]]}"#);
        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            ResponseBody::NotDiagonalizable(NotDiagonalizableBody {
                diagonalizable: false,
                message: NOT_DIAGONALIZABLE_MESSAGE.to_string(),
            })
        );
    }

    #[test]
    fn validation_errors_are_400() {
        for (body, message) in [
            (r#"{}"#, "No matrix provided"),
            (r#"{"matrix": []}"#, "No matrix provided"),
            (r#"{"matrix": [[1, 2, 3], [4, 5, 6]]}"#, "Matrix must be square"),
        ] {
            let response = handle(body);
            assert_eq!(response.status, 400);
            assert!(!response.is_success());
            let ResponseBody::Error(err) = response.body else {
                panic!("expected an error body");
            };
            assert!(err.error.starts_with(message), "{}", err.error);
        }
    }
}
