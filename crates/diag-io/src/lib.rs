//! I/O boundary of the diagonalization engine.
//!
//! This crate provides:
//! - **Request parsing** for `{ "matrix": [[...], ...] }` bodies
//! - **Display formatting** of real and complex results into JSON cells
//! - **Response bodies** and HTTP status codes for every outcome
//! - **JSON configuration** files for `EngineConfig`

mod config;
pub mod error;
pub mod format;
pub mod request;
pub mod response;

pub use config::{load_config, save_config};
pub use error::{ApiError, Result};
pub use format::{Cell, CellMatrix, DisplayFormat};
pub use request::{DiagonalizeRequest, parse_request};
pub use response::{
    ErrorBody, FactorizationBody, NOT_DIAGONALIZABLE_MESSAGE, NotDiagonalizableBody, Response,
    ResponseBody, handle_request,
};
