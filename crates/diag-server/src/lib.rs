//! HTTP front end for the diagonalization engine.
//!
//! Routes:
//! - `POST /api/diagonalize`: JSON request/response contract of `diag_io`
//! - `GET /health`: liveness check
//!
//! Each request runs on tokio's blocking pool under a per-request timeout.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use diag_engine::{DiagonalizationEngine, EngineConfig};
use diag_io::{ErrorBody, ResponseBody, handle_request, load_config};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

/// Configuration for the HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Per-request computation timeout in seconds
    pub request_timeout_secs: u64,
    /// Optional engine configuration file (JSON)
    pub engine_config_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            request_timeout_secs: 10,
            engine_config_path: None,
        }
    }
}

impl ServerConfig {
    pub fn engine_config(&self) -> std::io::Result<EngineConfig> {
        match &self.engine_config_path {
            Some(path) => load_config(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    engine: Arc<DiagonalizationEngine>,
    timeout: Duration,
}

impl AppState {
    pub fn new(engine: DiagonalizationEngine, timeout: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            timeout,
        }
    }
}

fn error_reply(status: StatusCode, message: String) -> (StatusCode, Json<ResponseBody>) {
    (status, Json(ResponseBody::Error(ErrorBody { error: message })))
}

fn timed_out_reply(timeout: Duration) -> (StatusCode, Json<ResponseBody>) {
    error_reply(
        StatusCode::SERVICE_UNAVAILABLE,
        format!("Request timed out after {} seconds", timeout.as_secs_f64()),
    )
}

/// `POST /api/diagonalize`
async fn diagonalize(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<ResponseBody>) {
    let engine = state.engine.clone();
    // A started blocking task cannot be aborted. On timeout the JoinHandle is
    // dropped, the task runs to completion and its response is discarded.
    let work = tokio::task::spawn_blocking(move || handle_request(&body, &engine));

    match tokio::time::timeout(state.timeout, work).await {
        Ok(Ok(response)) => {
            let status =
                StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(response.body))
        }
        Ok(Err(err)) => {
            error!("diagonalization task failed: {err}");
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "computation failed".to_string(),
            )
        }
        Err(_) => {
            warn!("request exceeded {:?}, detaching its computation", state.timeout);
            timed_out_reply(state.timeout)
        }
    }
}

/// `GET /health`
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/diagonalize", post(diagonalize))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let engine_config = config.engine_config()?;
    let max_dimension = engine_config.max_dimension;
    let state = AppState::new(
        DiagonalizationEngine::new(engine_config),
        Duration::from_secs(config.request_timeout_secs),
    );
    let app = create_app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "serving POST /api/diagonalize on {addr} (matrices up to {max_dimension}×{max_dimension}, timeout {}s)",
        config.request_timeout_secs
    );
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(DiagonalizationEngine::default(), Duration::from_secs(10))
    }

    #[tokio::test]
    async fn diagonalizes_posted_matrix() {
        let (status, Json(body)) = diagonalize(
            State(state()),
            Bytes::from_static(br#"{"matrix": [[4, 1], [2, 3]]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["diagonalizable"], serde_json::json!(true));
        assert_eq!(value["D"], serde_json::json!([[5, 0], [0, 2]]));
    }

    #[tokio::test]
    async fn invalid_request_is_bad_request() {
        let (status, Json(body)) =
            diagonalize(State(state()), Bytes::from_static(br#"{"matrix": []}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            ResponseBody::Error(ErrorBody {
                error: "No matrix provided".to_string()
            })
        );
    }

    #[test]
    fn timeout_is_service_unavailable() {
        let (status, Json(body)) = timed_out_reply(Duration::from_millis(2500));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body,
            ResponseBody::Error(ErrorBody {
                error: "Request timed out after 2.5 seconds".to_string()
            })
        );
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(value) = health_check().await;
        assert_eq!(value["status"], "ok");
    }

    #[test]
    fn missing_engine_config_file_is_an_error() {
        let config = ServerConfig {
            engine_config_path: Some(PathBuf::from("/nonexistent/engine.json")),
            ..Default::default()
        };
        assert!(config.engine_config().is_err());
        assert_eq!(
            ServerConfig::default().engine_config().unwrap(),
            EngineConfig::default()
        );
    }
}
