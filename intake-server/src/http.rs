//! Intake HTTP chat API
//!
//! Axum-based HTTP server that is the chat surface for one interview session.
//! The server owns the single live `Interview`; every request locks it, runs
//! one pass of the reducer and answers with the resulting view.
//!
//! Each endpoint has a thin axum handler that delegates to an inner function
//! returning `(StatusCode, serde_json::Value)`, so the logic is testable
//! without axum dispatch.
//!
//! Endpoints:
//! - GET  /health          — liveness plus question count and output target
//! - GET  /version         — server version info
//! - GET  /session         — current view (prompt + transcript, or summary)
//! - POST /session/answer  — submit one answer for the current question
//! - POST /session/retake  — clear the session and start over

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use intake_core::config::HttpConfig;
use intake_core::{
    create_classifier, Classifier, CsvRecordWriter, IntakeConfig, IntakeError, Interview,
    RecordWriter, ViewModel,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};

/// Shared state for all HTTP handlers
pub struct HttpState {
    pub interview: Mutex<Interview>,
    pub classifier: Box<dyn Classifier>,
    pub writer: Box<dyn RecordWriter>,
}

impl HttpState {
    pub fn new(
        interview: Interview,
        classifier: Box<dyn Classifier>,
        writer: Box<dyn RecordWriter>,
    ) -> Self {
        Self {
            interview: Mutex::new(interview),
            classifier,
            writer,
        }
    }

    /// Build the session, classifier and CSV writer described by `config`.
    pub fn from_config(config: &IntakeConfig) -> Result<Self> {
        let interview = Interview::new(
            config.questions.clone(),
            config.classifier.accept_label.clone(),
        )?;
        let classifier = create_classifier(&config.classifier)?;
        let writer = Box::new(CsvRecordWriter::new(&config.storage.output_path));

        tracing::info!(
            questions = config.questions.len(),
            classifier = classifier.name(),
            output = %config.storage.output_path,
            "Interview session ready"
        );

        Ok(Self::new(interview, classifier, writer))
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/session", get(session_handler))
        .route("/session/answer", post(answer_handler))
        .route("/session/retake", post(retake_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    http: &HttpConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", http.host, http.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Intake HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub text: Option<String>,
}

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: "error".to_string(),
        }
    }

    fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.error,
            "status": self.status,
        })
    }
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check — reports what this server is serving.
pub async fn health_inner(state: &HttpState) -> (StatusCode, serde_json::Value) {
    let interview = state.interview.lock().await;
    (
        StatusCode::OK,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "questions": interview.state().sequencer().len(),
            "complete": interview.is_complete(),
            "classifier": state.classifier.name(),
            "output": state.writer.target(),
        }),
    )
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "intake/1",
    })
}

/// Inner session — the current view, unchanged.
pub async fn session_inner(state: &HttpState) -> (StatusCode, serde_json::Value) {
    let interview = state.interview.lock().await;
    (StatusCode::OK, view_to_json(&interview.view()))
}

/// Inner answer — validates the request body and runs one reducer pass.
pub async fn answer_inner(
    state: &HttpState,
    req: AnswerRequest,
) -> (StatusCode, serde_json::Value) {
    let text = match req.text {
        Some(t) if !t.is_empty() => t,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("text field is required").to_value(),
            );
        }
    };

    let mut interview = state.interview.lock().await;
    match interview
        .submit(&text, state.classifier.as_ref(), state.writer.as_ref())
        .await
    {
        Ok(view) => (StatusCode::OK, view_to_json(&view)),
        Err(e) => {
            let status = error_status(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, "Answer handling failed");
            }
            (status, ErrorResponse::new(e.to_string()).to_value())
        }
    }
}

/// Inner retake — resets the session.
pub async fn retake_inner(state: &HttpState) -> (StatusCode, serde_json::Value) {
    let mut interview = state.interview.lock().await;
    (StatusCode::OK, view_to_json(&interview.retake()))
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn session_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = session_inner(&state).await;
    (status, Json(body))
}

pub async fn answer_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<AnswerRequest>,
) -> impl IntoResponse {
    let (status, body) = answer_inner(&state, req).await;
    (status, Json(body))
}

pub async fn retake_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = retake_inner(&state).await;
    (status, Json(body))
}

// ============================================================================
// Helpers
// ============================================================================

/// Map a reducer error to the HTTP status the client sees.
pub fn error_status(err: &IntakeError) -> StatusCode {
    match err {
        IntakeError::EmptyInput => StatusCode::BAD_REQUEST,
        IntakeError::SessionComplete => StatusCode::CONFLICT,
        IntakeError::Classification(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn view_to_json(view: &ViewModel) -> serde_json::Value {
    serde_json::to_value(view).unwrap_or_else(|e| {
        ErrorResponse::new(format!("failed to serialize view: {e}")).to_value()
    })
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================
