//! Webhook HTTP server
//!
//! Receives chat updates, drives the pipeline, and maps outcomes to status
//! codes: delivered replies are 200, structurally invalid payloads are 400,
//! internal failures are 500. The webhook accepts both a bare update object
//! and the gateway envelope that wraps the update under a `body` key
//! (optionally as a JSON string).

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::PipelineOutcome;
use crate::pipeline::Pipeline;
use crate::telegram::parse_update;

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
}

/// =============================
/// Handlers
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn webhook(
    State(state): State<ApiState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<ApiResponse>) {
    let update = unwrap_event(&payload);

    let outcome = match parse_update(&update) {
        Some(message) => state.pipeline.handle(message).await,
        None => PipelineOutcome::InvalidInput("No chat id found in update".to_string()),
    };

    respond(outcome)
}

/// Unwrap the gateway envelope, if any, down to the update object.
fn unwrap_event(event: &Value) -> Value {
    match event.get("body") {
        Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or(Value::Null),
        Some(body) => body.clone(),
        None => event.clone(),
    }
}

fn respond(outcome: PipelineOutcome) -> (StatusCode, Json<ApiResponse>) {
    match outcome {
        PipelineOutcome::Completed => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "status": "processed"
            }))),
        ),
        PipelineOutcome::InvalidInput(reason) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(reason)))
        }
        PipelineOutcome::Failed(reason) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(reason)),
        ),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(pipeline: Arc<Pipeline>) -> Router {
    let state = ApiState { pipeline };

    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    pipeline: Arc<Pipeline>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(pipeline);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Webhook server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
