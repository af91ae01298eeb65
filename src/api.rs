// Copyright 2025 Steeria
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// HTTP boundary for the dashboard and HTTP producers

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::error::{QueryError, ValidationError};
use crate::protocol::{HealthResponse, IngestAck, LatestSnapshot, RawHistory, Reading};
use crate::service::SensorService;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SensorService>,
    pub port: u16,
}

impl AppState {
    pub fn new(service: Arc<SensorService>, port: u16) -> Self {
        Self { service, port }
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let message = match self {
            ValidationError::InvalidRoom { .. } => "Código de sala inválido.",
            ValidationError::InvalidNumericField { .. } => {
                "temperatura e umidade devem ser números."
            }
        };
        (StatusCode::BAD_REQUEST, Json(json!({ "erro": message }))).into_response()
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            QueryError::InvalidRoom { .. } => (StatusCode::BAD_REQUEST, "Sala inválida."),
            QueryError::NotFound { .. } => (StatusCode::NOT_FOUND, "Sala sem dados ainda."),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Response for a handler that panicked
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "erro": "Falha ao processar ingestão." })),
    )
        .into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ingest/ambiente", post(ingest_handler))
        .route("/status/:sala", get(status_handler))
        .route("/historico/:sala", get(history_handler))
        .route("/api/ambiente/latest", get(latest_handler))
        .route("/api/ambiente/:sala", get(raw_history_handler))
        // Panics surface as a generic 500
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until the future is dropped or the listener fails
pub async fn serve(state: AppState, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("HTTP API listening on http://{}", bind_address);
    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.service.health(state.port))
}

/// A missing or unparsable body is treated as an empty payload
pub async fn ingest_handler(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<Json<IngestAck>, ValidationError> {
    let payload = payload.map(|Json(value)| value).unwrap_or(Value::Null);
    let reading = state.service.coordinator().submit(&payload).await?;
    Ok(Json(IngestAck::ok(reading)))
}

pub async fn status_handler(
    State(state): State<AppState>,
    Path(sala): Path<String>,
) -> Result<Json<Reading>, QueryError> {
    state.service.queries().status(&sala).map(Json)
}

pub async fn history_handler(
    State(state): State<AppState>,
    Path(sala): Path<String>,
) -> Result<Json<Vec<Reading>>, QueryError> {
    state.service.queries().history(&sala).map(Json)
}

pub async fn latest_handler(State(state): State<AppState>) -> Json<LatestSnapshot> {
    Json(state.service.queries().latest_snapshot().await)
}

/// Not checked against the room registry
pub async fn raw_history_handler(
    State(state): State<AppState>,
    Path(sala): Path<String>,
) -> Json<RawHistory> {
    Json(state.service.queries().raw_history(&sala).await)
}
