use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use queueline_core::{catalog, SanitizedConfig, ServiceDefinition};

use super::ApiError;
use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// The fixed service catalog, in display order.
pub async fn list_services() -> Json<&'static [ServiceDefinition]> {
    Json(catalog::services())
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub success: bool,
}

/// Clear every ticket. Used at the start of a business day.
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<ResetResponse>, ApiError> {
    state.engine().reset()?;
    Ok(Json(ResetResponse { success: true }))
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
