//! Counter-facing handlers: call next and the read models.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use queueline_core::{
    ticket::{CounterSummary, QueueBoard, WaitingCounts},
    DispatchOutcome, Eligibility, ServiceCategory,
};

use super::ApiError;
use crate::state::AppState;

/// Request body for calling the next ticket
#[derive(Debug, Deserialize)]
pub struct DispatchBody {
    pub counter: u32,
    /// Categories this counter handles. Omit for all.
    pub categories: Option<Vec<ServiceCategory>>,
}

/// Hand the oldest eligible waiting ticket to a counter.
pub async fn call_next(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DispatchBody>,
) -> Result<Json<DispatchOutcome>, ApiError> {
    let eligibility = Eligibility::from_optional(body.categories)?;
    Ok(Json(state.engine().call_next(body.counter, &eligibility)?))
}

pub async fn waiting_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WaitingCounts>, ApiError> {
    Ok(Json(state.engine().waiting_counts()?))
}

/// Now serving and up next, for the public display.
pub async fn board(State(state): State<Arc<AppState>>) -> Result<Json<QueueBoard>, ApiError> {
    let limits = state.board_config();
    Ok(Json(
        state
            .engine()
            .board(limits.serving_limit, limits.waiting_limit)?,
    ))
}

pub async fn counter_summary(
    State(state): State<Arc<AppState>>,
    Path(counter): Path<u32>,
) -> Result<Json<CounterSummary>, ApiError> {
    Ok(Json(state.engine().counter_summary(counter)?))
}
