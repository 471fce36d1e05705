//! Ticket API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use queueline_core::{CreateTicketRequest, ServiceCategory, Ticket, TicketError, TicketPatch};

use super::ApiError;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a ticket
///
/// Clients may send a whole ticket; only these fields are read. The server
/// assigns number, status and timestamps itself.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketBody {
    /// Client-generated id, used to dedupe retried submissions
    pub id: Option<String>,
    #[serde(alias = "serviceType")]
    pub category: ServiceCategory,
    pub customer_name: Option<String>,
}

impl From<CreateTicketBody> for CreateTicketRequest {
    fn from(body: CreateTicketBody) -> Self {
        Self {
            id: body.id.filter(|id| !id.is_empty()),
            category: body.category,
            customer_name: body.customer_name,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Full ticket snapshot, in insertion order.
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    Ok(Json(state.engine().list()?))
}

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let ticket = state.engine().create(body.into())?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    state
        .engine()
        .get(&id)?
        .map(Json)
        .ok_or_else(|| ApiError(TicketError::NotFound(id)))
}

/// Apply a partial update, validated against the transition table.
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<TicketPatch>,
) -> Result<Json<Ticket>, ApiError> {
    Ok(Json(state.engine().apply_patch(&id, &patch)?))
}
