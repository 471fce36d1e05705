//! Mapping of queue errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use queueline_core::TicketError;
use serde::Serialize;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

/// A [`TicketError`] returned from a handler.
#[derive(Debug)]
pub struct ApiError(pub TicketError);

impl From<TicketError> for ApiError {
    fn from(error: TicketError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            TicketError::NotFound(_) => StatusCode::NOT_FOUND,
            TicketError::InvalidTransition { .. } | TicketError::CounterBusy { .. } => {
                StatusCode::CONFLICT
            }
            TicketError::InvalidCounter
            | TicketError::EmptyEligibility
            | TicketError::InvalidPatch(_) => StatusCode::BAD_REQUEST,
            TicketError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}
