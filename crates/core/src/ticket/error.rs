use thiserror::Error;

use super::TicketStatus;

/// Error type for ticket operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    /// No ticket carries this id.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// The ticket's current status does not allow the operation.
    #[error("Cannot {operation} ticket {ticket_id}: current status is {current}")]
    InvalidTransition {
        ticket_id: String,
        current: TicketStatus,
        operation: String,
    },

    /// The counter is already serving a ticket.
    #[error("Counter {counter} is still serving {ticket_number}; complete or skip it first")]
    CounterBusy { counter: u32, ticket_number: String },

    /// Counter ids start at 1.
    #[error("Counter id must be a positive integer")]
    InvalidCounter,

    /// A dispatch filter with no categories can never match.
    #[error("Eligible category set must not be empty")]
    EmptyEligibility,

    /// A partial update could not be mapped onto a transition.
    #[error("Invalid ticket update: {0}")]
    InvalidPatch(String),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TicketError {
    /// Short machine-readable name, used in API error bodies and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TicketError::NotFound(_) => "not_found",
            TicketError::InvalidTransition { .. } => "invalid_transition",
            TicketError::CounterBusy { .. } => "counter_busy",
            TicketError::InvalidCounter => "invalid_counter",
            TicketError::EmptyEligibility => "empty_eligibility",
            TicketError::InvalidPatch(_) => "invalid_patch",
            TicketError::Storage(_) => "storage",
        }
    }
}
