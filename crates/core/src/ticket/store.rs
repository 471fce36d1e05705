//! Ticket storage trait and types.

use crate::catalog::ServiceCategory;

use super::{DispatchOutcome, Eligibility, Ticket, TicketError, Transition};

/// Request to issue a new ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicketRequest {
    /// Client-generated id. A resubmitted id returns the stored ticket.
    pub id: Option<String>,
    pub category: ServiceCategory,
    /// Blank or missing names fall back to a placeholder.
    pub customer_name: Option<String>,
}

impl CreateTicketRequest {
    pub fn new(category: ServiceCategory) -> Self {
        Self {
            id: None,
            category,
            customer_name: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }
}

/// Result of [`TicketStore::issue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issued {
    pub ticket: Ticket,
    /// False when the request's id was already stored and nothing was added.
    pub created: bool,
}

/// Trait for ticket storage backends.
///
/// Every mutating method must run as one critical section: no other call
/// may observe or act on a state between its read and its write.
pub trait TicketStore: Send + Sync {
    /// Issue a ticket: allocate id and number, status `WAITING`.
    fn issue(&self, request: CreateTicketRequest) -> Result<Issued, TicketError>;

    /// Like [`TicketStore::issue`], returning only the ticket.
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        self.issue(request).map(|issued| issued.ticket)
    }

    /// Get a ticket by ID.
    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError>;

    /// Snapshot of every ticket in insertion order.
    fn list(&self) -> Result<Vec<Ticket>, TicketError>;

    /// Validate `transition` against the ticket's current state and commit it.
    fn update_by_id(&self, id: &str, transition: Transition) -> Result<Ticket, TicketError>;

    /// Claim the oldest eligible waiting ticket for `counter`.
    fn claim_next(
        &self,
        counter: u32,
        eligibility: &Eligibility,
    ) -> Result<DispatchOutcome, TicketError>;

    /// Remove every ticket.
    fn reset(&self) -> Result<(), TicketError>;
}
