//! "Call next" selection.
//!
//! These functions only inspect a ticket slice. The authoritative store runs
//! them inside its critical section; the sync layer runs them against its
//! local cache to produce an optimistic answer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::ServiceCategory;

use super::{Ticket, TicketError, TicketStatus};

/// Categories a counter is willing to serve.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Eligibility {
    /// Every category.
    #[default]
    All,
    /// A non-empty subset.
    Only(BTreeSet<ServiceCategory>),
}

impl Eligibility {
    /// Restrict to `categories`, which must not be empty.
    pub fn only(
        categories: impl IntoIterator<Item = ServiceCategory>,
    ) -> Result<Self, TicketError> {
        let set: BTreeSet<_> = categories.into_iter().collect();
        if set.is_empty() {
            return Err(TicketError::EmptyEligibility);
        }
        Ok(Eligibility::Only(set))
    }

    /// `None` means every category.
    pub fn from_optional(
        categories: Option<Vec<ServiceCategory>>,
    ) -> Result<Self, TicketError> {
        match categories {
            None => Ok(Eligibility::All),
            Some(categories) => Self::only(categories),
        }
    }

    pub fn includes(&self, category: ServiceCategory) -> bool {
        match self {
            Eligibility::All => true,
            Eligibility::Only(set) => set.contains(&category),
        }
    }
}

/// Result of a call-next request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "ticket", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The ticket is now serving at the requesting counter.
    Dispatched(Ticket),
    /// Nothing eligible is waiting. Not an error.
    NoTicketAvailable,
}

impl DispatchOutcome {
    pub fn ticket(&self) -> Option<&Ticket> {
        match self {
            DispatchOutcome::Dispatched(ticket) => Some(ticket),
            DispatchOutcome::NoTicketAvailable => None,
        }
    }

    pub fn into_ticket(self) -> Option<Ticket> {
        match self {
            DispatchOutcome::Dispatched(ticket) => Some(ticket),
            DispatchOutcome::NoTicketAvailable => None,
        }
    }

    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Dispatched(_) => "dispatched",
            DispatchOutcome::NoTicketAvailable => "no_ticket_available",
        }
    }
}

/// The ticket currently being served at `counter`, if any.
pub fn serving_ticket(tickets: &[Ticket], counter: u32) -> Option<&Ticket> {
    tickets.iter().find(|t| t.is_serving_at(counter))
}

/// Fail with `CounterBusy` if `counter` is serving a ticket other than `except_id`.
pub fn ensure_counter_free(
    tickets: &[Ticket],
    counter: u32,
    except_id: Option<&str>,
) -> Result<(), TicketError> {
    if counter == 0 {
        return Err(TicketError::InvalidCounter);
    }
    match serving_ticket(tickets, counter) {
        Some(busy) if Some(busy.id.as_str()) != except_id => Err(TicketError::CounterBusy {
            counter,
            ticket_number: busy.number.clone(),
        }),
        _ => Ok(()),
    }
}

/// Index of the oldest waiting ticket matching `eligibility`.
///
/// Ties on `created_at` go to the earlier slice position, i.e. insertion
/// order.
pub fn select_next(tickets: &[Ticket], eligibility: &Eligibility) -> Option<usize> {
    tickets
        .iter()
        .enumerate()
        .filter(|(_, t)| t.status == TicketStatus::Waiting && eligibility.includes(t.category))
        .min_by_key(|(idx, t)| (t.created_at, *idx))
        .map(|(idx, _)| idx)
}
