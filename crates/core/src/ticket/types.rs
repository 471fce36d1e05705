//! Core ticket data types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::ServiceCategory;

use super::TicketError;

/// Display name used when a customer does not give one.
pub const DEFAULT_CUSTOMER_NAME: &str = "Guest";

fn default_customer_name() -> String {
    DEFAULT_CUSTOMER_NAME.to_string()
}

/// Trims a customer name, falling back to the placeholder when blank.
pub fn normalize_customer_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default_customer_name(),
    }
}

/// Lifecycle status of a ticket.
///
/// ```text
/// WAITING -> SERVING -> COMPLETED
///                   \-> SKIPPED
/// ```
///
/// `COMPLETED` and `SKIPPED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Waiting,
    Serving,
    Completed,
    Skipped,
}

impl TicketStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Waiting,
        TicketStatus::Serving,
        TicketStatus::Completed,
        TicketStatus::Skipped,
    ];

    /// Returns true if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Completed | TicketStatus::Skipped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Waiting => "WAITING",
            TicketStatus::Serving => "SERVING",
            TicketStatus::Completed => "COMPLETED",
            TicketStatus::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A guarded mutation of a single ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    /// Assign a waiting ticket to a counter.
    Serve { counter: u32 },
    /// Finish serving.
    Complete,
    /// Give up on a ticket being served (customer absent).
    Skip,
    /// Re-announce a ticket being served. Status is unchanged.
    Recall,
}

impl Transition {
    /// Operation name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Serve { .. } => "serve",
            Transition::Complete => "complete",
            Transition::Skip => "skip",
            Transition::Recall => "recall",
        }
    }

    /// The transition table.
    pub fn is_allowed_from(&self, status: TicketStatus) -> bool {
        match self {
            Transition::Serve { .. } => status == TicketStatus::Waiting,
            Transition::Complete | Transition::Skip | Transition::Recall => {
                status == TicketStatus::Serving
            }
        }
    }
}

/// A customer's place in the queue for one service category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Opaque unique identifier.
    pub id: String,

    /// Display code, e.g. `A001`.
    pub number: String,

    #[serde(alias = "serviceType")]
    pub category: ServiceCategory,

    pub status: TicketStatus,

    /// Epoch milliseconds. Defines FIFO order.
    pub created_at: i64,

    /// Set once, when the ticket starts being served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub served_at: Option<i64>,

    /// Set once, when the ticket completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,

    /// Refreshed on every recall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recalled_at: Option<i64>,

    /// Counter currently or previously serving this ticket. Never cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<u32>,

    #[serde(default = "default_customer_name")]
    pub customer_name: String,
}

impl Ticket {
    /// Create a freshly issued, waiting ticket.
    pub fn waiting(
        id: impl Into<String>,
        number: impl Into<String>,
        category: ServiceCategory,
        customer_name: Option<&str>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            category,
            status: TicketStatus::Waiting,
            created_at,
            served_at: None,
            completed_at: None,
            recalled_at: None,
            counter: None,
            customer_name: normalize_customer_name(customer_name),
        }
    }

    /// Returns true if this ticket is being served at `counter`.
    pub fn is_serving_at(&self, counter: u32) -> bool {
        self.status == TicketStatus::Serving && self.counter == Some(counter)
    }

    /// Validate `transition` against the transition table and apply it.
    ///
    /// On error the ticket is left untouched. Counter exclusivity spans
    /// several tickets and is checked by the caller.
    pub fn apply(&mut self, transition: Transition, now: i64) -> Result<(), TicketError> {
        if !transition.is_allowed_from(self.status) {
            return Err(TicketError::InvalidTransition {
                ticket_id: self.id.clone(),
                current: self.status,
                operation: transition.name().to_string(),
            });
        }

        match transition {
            Transition::Serve { counter } => {
                if counter == 0 {
                    return Err(TicketError::InvalidCounter);
                }
                self.status = TicketStatus::Serving;
                self.served_at = Some(now);
                self.counter = Some(counter);
            }
            Transition::Complete => {
                self.status = TicketStatus::Completed;
                self.completed_at = Some(now);
            }
            Transition::Skip => {
                self.status = TicketStatus::Skipped;
            }
            Transition::Recall => {
                self.recalled_at = Some(now);
            }
        }

        Ok(())
    }
}

/// Partial ticket body accepted by `PUT /tickets/{id}`.
///
/// Immutable fields (id, number, category, createdAt, customerName) are not
/// part of the patch and are ignored if sent. Timestamps are accepted for
/// wire compatibility but the store stamps its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub served_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recalled_at: Option<i64>,
}

impl TicketPatch {
    /// Build the patch a client sends to forward `transition`.
    pub fn for_transition(transition: Transition, now: i64) -> Self {
        match transition {
            Transition::Serve { counter } => Self {
                status: Some(TicketStatus::Serving),
                counter: Some(counter),
                served_at: Some(now),
                ..Default::default()
            },
            Transition::Complete => Self {
                status: Some(TicketStatus::Completed),
                completed_at: Some(now),
                ..Default::default()
            },
            Transition::Skip => Self {
                status: Some(TicketStatus::Skipped),
                ..Default::default()
            },
            Transition::Recall => Self {
                recalled_at: Some(now),
                ..Default::default()
            },
        }
    }

    /// Map this patch onto a transition of `current`.
    ///
    /// `Ok(None)` means the patch changes nothing.
    pub fn to_transition(&self, current: &Ticket) -> Result<Option<Transition>, TicketError> {
        let invalid = |operation: &str| TicketError::InvalidTransition {
            ticket_id: current.id.clone(),
            current: current.status,
            operation: operation.to_string(),
        };

        match self.status {
            Some(status) if status == current.status => {
                if let Some(counter) = self.counter {
                    if current.counter != Some(counter) {
                        return Err(invalid("reassign"));
                    }
                }
                if status == TicketStatus::Serving && self.recalled_at.is_some() {
                    Ok(Some(Transition::Recall))
                } else {
                    Ok(None)
                }
            }
            Some(TicketStatus::Serving) => match self.counter {
                Some(counter) => Ok(Some(Transition::Serve { counter })),
                None => Err(TicketError::InvalidPatch(
                    "counter is required when status is SERVING".to_string(),
                )),
            },
            Some(TicketStatus::Completed) => Ok(Some(Transition::Complete)),
            Some(TicketStatus::Skipped) => Ok(Some(Transition::Skip)),
            Some(TicketStatus::Waiting) => Err(invalid("requeue")),
            None => {
                if self.counter.is_some() {
                    return Err(TicketError::InvalidPatch(
                        "counter can only be set together with status SERVING".to_string(),
                    ));
                }
                if self.recalled_at.is_some() {
                    Ok(Some(Transition::Recall))
                } else {
                    Ok(None)
                }
            }
        }
    }
}
