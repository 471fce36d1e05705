//! Ticket model, numbering, dispatch and storage.

mod dispatch;
mod error;
mod memory_store;
mod numbering;
mod projection;
mod store;
mod types;

pub use dispatch::{ensure_counter_free, select_next, serving_ticket, DispatchOutcome, Eligibility};
pub use error::TicketError;
pub use memory_store::InMemoryTicketStore;
pub use numbering::{format_ticket_number, next_ticket_number};
pub use projection::{
    board, counter_summary, waiting_counts, CounterSummary, QueueBoard, WaitingCounts,
};
pub use store::{CreateTicketRequest, Issued, TicketStore};
pub use types::{
    normalize_customer_name, Ticket, TicketPatch, TicketStatus, Transition,
    DEFAULT_CUSTOMER_NAME,
};
