//! Testing utilities and mock implementations.
//!
//! Mocks for the clock, the store transport, and the snapshot slot, so the
//! engine and the sync layer can be exercised without a network or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use queueline_core::testing::{ManualClock, MemorySnapshotStore, MockTicketRemote};
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let remote = Arc::new(MockTicketRemote::with_clock(clock.clone()));
//! let snapshot = Arc::new(MemorySnapshotStore::new());
//! ```

mod manual_clock;
mod mock_remote;
mod mock_snapshot;

pub use manual_clock::ManualClock;
pub use mock_remote::MockTicketRemote;
pub use mock_snapshot::MemorySnapshotStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::ServiceCategory;
    use crate::ticket::Ticket;

    /// A waiting ticket with a predictable id and number.
    pub fn waiting_ticket(id: &str, category: ServiceCategory, seq: usize, created_at: i64) -> Ticket {
        Ticket::waiting(
            id,
            crate::ticket::format_ticket_number(category, seq),
            category,
            None,
            created_at,
        )
    }

    /// A ticket already being served at `counter`.
    pub fn serving_ticket(
        id: &str,
        category: ServiceCategory,
        seq: usize,
        counter: u32,
        created_at: i64,
    ) -> Ticket {
        let mut ticket = waiting_ticket(id, category, seq, created_at);
        ticket.status = crate::ticket::TicketStatus::Serving;
        ticket.counter = Some(counter);
        ticket.served_at = Some(created_at + 1);
        ticket
    }
}
