//! Queue engine: the operations collaborators call.
//!
//! Wraps a [`TicketStore`] with logging, metrics and the read models used by
//! the display and staff screens. All invariants are enforced by the store;
//! the engine never mutates tickets itself.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::metrics::{result_label, DISPATCH_REQUESTS, TICKETS_ISSUED, TRANSITIONS};
use crate::ticket::{
    board, counter_summary, waiting_counts, CounterSummary, CreateTicketRequest,
    DispatchOutcome, Eligibility, Issued, QueueBoard, Ticket, TicketError, TicketPatch, TicketStore,
    Transition, WaitingCounts,
};

/// Authoritative queue operations.
#[derive(Clone)]
pub struct QueueEngine {
    store: Arc<dyn TicketStore>,
}

impl QueueEngine {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Issue a ticket. A resubmitted id returns the stored ticket unchanged.
    pub fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let Issued { ticket, created } = self.store.issue(request)?;
        if !created {
            debug!(ticket_id = %ticket.id, "Ticket resubmitted, returning stored copy");
            return Ok(ticket);
        }

        TICKETS_ISSUED
            .with_label_values(&[ticket.category.as_str()])
            .inc();
        info!(
            ticket_id = %ticket.id,
            number = %ticket.number,
            category = %ticket.category,
            "Ticket issued"
        );
        Ok(ticket)
    }

    /// Assign the oldest eligible waiting ticket to `counter`.
    pub fn call_next(
        &self,
        counter: u32,
        eligibility: &Eligibility,
    ) -> Result<DispatchOutcome, TicketError> {
        let result = self.store.claim_next(counter, eligibility);

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(e) => e.kind(),
        };
        DISPATCH_REQUESTS.with_label_values(&[label]).inc();

        match &result {
            Ok(DispatchOutcome::Dispatched(ticket)) => {
                info!(counter, number = %ticket.number, "Ticket dispatched");
            }
            Ok(DispatchOutcome::NoTicketAvailable) => {
                debug!(counter, "No eligible ticket waiting");
            }
            Err(e) => {
                warn!(counter, "Call next refused: {}", e);
            }
        }

        result
    }

    pub fn complete(&self, id: &str) -> Result<Ticket, TicketError> {
        self.transition(id, Transition::Complete)
    }

    pub fn skip(&self, id: &str) -> Result<Ticket, TicketError> {
        self.transition(id, Transition::Skip)
    }

    pub fn recall(&self, id: &str) -> Result<Ticket, TicketError> {
        self.transition(id, Transition::Recall)
    }

    /// Apply a single guarded transition.
    pub fn transition(&self, id: &str, transition: Transition) -> Result<Ticket, TicketError> {
        let result = self.store.update_by_id(id, transition);
        TRANSITIONS
            .with_label_values(&[transition.name(), result_label(&result)])
            .inc();

        match &result {
            Ok(ticket) => info!(
                ticket_id = %id,
                number = %ticket.number,
                operation = transition.name(),
                status = %ticket.status,
                "Ticket updated"
            ),
            Err(e) => warn!(ticket_id = %id, operation = transition.name(), "Update refused: {}", e),
        }

        result
    }

    /// Apply a partial update received over the wire.
    ///
    /// The patch is mapped onto the transition table; a patch that changes
    /// nothing returns the ticket as stored.
    pub fn apply_patch(&self, id: &str, patch: &TicketPatch) -> Result<Ticket, TicketError> {
        let current = self
            .store
            .get(id)?
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        match patch.to_transition(&current)? {
            Some(transition) => self.transition(id, transition),
            None => Ok(current),
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        self.store.get(id)
    }

    pub fn list(&self) -> Result<Vec<Ticket>, TicketError> {
        self.store.list()
    }

    /// Clear the whole queue. Irreversible.
    pub fn reset(&self) -> Result<(), TicketError> {
        self.store.reset()?;
        info!("Queue reset");
        Ok(())
    }

    pub fn waiting_counts(&self) -> Result<WaitingCounts, TicketError> {
        Ok(waiting_counts(&self.store.list()?))
    }

    pub fn board(&self, serving_limit: usize, waiting_limit: usize) -> Result<QueueBoard, TicketError> {
        Ok(board(&self.store.list()?, serving_limit, waiting_limit))
    }

    pub fn counter_summary(&self, counter: u32) -> Result<CounterSummary, TicketError> {
        if counter == 0 {
            return Err(TicketError::InvalidCounter);
        }
        Ok(counter_summary(&self.store.list()?, counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ServiceCategory;
    use crate::testing::ManualClock;
    use crate::ticket::{InMemoryTicketStore, TicketStatus};

    fn engine() -> (QueueEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let store = Arc::new(InMemoryTicketStore::with_clock(clock.clone()));
        (QueueEngine::new(store), clock)
    }

    fn issue(engine: &QueueEngine, clock: &ManualClock, category: ServiceCategory) -> Ticket {
        clock.advance(1);
        engine.create(CreateTicketRequest::new(category)).unwrap()
    }

    #[test]
    fn test_walkthrough() {
        let (engine, clock) = engine();
        let only_a = Eligibility::only([ServiceCategory::Priority]).unwrap();

        let a1 = issue(&engine, &clock, ServiceCategory::Priority);
        let b1 = issue(&engine, &clock, ServiceCategory::RefundDividend);
        let a2 = issue(&engine, &clock, ServiceCategory::Priority);
        assert_eq!(
            [a1.number.as_str(), b1.number.as_str(), a2.number.as_str()],
            ["A001", "B001", "A002"]
        );

        let first = engine.call_next(1, &only_a).unwrap().into_ticket().unwrap();
        assert_eq!(first.id, a1.id);
        assert_eq!(first.counter, Some(1));

        let second = engine.call_next(2, &only_a).unwrap().into_ticket().unwrap();
        assert_eq!(second.id, a2.id);

        let done = engine.complete(&a1.id).unwrap();
        assert_eq!(done.status, TicketStatus::Completed);
        assert!(done.completed_at.is_some());

        assert!(matches!(
            engine.skip(&a1.id),
            Err(TicketError::InvalidTransition { .. })
        ));

        assert!(matches!(
            engine.call_next(2, &only_a),
            Err(TicketError::CounterBusy { counter: 2, .. })
        ));
    }

    #[test]
    fn test_apply_patch_maps_to_transitions() {
        let (engine, clock) = engine();
        let ticket = issue(&engine, &clock, ServiceCategory::Payment);

        let serving = engine
            .apply_patch(&ticket.id, &TicketPatch::for_transition(Transition::Serve { counter: 3 }, 0))
            .unwrap();
        assert_eq!(serving.status, TicketStatus::Serving);
        assert_eq!(serving.counter, Some(3));

        let unchanged = engine.apply_patch(&ticket.id, &TicketPatch::default()).unwrap();
        assert_eq!(unchanged, serving);

        let result = engine.apply_patch("missing", &TicketPatch::default());
        assert_eq!(result, Err(TicketError::NotFound("missing".to_string())));
    }

    #[test]
    fn test_read_models() {
        let (engine, clock) = engine();
        issue(&engine, &clock, ServiceCategory::Priority);
        issue(&engine, &clock, ServiceCategory::Payment);
        issue(&engine, &clock, ServiceCategory::Payment);
        engine.call_next(7, &Eligibility::All).unwrap();

        let counts = engine.waiting_counts().unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.for_category(ServiceCategory::Payment), 2);

        let board = engine.board(4, 8).unwrap();
        assert_eq!(board.now_serving.len(), 1);
        assert_eq!(board.up_next.len(), 2);

        let summary = engine.counter_summary(7).unwrap();
        assert!(summary.serving.is_some());
        assert_eq!(engine.counter_summary(0), Err(TicketError::InvalidCounter));
    }

    #[test]
    fn test_resubmitted_id_is_not_counted_again() {
        let (engine, _clock) = engine();
        let issued = || {
            TICKETS_ISSUED
                .with_label_values(&[ServiceCategory::RealEstate.as_str()])
                .get()
        };
        let before = issued();
        let request = CreateTicketRequest::new(ServiceCategory::RealEstate).with_id("kiosk-7");

        let first = engine.create(request.clone()).unwrap();
        let retry = engine.create(request).unwrap();

        assert_eq!(first, retry);
        assert_eq!(engine.list().unwrap().len(), 1);
        assert_eq!(issued() - before, 1);
    }

    #[test]
    fn test_reset() {
        let (engine, clock) = engine();
        issue(&engine, &clock, ServiceCategory::Priority);
        engine.reset().unwrap();
        assert!(engine.list().unwrap().is_empty());
    }
}
