//! In-memory ticket store.

use std::sync::{Arc, Mutex, MutexGuard};

use super::dispatch::{ensure_counter_free, select_next};
use super::numbering::next_ticket_number;
use super::{
    CreateTicketRequest, DispatchOutcome, Eligibility, Issued, Ticket, TicketError, TicketStore,
    Transition,
};
use crate::clock::{Clock, SystemClock};

/// Ticket store holding every ticket behind a single mutex.
///
/// The mutex is the one serialization point for numbering, dispatch and
/// transitions, which is what keeps two counters from claiming the same
/// ticket.
pub struct InMemoryTicketStore {
    tickets: Mutex<Vec<Ticket>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTicketStore {
    /// Create an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Create an empty store stamped by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tickets: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Ticket>>, TicketError> {
        self.tickets
            .lock()
            .map_err(|e| TicketError::Storage(format!("ticket lock poisoned: {}", e)))
    }
}

impl Default for InMemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketStore for InMemoryTicketStore {
    fn issue(&self, request: CreateTicketRequest) -> Result<Issued, TicketError> {
        let mut tickets = self.lock()?;

        if let Some(ref id) = request.id {
            if let Some(existing) = tickets.iter().find(|t| &t.id == id) {
                return Ok(Issued {
                    ticket: existing.clone(),
                    created: false,
                });
            }
        }

        let id = request
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let number = next_ticket_number(request.category, &tickets);
        let ticket = Ticket::waiting(
            id,
            number,
            request.category,
            request.customer_name.as_deref(),
            self.clock.now_ms(),
        );

        tickets.push(ticket.clone());
        Ok(Issued {
            ticket,
            created: true,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let tickets = self.lock()?;
        Ok(tickets.iter().find(|t| t.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Ticket>, TicketError> {
        Ok(self.lock()?.clone())
    }

    fn update_by_id(&self, id: &str, transition: Transition) -> Result<Ticket, TicketError> {
        let mut tickets = self.lock()?;

        let idx = tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        if let Transition::Serve { counter } = transition {
            // Only relevant once the ticket could actually move to SERVING.
            if transition.is_allowed_from(tickets[idx].status) {
                ensure_counter_free(&tickets, counter, Some(id))?;
            }
        }

        let now = self.clock.now_ms();
        let ticket = &mut tickets[idx];
        ticket.apply(transition, now)?;
        Ok(ticket.clone())
    }

    fn claim_next(
        &self,
        counter: u32,
        eligibility: &Eligibility,
    ) -> Result<DispatchOutcome, TicketError> {
        let mut tickets = self.lock()?;

        ensure_counter_free(&tickets, counter, None)?;

        let Some(idx) = select_next(&tickets, eligibility) else {
            return Ok(DispatchOutcome::NoTicketAvailable);
        };

        let now = self.clock.now_ms();
        let ticket = &mut tickets[idx];
        ticket.apply(Transition::Serve { counter }, now)?;
        Ok(DispatchOutcome::Dispatched(ticket.clone()))
    }

    fn reset(&self) -> Result<(), TicketError> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ServiceCategory;
    use crate::testing::ManualClock;
    use crate::ticket::TicketStatus;

    fn create_test_store() -> (InMemoryTicketStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = InMemoryTicketStore::with_clock(clock.clone());
        (store, clock)
    }

    fn issue(store: &InMemoryTicketStore, clock: &ManualClock, category: ServiceCategory) -> Ticket {
        clock.advance(10);
        store.create(CreateTicketRequest::new(category)).unwrap()
    }

    #[test]
    fn test_create_ticket() {
        let (store, _clock) = create_test_store();
        let ticket = store
            .create(CreateTicketRequest::new(ServiceCategory::Payment).with_customer_name("Pedro"))
            .unwrap();

        assert!(!ticket.id.is_empty());
        assert_eq!(ticket.number, "G001");
        assert_eq!(ticket.status, TicketStatus::Waiting);
        assert_eq!(ticket.created_at, 1_000);
        assert_eq!(ticket.customer_name, "Pedro");
    }

    #[test]
    fn test_numbers_per_category() {
        let (store, clock) = create_test_store();
        let a1 = issue(&store, &clock, ServiceCategory::Priority);
        let b1 = issue(&store, &clock, ServiceCategory::RefundDividend);
        let a2 = issue(&store, &clock, ServiceCategory::Priority);

        assert_eq!(a1.number, "A001");
        assert_eq!(b1.number, "B001");
        assert_eq!(a2.number, "A002");
    }

    #[test]
    fn test_create_dedupes_by_id() {
        let (store, _clock) = create_test_store();
        let request = CreateTicketRequest::new(ServiceCategory::Priority).with_id("client-1");

        let first = store.issue(request.clone()).unwrap();
        let second = store.issue(request).unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.ticket, second.ticket);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_get_ticket() {
        let (store, clock) = create_test_store();
        let created = issue(&store, &clock, ServiceCategory::Priority);

        assert_eq!(store.get(&created.id).unwrap(), Some(created));
        assert_eq!(store.get("nonexistent-id").unwrap(), None);
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let (store, clock) = create_test_store();
        let ids: Vec<String> = (0..3)
            .map(|_| issue(&store, &clock, ServiceCategory::Payment).id)
            .collect();

        let listed: Vec<String> = store.list().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_claim_next_takes_oldest() {
        let (store, clock) = create_test_store();
        let a1 = issue(&store, &clock, ServiceCategory::Priority);
        let _b1 = issue(&store, &clock, ServiceCategory::RefundDividend);
        let a2 = issue(&store, &clock, ServiceCategory::Priority);
        let only_a = Eligibility::only([ServiceCategory::Priority]).unwrap();

        let first = store.claim_next(1, &only_a).unwrap().into_ticket().unwrap();
        assert_eq!(first.id, a1.id);
        assert_eq!(first.status, TicketStatus::Serving);
        assert_eq!(first.counter, Some(1));

        let second = store.claim_next(2, &only_a).unwrap().into_ticket().unwrap();
        assert_eq!(second.id, a2.id);

        assert_eq!(
            store.claim_next(3, &only_a).unwrap(),
            DispatchOutcome::NoTicketAvailable
        );
    }

    #[test]
    fn test_claim_next_counter_busy_changes_nothing() {
        let (store, clock) = create_test_store();
        issue(&store, &clock, ServiceCategory::Priority);
        issue(&store, &clock, ServiceCategory::Priority);

        store.claim_next(1, &Eligibility::All).unwrap();
        let before = store.list().unwrap();

        let result = store.claim_next(1, &Eligibility::All);
        assert!(matches!(
            result,
            Err(TicketError::CounterBusy { counter: 1, .. })
        ));
        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn test_claim_next_rejects_counter_zero() {
        let (store, clock) = create_test_store();
        issue(&store, &clock, ServiceCategory::Priority);
        assert_eq!(
            store.claim_next(0, &Eligibility::All),
            Err(TicketError::InvalidCounter)
        );
    }

    #[test]
    fn test_update_complete_then_skip_fails() {
        let (store, clock) = create_test_store();
        let ticket = issue(&store, &clock, ServiceCategory::Priority);
        store.claim_next(1, &Eligibility::All).unwrap();

        clock.advance(500);
        let done = store.update_by_id(&ticket.id, Transition::Complete).unwrap();
        assert_eq!(done.status, TicketStatus::Completed);
        assert_eq!(done.completed_at, Some(clock.now_ms()));

        let result = store.update_by_id(&ticket.id, Transition::Skip);
        assert!(matches!(
            result,
            Err(TicketError::InvalidTransition {
                current: TicketStatus::Completed,
                ..
            })
        ));
    }

    #[test]
    fn test_update_unknown_id() {
        let (store, _clock) = create_test_store();
        assert_eq!(
            store.update_by_id("missing", Transition::Recall),
            Err(TicketError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_serve_specific_ticket_respects_counter_exclusivity() {
        let (store, clock) = create_test_store();
        let first = issue(&store, &clock, ServiceCategory::Priority);
        let second = issue(&store, &clock, ServiceCategory::Priority);

        store
            .update_by_id(&first.id, Transition::Serve { counter: 5 })
            .unwrap();
        let result = store.update_by_id(&second.id, Transition::Serve { counter: 5 });

        assert!(matches!(result, Err(TicketError::CounterBusy { counter: 5, .. })));
        assert_eq!(
            store.get(&second.id).unwrap().unwrap().status,
            TicketStatus::Waiting
        );
    }

    #[test]
    fn test_serve_already_serving_ticket_is_invalid_transition() {
        let (store, clock) = create_test_store();
        let ticket = issue(&store, &clock, ServiceCategory::Priority);
        store
            .update_by_id(&ticket.id, Transition::Serve { counter: 1 })
            .unwrap();

        let result = store.update_by_id(&ticket.id, Transition::Serve { counter: 1 });
        assert!(matches!(result, Err(TicketError::InvalidTransition { .. })));
    }

    #[test]
    fn test_recall_keeps_status() {
        let (store, clock) = create_test_store();
        let ticket = issue(&store, &clock, ServiceCategory::Priority);
        store.claim_next(1, &Eligibility::All).unwrap();

        clock.advance(100);
        let recalled = store.update_by_id(&ticket.id, Transition::Recall).unwrap();
        assert_eq!(recalled.status, TicketStatus::Serving);
        assert_eq!(recalled.recalled_at, Some(clock.now_ms()));
    }

    #[test]
    fn test_reset_clears_and_restarts_numbering() {
        let (store, clock) = create_test_store();
        issue(&store, &clock, ServiceCategory::Priority);
        issue(&store, &clock, ServiceCategory::Priority);

        store.reset().unwrap();
        assert!(store.list().unwrap().is_empty());

        let fresh = issue(&store, &clock, ServiceCategory::Priority);
        assert_eq!(fresh.number, "A001");
    }
}
