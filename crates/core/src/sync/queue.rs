//! Client-side queue: a local cache kept in step with the store.
//!
//! Every operation applies to the cache first and returns at once. The
//! write is then handed to the [`SyncForwarder`]. A poll loop fetches the
//! full ticket list and replaces the cache with it, so the store always wins
//! over optimistic local state. When the store cannot be reached the queue
//! flips to offline, keeps serving the last known tickets from the cache and
//! the durable snapshot, and stops forwarding writes until a poll succeeds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::ServiceCategory;
use crate::clock::Clock;
use crate::config::SyncConfig;
use crate::metrics::{SYNC_FORWARDS, SYNC_POLLS};
use crate::ticket::{
    board, counter_summary, ensure_counter_free, next_ticket_number, select_next,
    serving_ticket, waiting_counts, CounterSummary, DispatchOutcome, Eligibility, QueueBoard,
    Ticket, TicketError, TicketPatch, Transition, WaitingCounts,
};

use super::{SnapshotStore, SyncCommand, SyncError, SyncForwarder, TicketRemote};

/// Tuning for a [`SyncedQueue`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub poll_interval: Duration,
    pub forward_buffer: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            forward_buffer: config.forward_buffer,
        }
    }
}

/// State shared between the queue handles and the forwarder.
#[derive(Debug)]
pub(super) struct SharedCache {
    tickets: RwLock<Vec<Ticket>>,
    online: AtomicBool,
}

impl SharedCache {
    fn new(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets: RwLock::new(tickets),
            online: AtomicBool::new(true),
        }
    }

    // A panic while holding the lock cannot leave a half-applied transition
    // behind, so a poisoned cache is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Ticket>> {
        self.tickets.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Ticket>> {
        self.tickets.write().unwrap_or_else(|e| e.into_inner())
    }

    pub(super) fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Returns true if the flag changed.
    pub(super) fn set_online(&self, online: bool) -> bool {
        self.online.swap(online, Ordering::SeqCst) != online
    }
}

/// Create a queue and the forwarder that pushes its writes to `remote`.
///
/// The local cache starts from the snapshot, if one was saved. The caller
/// must spawn the forwarder and usually calls [`SyncedQueue::start`] to
/// begin polling.
pub fn create_sync_system(
    options: SyncOptions,
    remote: Arc<dyn TicketRemote>,
    snapshot: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
) -> (SyncedQueue, SyncForwarder) {
    let initial = match snapshot.load() {
        Ok(Some(tickets)) => {
            info!(count = tickets.len(), "Restored tickets from local snapshot");
            tickets
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Ignoring unreadable local snapshot: {}", e);
            Vec::new()
        }
    };

    let shared = Arc::new(SharedCache::new(initial));
    let (tx, rx) = mpsc::channel(options.forward_buffer.max(1));
    let (shutdown_tx, _) = broadcast::channel(1);

    let queue = SyncedQueue {
        shared: Arc::clone(&shared),
        tx,
        remote: Arc::clone(&remote),
        snapshot,
        clock,
        poll_interval: options.poll_interval,
        running: Arc::new(AtomicBool::new(false)),
        shutdown_tx,
    };
    let forwarder = SyncForwarder::new(rx, remote, shared);

    (queue, forwarder)
}

/// Handle to the client-side queue. Cheap to clone.
#[derive(Clone)]
pub struct SyncedQueue {
    shared: Arc<SharedCache>,
    tx: mpsc::Sender<SyncCommand>,
    remote: Arc<dyn TicketRemote>,
    snapshot: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SyncedQueue {
    // =========================================================================
    // Writes
    // =========================================================================

    /// Issue a ticket locally.
    ///
    /// The number is provisional; the store assigns its own when the write
    /// arrives and the next poll replaces this copy. Do not print it as the
    /// customer's final number; read it back with [`SyncedQueue::get`] after
    /// a successful [`SyncedQueue::poll_once`].
    pub fn create(&self, category: ServiceCategory, customer_name: Option<&str>) -> Ticket {
        let ticket = {
            let mut tickets = self.shared.write();
            let number = next_ticket_number(category, &tickets);
            let ticket = Ticket::waiting(
                Uuid::new_v4().to_string(),
                number,
                category,
                customer_name,
                self.clock.now_ms(),
            );
            tickets.push(ticket.clone());
            ticket
        };

        debug!(number = %ticket.number, "Ticket issued locally");
        self.persist();
        self.forward(SyncCommand::Create(ticket.clone()));
        ticket
    }

    /// Assign the oldest eligible ticket in the cache to `counter`.
    pub fn call_next(
        &self,
        counter: u32,
        eligibility: &Eligibility,
    ) -> Result<DispatchOutcome, TicketError> {
        let now = self.clock.now_ms();
        let outcome = {
            let mut tickets = self.shared.write();
            ensure_counter_free(&tickets, counter, None)?;

            match select_next(&tickets, eligibility) {
                Some(idx) => {
                    tickets[idx].apply(Transition::Serve { counter }, now)?;
                    DispatchOutcome::Dispatched(tickets[idx].clone())
                }
                None => DispatchOutcome::NoTicketAvailable,
            }
        };

        if let DispatchOutcome::Dispatched(ticket) = &outcome {
            debug!(counter, number = %ticket.number, "Ticket dispatched locally");
            self.persist();
            // Forwarded as a claim on this ticket, not a fresh dispatch.
            self.forward(SyncCommand::Update {
                id: ticket.id.clone(),
                patch: TicketPatch::for_transition(Transition::Serve { counter }, now),
            });
        }

        Ok(outcome)
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

    /// Apply a guarded transition to a cached ticket.
    pub fn transition(&self, id: &str, transition: Transition) -> Result<Ticket, TicketError> {
        let now = self.clock.now_ms();
        let ticket = {
            let mut tickets = self.shared.write();
            let idx = tickets
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| TicketError::NotFound(id.to_string()))?;
            if let Transition::Serve { counter } = transition {
                if transition.is_allowed_from(tickets[idx].status) {
                    ensure_counter_free(&tickets, counter, Some(id))?;
                }
            }
            tickets[idx].apply(transition, now)?;
            tickets[idx].clone()
        };

        self.persist();
        self.forward(SyncCommand::Update {
            id: id.to_string(),
            patch: TicketPatch::for_transition(transition, now),
        });
        Ok(ticket)
    }

    /// Clear the cache and the snapshot, and ask the store to do the same.
    ///
    /// While offline only the local side is cleared; the next successful
    /// poll brings back whatever the store still holds.
    pub fn reset(&self) {
        self.shared.write().clear();
        if let Err(e) = self.snapshot.clear() {
            warn!("Failed to clear local snapshot: {}", e);
        }
        info!("Local queue reset");
        self.forward(SyncCommand::Reset);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn tickets(&self) -> Vec<Ticket> {
        self.shared.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Ticket> {
        self.shared.read().iter().find(|t| t.id == id).cloned()
    }

    pub fn is_online(&self) -> bool {
        self.shared.is_online()
    }

    pub fn waiting_counts(&self) -> WaitingCounts {
        waiting_counts(&self.shared.read())
    }

    pub fn board(&self, serving_limit: usize, waiting_limit: usize) -> QueueBoard {
        board(&self.shared.read(), serving_limit, waiting_limit)
    }

    pub fn serving_at(&self, counter: u32) -> Option<Ticket> {
        serving_ticket(&self.shared.read(), counter).cloned()
    }

    pub fn counter_summary(&self, counter: u32) -> CounterSummary {
        counter_summary(&self.shared.read(), counter)
    }

    // =========================================================================
    // Polling
    // =========================================================================

    /// Fetch the store's ticket list and replace the cache with it.
    pub async fn poll_once(&self) -> Result<(), SyncError> {
        match self.remote.list().await {
            Ok(tickets) => {
                let count = tickets.len();
                *self.shared.write() = tickets;
                if self.shared.set_online(true) {
                    info!("Ticket store reachable again, back online");
                }
                self.persist();
                SYNC_POLLS.with_label_values(&["ok"]).inc();
                debug!(count, "Cache refreshed from store");
                Ok(())
            }
            Err(e) if e.is_unreachable() => {
                if self.shared.set_online(false) {
                    warn!("Ticket store unreachable, switching to offline mode: {}", e);
                }
                SYNC_POLLS.with_label_values(&["unreachable"]).inc();
                Err(e)
            }
            Err(e) => {
                warn!("Poll failed: {}", e);
                SYNC_POLLS.with_label_values(&["error"]).inc();
                Err(e)
            }
        }
    }

    /// Start the background poll loop. Polls once immediately.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync poll loop already running");
            return None;
        }

        info!(interval_ms = self.poll_interval.as_millis() as u64, "Starting sync poll loop");

        let queue = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(queue.poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Sync poll loop received shutdown signal");
                        break;
                    }
                    _ = interval.tick() => {
                        if !queue.running.load(Ordering::Relaxed) {
                            break;
                        }
                        // Failures are logged and reflected in the online flag.
                        let _ = queue.poll_once().await;
                    }
                }
            }

            info!("Sync poll loop stopped");
        }))
    }

    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Sync poll loop not running");
            return;
        }
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn persist(&self) {
        let tickets = self.shared.read().clone();
        if let Err(e) = self.snapshot.save(&tickets) {
            warn!("Failed to save local snapshot: {}", e);
        }
    }

    fn forward(&self, command: SyncCommand) {
        if !self.shared.is_online() {
            debug!(command = command.name(), "Offline, write kept local only");
            SYNC_FORWARDS
                .with_label_values(&[command.name(), "dropped"])
                .inc();
            return;
        }

        if let Err(e) = self.tx.try_send(command) {
            let command = match &e {
                mpsc::error::TrySendError::Full(c) | mpsc::error::TrySendError::Closed(c) => c,
            };
            warn!(command = command.name(), "Forward queue unavailable, write kept local only: {}", e);
            SYNC_FORWARDS
                .with_label_values(&[command.name(), "dropped"])
                .inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, ManualClock, MemorySnapshotStore, MockTicketRemote};
    use crate::ticket::TicketStatus;

    struct Harness {
        queue: SyncedQueue,
        forwarder: SyncForwarder,
        remote: Arc<MockTicketRemote>,
        snapshot: Arc<MemorySnapshotStore>,
        clock: Arc<ManualClock>,
    }

    fn harness_with(snapshot: MemorySnapshotStore) -> Harness {
        let clock = Arc::new(ManualClock::new(1_000));
        let remote = Arc::new(MockTicketRemote::with_clock(clock.clone()));
        let snapshot = Arc::new(snapshot);
        let (queue, forwarder) = create_sync_system(
            SyncOptions {
                poll_interval: Duration::from_millis(20),
                forward_buffer: 16,
            },
            remote.clone(),
            snapshot.clone(),
            clock.clone(),
        );
        Harness {
            queue,
            forwarder,
            remote,
            snapshot,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(MemorySnapshotStore::new())
    }

    #[tokio::test]
    async fn test_create_is_optimistic() {
        let h = harness();

        let ticket = h.queue.create(ServiceCategory::Priority, Some("  "));
        assert_eq!(ticket.number, "A001");
        assert_eq!(ticket.customer_name, "Guest");
        assert_eq!(h.queue.tickets(), vec![ticket.clone()]);
        assert_eq!(h.snapshot.saved(), Some(vec![ticket]));

        // Nothing reached the store until the forwarder runs.
        assert!(h.remote.writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_writes_are_forwarded_in_order() {
        let mut h = harness();

        let ticket = h.queue.create(ServiceCategory::Payment, None);
        h.clock.advance(5);
        h.queue.call_next(2, &Eligibility::All).unwrap();
        h.queue.complete(&ticket.id).unwrap();
        h.forwarder.drain_pending().await;

        let writes = h.remote.writes().await;
        let names: Vec<_> = writes.iter().map(|w| w.name()).collect();
        assert_eq!(names, ["create", "update", "update"]);

        let stored = h.remote.engine().get(&ticket.id).unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Completed);
        assert_eq!(stored.counter, Some(2));
    }

    #[tokio::test]
    async fn test_poll_replaces_cache() {
        let h = harness();

        // Another client issued tickets the local cache has never seen.
        h.remote
            .engine()
            .create(crate::ticket::CreateTicketRequest::new(ServiceCategory::DisabilityDeath))
            .unwrap();
        let local = h.queue.create(ServiceCategory::Priority, None);

        h.queue.poll_once().await.unwrap();

        let tickets = h.queue.tickets();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].number, "L001");
        assert!(h.queue.get(&local.id).is_none());
        assert_eq!(h.snapshot.saved(), Some(tickets));
    }

    #[tokio::test]
    async fn test_offline_mode() {
        let mut h = harness();
        h.remote.set_reachable(false);

        let err = h.queue.poll_once().await.unwrap_err();
        assert!(err.is_unreachable());
        assert!(!h.queue.is_online());

        // Local operations keep working against the cache.
        let ticket = h.queue.create(ServiceCategory::Priority, None);
        let outcome = h.queue.call_next(1, &Eligibility::All).unwrap();
        assert_eq!(outcome.ticket().map(|t| t.id.clone()), Some(ticket.id.clone()));
        assert_eq!(h.snapshot.saved().unwrap().len(), 1);

        // Offline writes are never sent.
        h.remote.set_reachable(true);
        h.forwarder.drain_pending().await;
        assert!(h.remote.writes().await.is_empty());

        // Reconnecting restores the store's view.
        h.queue.poll_once().await.unwrap();
        assert!(h.queue.is_online());
        assert!(h.queue.tickets().is_empty());
    }

    #[tokio::test]
    async fn test_forward_failure_flips_offline() {
        let mut h = harness();
        h.queue.create(ServiceCategory::Priority, None);

        h.remote.set_reachable(false);
        h.forwarder.drain_pending().await;

        assert!(!h.queue.is_online());
    }

    #[tokio::test]
    async fn test_restores_from_snapshot() {
        let saved = vec![
            fixtures::waiting_ticket("t1", ServiceCategory::Priority, 1, 10),
            fixtures::serving_ticket("t2", ServiceCategory::Payment, 1, 4, 20),
        ];
        let h = harness_with(MemorySnapshotStore::with_tickets(saved.clone()));

        assert_eq!(h.queue.tickets(), saved);
        assert_eq!(h.queue.serving_at(4).map(|t| t.id), Some("t2".to_string()));
        assert_eq!(h.queue.waiting_counts().total, 1);
    }

    #[tokio::test]
    async fn test_local_rules() {
        let h = harness();
        let first = h.queue.create(ServiceCategory::Priority, None);
        h.clock.advance(1);
        h.queue.create(ServiceCategory::Priority, None);

        let outcome = h.queue.call_next(3, &Eligibility::All).unwrap();
        assert_eq!(outcome.ticket().map(|t| t.id.as_str()), Some(first.id.as_str()));

        assert!(matches!(
            h.queue.call_next(3, &Eligibility::All),
            Err(TicketError::CounterBusy { counter: 3, .. })
        ));

        let only_payment = Eligibility::only([ServiceCategory::Payment]).unwrap();
        assert_eq!(
            h.queue.call_next(4, &only_payment).unwrap(),
            DispatchOutcome::NoTicketAvailable
        );

        assert_eq!(
            h.queue.complete("missing"),
            Err(TicketError::NotFound("missing".to_string()))
        );

        let recalled = h.queue.recall(&first.id).unwrap();
        assert!(recalled.recalled_at.is_some());
        assert_eq!(recalled.status, TicketStatus::Serving);
    }

    #[tokio::test]
    async fn test_reset() {
        let mut h = harness();
        h.queue.create(ServiceCategory::Priority, None);
        h.forwarder.drain_pending().await;

        h.queue.reset();
        h.forwarder.drain_pending().await;

        assert!(h.queue.tickets().is_empty());
        assert_eq!(h.snapshot.saved(), None);
        assert!(h.remote.engine().list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_failure_does_not_block() {
        let h = harness();
        h.snapshot.set_fail_writes(true);

        let ticket = h.queue.create(ServiceCategory::Priority, None);
        assert_eq!(h.queue.tickets(), vec![ticket]);
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let h = harness();

        let handle = h.queue.start().unwrap();
        assert!(h.queue.start().is_none());

        tokio::time::timeout(Duration::from_secs(2), async {
            while h.remote.list_calls() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        h.queue.stop();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!h.queue.is_running());
    }
}
