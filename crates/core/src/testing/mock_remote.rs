//! Mock ticket store transport.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::engine::QueueEngine;
use crate::sync::{SyncCommand, SyncError, TicketRemote};
use crate::ticket::{CreateTicketRequest, InMemoryTicketStore, Ticket, TicketError, TicketPatch};

/// Mock implementation of the [`TicketRemote`] trait.
///
/// Backed by a real [`QueueEngine`] so it enforces the same rules as the
/// server. Provides controllable behavior for testing:
/// - Toggle reachability to simulate network loss
/// - Record every write that reached the store
/// - Act on the store directly, as another client would
///
/// # Example
///
/// ```rust,ignore
/// let remote = Arc::new(MockTicketRemote::new());
/// remote.set_reachable(false);
/// assert!(remote.list().await.unwrap_err().is_unreachable());
/// ```
pub struct MockTicketRemote {
    engine: QueueEngine,
    reachable: AtomicBool,
    list_calls: AtomicUsize,
    writes: Arc<RwLock<Vec<SyncCommand>>>,
}

impl std::fmt::Debug for MockTicketRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTicketRemote")
            .field("reachable", &self.reachable)
            .field("list_calls", &self.list_calls)
            .finish()
    }
}

impl Default for MockTicketRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTicketRemote {
    pub fn new() -> Self {
        Self::with_engine(QueueEngine::new(Arc::new(InMemoryTicketStore::new())))
    }

    /// Back the mock with a store driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_engine(QueueEngine::new(Arc::new(InMemoryTicketStore::with_clock(
            clock,
        ))))
    }

    pub fn with_engine(engine: QueueEngine) -> Self {
        Self {
            engine,
            reachable: AtomicBool::new(true),
            list_calls: AtomicUsize::new(0),
            writes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// The store behind the mock.
    pub fn engine(&self) -> &QueueEngine {
        &self.engine
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of snapshot fetches that reached the store.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Writes that reached the store, in arrival order.
    pub async fn writes(&self) -> Vec<SyncCommand> {
        self.writes.read().await.clone()
    }

    fn check_reachable(&self) -> Result<(), SyncError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::Unreachable("connection refused".to_string()))
        }
    }

    async fn record(&self, command: SyncCommand) {
        self.writes.write().await.push(command);
    }
}

fn rejected(error: TicketError) -> SyncError {
    let status = match error {
        TicketError::NotFound(_) => 404,
        TicketError::InvalidTransition { .. } | TicketError::CounterBusy { .. } => 409,
        TicketError::Storage(_) => 500,
        _ => 400,
    };
    SyncError::Rejected {
        status,
        message: error.to_string(),
    }
}

#[async_trait]
impl TicketRemote for MockTicketRemote {
    async fn list(&self) -> Result<Vec<Ticket>, SyncError> {
        self.check_reachable()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.engine.list().map_err(rejected)
    }

    async fn create(&self, ticket: &Ticket) -> Result<Ticket, SyncError> {
        self.check_reachable()?;
        self.record(SyncCommand::Create(ticket.clone())).await;

        let request = CreateTicketRequest::new(ticket.category)
            .with_id(ticket.id.clone())
            .with_customer_name(ticket.customer_name.clone());
        self.engine.create(request).map_err(rejected)
    }

    async fn update(&self, id: &str, patch: &TicketPatch) -> Result<Ticket, SyncError> {
        self.check_reachable()?;
        self.record(SyncCommand::Update {
            id: id.to_string(),
            patch: patch.clone(),
        })
        .await;
        self.engine.apply_patch(id, patch).map_err(rejected)
    }

    async fn reset(&self) -> Result<(), SyncError> {
        self.check_reachable()?;
        self.record(SyncCommand::Reset).await;
        self.engine.reset().map_err(rejected)
    }
}
