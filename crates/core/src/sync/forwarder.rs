//! Background forwarding of local writes to the store.
//!
//! Local operations never wait on the network. They enqueue a
//! [`SyncCommand`] on a bounded channel and a single [`SyncForwarder`] task
//! drains it, so writes reach the store in the order they were made.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::metrics::SYNC_FORWARDS;
use crate::ticket::{Ticket, TicketPatch};

use super::queue::SharedCache;
use super::TicketRemote;

/// A write made locally that the store has not seen yet.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncCommand {
    Create(Ticket),
    Update { id: String, patch: TicketPatch },
    Reset,
}

impl SyncCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SyncCommand::Create(_) => "create",
            SyncCommand::Update { .. } => "update",
            SyncCommand::Reset => "reset",
        }
    }
}

/// Drains the command channel into the remote store.
///
/// Must be spawned as a task: `tokio::spawn(forwarder.run())`. Ends once
/// every [`super::SyncedQueue`] handle has been dropped.
pub struct SyncForwarder {
    rx: mpsc::Receiver<SyncCommand>,
    remote: Arc<dyn TicketRemote>,
    shared: Arc<SharedCache>,
}

impl SyncForwarder {
    pub(super) fn new(
        rx: mpsc::Receiver<SyncCommand>,
        remote: Arc<dyn TicketRemote>,
        shared: Arc<SharedCache>,
    ) -> Self {
        Self { rx, remote, shared }
    }

    pub async fn run(mut self) {
        info!("Sync forwarder started");

        while let Some(command) = self.rx.recv().await {
            self.forward(command).await;
        }

        info!("Sync forwarder stopped");
    }

    async fn forward(&self, command: SyncCommand) {
        let name = command.name();

        // Went offline after the command was queued.
        if !self.shared.is_online() {
            debug!(command = name, "Dropping write while offline");
            SYNC_FORWARDS.with_label_values(&[name, "dropped"]).inc();
            return;
        }

        let result = match &command {
            SyncCommand::Create(ticket) => self.remote.create(ticket).await.map(|_| ()),
            SyncCommand::Update { id, patch } => self.remote.update(id, patch).await.map(|_| ()),
            SyncCommand::Reset => self.remote.reset().await,
        };

        match result {
            Ok(()) => {
                debug!(command = name, "Write forwarded");
                SYNC_FORWARDS.with_label_values(&[name, "ok"]).inc();
            }
            Err(e) if e.is_unreachable() => {
                if self.shared.set_online(false) {
                    warn!("Ticket store unreachable, switching to offline mode: {}", e);
                }
                SYNC_FORWARDS.with_label_values(&[name, "unreachable"]).inc();
            }
            Err(e) => {
                // The next poll brings the cache back in line with the store.
                warn!(command = name, "Store rejected forwarded write: {}", e);
                SYNC_FORWARDS.with_label_values(&[name, "rejected"]).inc();
            }
        }
    }

    /// Forward whatever is queued right now, without waiting for more.
    #[cfg(test)]
    pub(super) async fn drain_pending(&mut self) {
        while let Ok(command) = self.rx.try_recv() {
            self.forward(command).await;
        }
    }
}
