//! In-memory snapshot slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::sync::{SnapshotStore, SyncError};
use crate::ticket::Ticket;

/// [`SnapshotStore`] kept in memory, with an optional failure switch.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<Vec<Ticket>>>,
    fail_writes: AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `tickets` already saved, as if left by a previous run.
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self {
            slot: Mutex::new(Some(tickets)),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// What is currently saved.
    pub fn saved(&self) -> Option<Vec<Ticket>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every subsequent save and clear fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), SyncError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::Snapshot("simulated write failure".to_string()));
        }
        Ok(())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Vec<Ticket>>, SyncError> {
        Ok(self.saved())
    }

    fn save(&self, tickets: &[Ticket]) -> Result<(), SyncError> {
        self.check_writable()?;
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(tickets.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), SyncError> {
        self.check_writable()?;
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
