//! Client synchronization with the authoritative ticket store.
//!
//! A [`SyncedQueue`] keeps a local cache that answers every read and accepts
//! every write immediately, a [`SyncForwarder`] pushes writes to the store in
//! the background, and a poll loop keeps the cache in line with the store.
//! A [`SnapshotStore`] persists the cache so a restarted client can keep
//! working without the network.

mod error;
mod forwarder;
mod queue;
mod remote;
mod snapshot;

pub use error::SyncError;
pub use forwarder::{SyncCommand, SyncForwarder};
pub use queue::{create_sync_system, SyncOptions, SyncedQueue};
pub use remote::{HttpTicketRemote, TicketRemote};
pub use snapshot::{FileSnapshotStore, SnapshotStore, SNAPSHOT_KEY};
