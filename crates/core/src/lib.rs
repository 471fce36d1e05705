//! Walk-up service counter queue: ticket issuing, dispatch to counters, and
//! client synchronization with the authoritative store.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod sync;
pub mod testing;
pub mod ticket;

pub use catalog::{ServiceCategory, ServiceDefinition};
pub use clock::{Clock, SystemClock};
pub use config::{
    load_config, load_config_from_str, validate_config, BoardConfig, Config, ConfigError,
    SanitizedConfig, ServerConfig, SyncConfig,
};
pub use engine::QueueEngine;
pub use sync::{
    create_sync_system, FileSnapshotStore, HttpTicketRemote, SnapshotStore, SyncError,
    SyncForwarder, SyncOptions, SyncedQueue, TicketRemote,
};
pub use ticket::{
    CreateTicketRequest, DispatchOutcome, Eligibility, InMemoryTicketStore, Ticket, TicketError,
    TicketPatch, TicketStatus, TicketStore, Transition,
};
