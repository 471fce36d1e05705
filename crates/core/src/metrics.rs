//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket issuing and dispatch
//! - Status transitions
//! - Client synchronization (polls and forwarded writes)

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts};

// =============================================================================
// Queue Metrics
// =============================================================================

/// Tickets issued by category.
pub static TICKETS_ISSUED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("queueline_tickets_issued_total", "Total tickets issued"),
        &["category"],
    )
    .unwrap()
});

/// Call-next requests by result.
pub static DISPATCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "queueline_dispatch_requests_total",
            "Total call-next requests",
        ),
        &["result"], // "dispatched", "no_ticket_available", "counter_busy", ...
    )
    .unwrap()
});

/// Status transitions by operation and result.
pub static TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "queueline_transitions_total",
            "Ticket status transitions attempted",
        ),
        &["operation", "result"],
    )
    .unwrap()
});

// =============================================================================
// Sync Metrics
// =============================================================================

/// Sync polls by result.
pub static SYNC_POLLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("queueline_sync_polls_total", "Client poll cycles"),
        &["result"], // "ok", "unreachable", "error"
    )
    .unwrap()
});

/// Writes forwarded to the store by result.
pub static SYNC_FORWARDS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "queueline_sync_forwards_total",
            "Client writes forwarded to the store",
        ),
        &["command", "result"], // result: "ok", "rejected", "unreachable", "dropped"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Metric label for the result of a ticket operation.
pub(crate) fn result_label<T>(result: &Result<T, crate::ticket::TicketError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    }
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TICKETS_ISSUED.clone()),
        Box::new(DISPATCH_REQUESTS.clone()),
        Box::new(TRANSITIONS.clone()),
        Box::new(SYNC_POLLS.clone()),
        Box::new(SYNC_FORWARDS.clone()),
    ]
}
