use thiserror::Error;

/// Errors raised while talking to the authoritative store or the local
/// snapshot. Callers of the queue never see these; they only flip the
/// online flag or get logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Network failure, timeout, or a gateway that cannot reach the store.
    #[error("Ticket store unreachable: {0}")]
    Unreachable(String),

    /// The store answered but refused the request.
    #[error("Ticket store rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The store answered with a body we could not parse.
    #[error("Failed to decode store response: {0}")]
    Decode(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Reading or writing the local snapshot failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl SyncError {
    /// Returns true if this error means the store cannot be reached.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, SyncError::Unreachable(_))
    }
}
