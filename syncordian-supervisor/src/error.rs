//! Error types for the supervisor/driver layer.

use thiserror::Error;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors bootstrapping or replaying a trace.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A commit referenced an author with no corresponding peer.
    #[error("unknown author: {0}")]
    UnknownAuthor(String),

    /// The trace's JSON could not be parsed.
    #[error("malformed trace: {0}")]
    MalformedTrace(#[from] serde_json::Error),

    /// A driven peer's mailbox was closed or it hit a fatal error.
    #[error("peer error: {0}")]
    Peer(#[from] syncordian_peer::PeerError),
}
