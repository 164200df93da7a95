//! Error types for the peer layer.

use thiserror::Error;

/// Result type for peer operations.
pub type PeerResult<T> = Result<T, PeerError>;

/// Errors that can occur driving or running a peer.
#[derive(Debug, Error)]
pub enum PeerError {
    /// The peer's mailbox channel has been dropped.
    #[error("channel closed")]
    ChannelClosed,

    /// A directory lookup referenced a peer id with no registered handle.
    #[error("unknown peer: {0}")]
    UnknownPeer(syncordian_types::PeerId),

    /// A local insert hit the dense-id capacity boundary (§4.1). Fatal:
    /// the peer's message loop must terminate, no partial broadcast is
    /// emitted.
    #[error("document error: {0}")]
    Document(#[from] syncordian_crdt::DocumentError),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for PeerError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        PeerError::ChannelClosed
    }
}
