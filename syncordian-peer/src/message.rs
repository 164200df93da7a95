//! Mailbox messages (§4.6) and the wire broadcast format (§6).

use serde::{Deserialize, Serialize};
use syncordian_crdt::{Line, LineId, VectorClock};
use syncordian_types::PeerId;
use tokio::sync::oneshot;

/// A message a peer's mailbox loop can receive.
///
/// This is the in-process counterpart of the wire [`Broadcast`] format:
/// `RecvInsert`/`RecvDelete` are constructed from a received `Broadcast`
/// by the transport layer before being enqueued.
pub enum PeerMessage {
    /// A local edit: insert `content` at visible position `index`.
    Insert {
        /// The new line's content.
        content: String,
        /// The visible document position to insert at.
        index: usize,
    },
    /// A local edit: tombstone the line currently at `index`.
    Delete {
        /// The visible document position to delete.
        index: usize,
    },
    /// A line broadcast by another peer, to be validated and possibly
    /// applied or stashed.
    RecvInsert {
        /// The received, signed line.
        line: Line,
        /// The sender's vector clock at broadcast time.
        sender_vc: VectorClock,
    },
    /// A delete broadcast by another peer.
    RecvDelete {
        /// The id of the line to tombstone.
        line_id: LineId,
        /// The peer that issued the delete.
        origin_peer_id: PeerId,
        /// The sender's vector clock at broadcast time.
        sender_vc: VectorClock,
    },
    /// Snapshot the alive content, reported back through `reply`.
    PrintContent {
        /// Where to send the snapshot.
        reply: oneshot::Sender<Vec<String>>,
    },
    /// Record that this peer's own transport handle is now known.
    /// A bookkeeping no-op in this implementation, since the mailbox
    /// sender is available at construction time; kept for parity with
    /// the per-peer message table (§4.6).
    SavePid,
}

/// The logical wire format peers exchange (§6). Transport-agnostic:
/// this crate never opens a socket, it only defines what travels across
/// whatever reliable, per-sender-FIFO channel the caller supplies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Broadcast {
    /// A newly inserted, signed line.
    Insert {
        /// The line being broadcast.
        line: Line,
        /// The sender's vector clock at broadcast time.
        vc: VectorClock,
    },
    /// A tombstone.
    Delete {
        /// The id of the tombstoned line.
        line_id: LineId,
        /// The peer that issued the delete.
        origin_peer_id: PeerId,
        /// The sender's vector clock at broadcast time.
        vc: VectorClock,
    },
}

impl From<Broadcast> for PeerMessage {
    fn from(broadcast: Broadcast) -> Self {
        match broadcast {
            Broadcast::Insert { line, vc } => PeerMessage::RecvInsert {
                line,
                sender_vc: vc,
            },
            Broadcast::Delete {
                line_id,
                origin_peer_id,
                vc,
            } => PeerMessage::RecvDelete {
                line_id,
                origin_peer_id,
                sender_vc: vc,
            },
        }
    }
}
