//! The line record: an immutable-after-creation, signed unit of content.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use syncordian_signature::{sign_binding, verify_binding, Signature, SigningKey, VerifyingKey};
use syncordian_types::{LineStatus, PeerId};

use crate::LineId;

/// A single line of content, bound to its originating peer and signed
/// against the two neighbours it was inserted between (§3, §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    line_id: LineId,
    content: String,
    peer_id: PeerId,
    signature: Signature,
    status: LineStatus,
    commit_at: HashMap<PeerId, u64>,
}

impl Line {
    /// Creates and signs a new line against `left_parent` and `right_parent`.
    ///
    /// Used by the originating peer at insert time; the resulting line's
    /// signature is only ever valid against this exact neighbour pair.
    #[must_use]
    pub fn new_signed(
        line_id: LineId,
        content: String,
        peer_id: PeerId,
        signing_key: &SigningKey,
        left_parent_id: &LineId,
        right_parent_id: &LineId,
    ) -> Self {
        let signature = sign_binding(
            signing_key,
            left_parent_id.to_string().as_bytes(),
            content.as_bytes(),
            line_id.to_string().as_bytes(),
            right_parent_id.to_string().as_bytes(),
        );
        Self {
            line_id,
            content,
            peer_id,
            signature,
            status: LineStatus::Alive,
            commit_at: HashMap::new(),
        }
    }

    /// Constructs a sentinel line (infimum/supremum) with no meaningful
    /// signature — sentinels are never transmitted or signature-checked.
    #[must_use]
    pub fn sentinel(line_id: LineId, peer_id: PeerId, placeholder_signature: Signature) -> Self {
        Self {
            line_id,
            content: String::new(),
            peer_id,
            signature: placeholder_signature,
            status: LineStatus::Alive,
            commit_at: HashMap::new(),
        }
    }

    /// Reconstructs a line received over the wire, with a signature to
    /// be verified by the caller before insertion.
    #[must_use]
    pub fn from_wire(
        line_id: LineId,
        content: String,
        peer_id: PeerId,
        signature: Signature,
    ) -> Self {
        Self {
            line_id,
            content,
            peer_id,
            signature,
            status: LineStatus::Alive,
            commit_at: HashMap::new(),
        }
    }

    /// The line's dense ordering key.
    #[must_use]
    pub fn line_id(&self) -> &LineId {
        &self.line_id
    }

    /// The line's content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The originating peer.
    #[must_use]
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// The line's current lifecycle status.
    #[must_use]
    pub fn status(&self) -> LineStatus {
        self.status
    }

    /// Marks this line as tombstoned.
    pub fn tombstone(&mut self) {
        self.status = LineStatus::Tombstone;
    }

    /// Records the first moment `peer` observed this line as committed.
    /// A second call for the same peer is a no-op (§3: "first moment").
    pub fn record_commit_at(&mut self, peer: PeerId, at: u64) {
        self.commit_at.entry(peer).or_insert(at);
    }

    /// Returns the recorded commit time for `peer`, if any.
    #[must_use]
    pub fn commit_at(&self, peer: PeerId) -> Option<u64> {
        self.commit_at.get(&peer).copied()
    }

    /// Verifies this line's signature against a candidate neighbour pair.
    ///
    /// Succeeds iff `(left, right)` is exactly the pair `verifying_key`'s
    /// owner signed against.
    #[must_use]
    pub fn verify(&self, left_parent: &Line, right_parent: &Line, verifying_key: &VerifyingKey) -> bool {
        verify_binding(
            verifying_key,
            left_parent.line_id.to_string().as_bytes(),
            self.content.as_bytes(),
            self.line_id.to_string().as_bytes(),
            right_parent.line_id.to_string().as_bytes(),
            &self.signature,
        )
    }
}
