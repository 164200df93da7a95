//! The peer directory: peer-id -> mailbox handle and peer-id -> verifying key.
//!
//! Per §9's design note, this is an explicit, interior-mutable,
//! read-mostly map rather than a program-global registry: written once
//! as each peer starts, read on every broadcast fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use syncordian_signature::VerifyingKey;
use syncordian_types::PeerId;
use tokio::sync::{mpsc, RwLock};

use crate::message::{Broadcast, PeerMessage};

/// Shared, read-mostly registry mapping each peer to its mailbox sender
/// and public verifying key.
#[derive(Clone, Default)]
pub struct Directory {
    inner: Arc<RwLock<HashMap<PeerId, Entry>>>,
}

#[derive(Clone)]
struct Entry {
    sender: mpsc::Sender<PeerMessage>,
    verifying_key: VerifyingKey,
}

impl Directory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `peer_id`'s mailbox and public key. Called once, at
    /// peer start.
    pub async fn register(&self, peer_id: PeerId, sender: mpsc::Sender<PeerMessage>, verifying_key: VerifyingKey) {
        self.inner.write().await.insert(
            peer_id,
            Entry {
                sender,
                verifying_key,
            },
        );
    }

    /// Removes `peer_id` from the directory (supervisor teardown).
    pub async fn unregister(&self, peer_id: PeerId) {
        self.inner.write().await.remove(&peer_id);
    }

    /// Returns the verifying key registered for `peer_id`, if any.
    pub async fn verifying_key(&self, peer_id: PeerId) -> Option<VerifyingKey> {
        self.inner.read().await.get(&peer_id).map(|e| e.verifying_key)
    }

    /// Sends `broadcast` to every registered peer except `exclude`
    /// (broadcast fan-out excludes the sender's own address, §4.6).
    pub async fn broadcast_except(&self, exclude: PeerId, broadcast: Broadcast) {
        let entries = self.inner.read().await;
        for (peer_id, entry) in entries.iter() {
            if *peer_id == exclude {
                continue;
            }
            let message: PeerMessage = broadcast.clone().into();
            if entry.sender.send(message).await.is_err() {
                tracing::warn!(%peer_id, "broadcast: recipient mailbox closed, dropping");
            }
        }
    }

    /// All peer ids currently registered.
    pub async fn peer_ids(&self) -> Vec<PeerId> {
        self.inner.read().await.keys().copied().collect()
    }
}
