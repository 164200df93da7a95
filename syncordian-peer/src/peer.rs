//! The peer actor: a single-threaded mailbox loop over one document
//! replica (§4.6, §5). Each peer owns its document and clock
//! exclusively; all interaction with other peers is fire-and-forget
//! message passing through the [`Directory`].

use std::collections::HashMap;

use syncordian_crdt::{Document, InsertOutcome, Line, LineId, VectorClock};
use syncordian_signature::SigningKey;
use syncordian_types::PeerId;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::PeerConfig;
use crate::directory::Directory;
use crate::error::{PeerError, PeerResult};
use crate::message::{Broadcast, PeerMessage};

/// A lightweight handle to a running peer: its id and mailbox sender.
/// Cloning a handle is cheap and shares the same mailbox.
#[derive(Clone)]
pub struct PeerHandle {
    peer_id: PeerId,
    sender: mpsc::Sender<PeerMessage>,
}

impl PeerHandle {
    /// The peer this handle addresses.
    #[must_use]
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Enqueues a local insert.
    pub async fn insert(&self, content: impl Into<String>, index: usize) -> PeerResult<()> {
        self.sender
            .send(PeerMessage::Insert {
                content: content.into(),
                index,
            })
            .await
            .map_err(|_| PeerError::ChannelClosed)
    }

    /// Enqueues a local delete.
    pub async fn delete(&self, index: usize) -> PeerResult<()> {
        self.sender
            .send(PeerMessage::Delete { index })
            .await
            .map_err(|_| PeerError::ChannelClosed)
    }

    /// Snapshots alive content (§4.6 `print_content`).
    pub async fn print_content(&self) -> PeerResult<Vec<String>> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(PeerMessage::PrintContent { reply })
            .await
            .map_err(|_| PeerError::ChannelClosed)?;
        rx.await.map_err(|_| PeerError::ChannelClosed)
    }

    /// Notifies the peer that its own transport handle is now known
    /// (§4.6 `save_pid`); a bookkeeping no-op in this implementation.
    pub async fn save_pid(&self) -> PeerResult<()> {
        self.sender
            .send(PeerMessage::SavePid)
            .await
            .map_err(|_| PeerError::ChannelClosed)
    }
}

/// How many times a stashed line is retried before being permanently
/// discarded once the sender's vector clock has fully caught up (§7,
/// §8 S4). Bounds runaway retries against a still-unresolvable forgery.
const MAX_STASH_RETRIES: u32 = 8;

/// Upper bound on how many lines from a single sender may sit in the
/// pending stash at once (§3: the stash is a bounded multiset). A
/// sender that floods unverifiable lines faster than its clock ever
/// catches up evicts its own oldest stash entry rather than growing
/// without bound.
const MAX_PENDING_PER_SENDER: usize = 32;

struct StashedLine {
    line: Line,
    sender_vc: VectorClock,
    attempts: u32,
}

/// One running peer. Constructed by [`spawn`], driven entirely by its
/// mailbox loop.
pub struct Peer {
    peer_id: PeerId,
    document: Document,
    vector_clock: VectorClock,
    pending_stash: HashMap<PeerId, Vec<StashedLine>>,
    signing_key: SigningKey,
    directory: Directory,
    mailbox: mpsc::Receiver<PeerMessage>,
}

/// Starts a new peer, registers it in `directory`, and returns a handle
/// plus the background task driving its mailbox loop.
///
/// Mirrors the Peer API's `start(peer_id, network_size) -> handle`
/// (§6); key registration happens here too since the directory is also
/// the verifying-key registry.
pub async fn spawn(
    peer_id: PeerId,
    signing_key: SigningKey,
    directory: Directory,
    config: PeerConfig,
) -> (PeerHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.mailbox_capacity);
    directory
        .register(peer_id, tx.clone(), signing_key.verifying_key())
        .await;

    let peer = Peer {
        peer_id,
        document: Document::new(peer_id),
        vector_clock: VectorClock::new(config.network_size),
        pending_stash: HashMap::new(),
        signing_key,
        directory,
        mailbox: rx,
    };

    let handle = PeerHandle {
        peer_id,
        sender: tx,
    };
    let join = tokio::spawn(peer.run());
    (handle, join)
}

impl Peer {
    async fn run(mut self) {
        while let Some(message) = self.mailbox.recv().await {
            match message {
                PeerMessage::Insert { content, index } => {
                    if let Err(err) = self.handle_local_insert(content, index).await {
                        tracing::error!(peer_id = %self.peer_id, %err, "fatal error on local insert, stopping peer");
                        break;
                    }
                }
                PeerMessage::Delete { index } => {
                    if let Err(err) = self.handle_local_delete(index).await {
                        tracing::warn!(peer_id = %self.peer_id, %err, "local delete rejected");
                    }
                }
                PeerMessage::RecvInsert { line, sender_vc } => {
                    self.handle_recv_insert(line, sender_vc).await;
                }
                PeerMessage::RecvDelete {
                    line_id,
                    origin_peer_id,
                    sender_vc,
                } => {
                    self.handle_recv_delete(line_id, origin_peer_id, sender_vc).await;
                }
                PeerMessage::PrintContent { reply } => {
                    let snapshot = self.document.alive_content().into_iter().map(str::to_owned).collect();
                    let _ = reply.send(snapshot);
                }
                PeerMessage::SavePid => {
                    tracing::debug!(peer_id = %self.peer_id, "transport handle acknowledged");
                }
            }
        }
    }

    async fn handle_local_insert(&mut self, content: String, index: usize) -> PeerResult<()> {
        let line = self
            .document
            .insert_by_position(index, content, self.peer_id, &self.signing_key)?;
        self.vector_clock.tick(self.peer_id);
        self.directory
            .broadcast_except(
                self.peer_id,
                Broadcast::Insert {
                    line,
                    vc: self.vector_clock.clone(),
                },
            )
            .await;
        Ok(())
    }

    async fn handle_local_delete(&mut self, index: usize) -> PeerResult<()> {
        self.document.delete_by_index(index)?;
        let line_id = self
            .document
            .line_at_index(index)
            .expect("index just validated by delete_by_index")
            .line_id()
            .clone();
        self.vector_clock.tick(self.peer_id);
        self.directory
            .broadcast_except(
                self.peer_id,
                Broadcast::Delete {
                    line_id,
                    origin_peer_id: self.peer_id,
                    vc: self.vector_clock.clone(),
                },
            )
            .await;
        Ok(())
    }

    async fn handle_recv_insert(&mut self, line: Line, sender_vc: VectorClock) {
        let origin = line.peer_id();
        match self.try_apply(&line, &sender_vc).await {
            Some(true) => {
                self.absorb_remote_vc(&sender_vc).await;
            }
            Some(false) => {
                self.stash_line(origin, StashedLine {
                    line,
                    sender_vc,
                    attempts: 0,
                });
            }
            None => {
                tracing::warn!(peer_id = %self.peer_id, origin = %origin, "no verifying key registered for sender, stashing");
                self.stash_line(origin, StashedLine {
                    line,
                    sender_vc,
                    attempts: 0,
                });
            }
        }
    }

    async fn handle_recv_delete(&mut self, line_id: LineId, origin_peer_id: PeerId, sender_vc: VectorClock) {
        let idx = self.document.index_of(&line_id);
        if let Err(err) = self.document.delete_by_index(idx) {
            tracing::warn!(peer_id = %self.peer_id, %origin_peer_id, %err, "remote delete rejected");
        }
        self.absorb_remote_vc(&sender_vc).await;
    }

    /// Pushes a line into `origin`'s pending stash, evicting the oldest
    /// entry first if that would exceed [`MAX_PENDING_PER_SENDER`] (§3).
    fn stash_line(&mut self, origin: PeerId, entry: StashedLine) {
        let bucket = self.pending_stash.entry(origin).or_default();
        if bucket.len() >= MAX_PENDING_PER_SENDER {
            let evicted = bucket.remove(0);
            tracing::warn!(
                peer_id = %self.peer_id,
                origin = %origin,
                line_id = %evicted.line.line_id(),
                "pending stash full, evicting oldest entry"
            );
        }
        bucket.push(entry);
    }

    /// Merges `remote_vc` into the local clock, then re-runs pending
    /// validation for every sender whose entry in the local clock just
    /// advanced (§3, §7) — not only the sender of the message that
    /// triggered the merge, since a single broadcast can carry
    /// causally-forwarded knowledge about other senders too.
    async fn absorb_remote_vc(&mut self, remote_vc: &VectorClock) {
        let watched: Vec<PeerId> = self.pending_stash.keys().copied().collect();
        let before: Vec<u64> = watched.iter().map(|&p| self.vector_clock.get(p)).collect();

        self.vector_clock.merge(remote_vc);

        for (peer, prev) in watched.into_iter().zip(before) {
            if self.vector_clock.get(peer) > prev {
                self.retry_stash(peer).await;
            }
        }
    }

    /// Returns `Some(true)` if applied, `Some(false)` if it should be
    /// stashed, `None` if the sender's verifying key is unknown.
    async fn try_apply(&mut self, line: &Line, sender_vc: &VectorClock) -> Option<bool> {
        let verifying_key = self.directory.verifying_key(line.peer_id()).await?;
        let outcome = self.document.try_insert_remote(line.clone(), &self.vector_clock, sender_vc, |left, mid, right| {
            mid.verify(left, right, &verifying_key)
        });
        match outcome {
            InsertOutcome::Applied { .. } => Some(true),
            InsertOutcome::Stash => Some(false),
            InsertOutcome::DuplicateDiscarded => Some(true),
        }
    }

    /// Re-validates every stashed line from `origin` now that the local
    /// clock has advanced. Lines that still fail after the sender's VC
    /// has fully caught up are permanently discarded as Byzantine (§7, S4).
    async fn retry_stash(&mut self, origin: PeerId) {
        let Some(mut stashed) = self.pending_stash.remove(&origin) else {
            return;
        };

        let mut made_progress = true;
        while made_progress && !stashed.is_empty() {
            made_progress = false;
            let mut still_pending = Vec::new();

            for mut entry in stashed {
                match self.try_apply(&entry.line, &entry.sender_vc).await {
                    Some(true) => {
                        self.vector_clock.merge(&entry.sender_vc);
                        made_progress = true;
                    }
                    Some(false) | None => {
                        entry.attempts += 1;
                        let caught_up = self.vector_clock.projection_distance(&entry.sender_vc, origin) == 0;
                        if caught_up && entry.attempts >= MAX_STASH_RETRIES {
                            tracing::warn!(
                                peer_id = %self.peer_id,
                                origin = %origin,
                                line_id = %entry.line.line_id(),
                                "stashed line never validated after sender caught up, discarding as Byzantine"
                            );
                        } else {
                            still_pending.push(entry);
                        }
                    }
                }
            }
            stashed = still_pending;
        }

        if !stashed.is_empty() {
            self.pending_stash.insert(origin, stashed);
        }
    }
}
