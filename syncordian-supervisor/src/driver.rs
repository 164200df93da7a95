//! Bootstraps one peer per trace author, replays the trace, and tears
//! everything down (§4.7).

use std::collections::HashMap;

use syncordian_peer::{Directory, PeerConfig, PeerHandle};
use syncordian_signature::KeyPair;
use syncordian_types::PeerId;
use tokio::task::JoinHandle;

use crate::config::SupervisorConfig;
use crate::error::{DriverError, DriverResult};
use crate::trace::{Edit, Trace};

/// Drives one replay of a trace across a freshly bootstrapped network
/// of peers, one per distinct author.
pub struct Driver {
    handles: HashMap<String, PeerHandle>,
    directory: Directory,
    config: SupervisorConfig,
    joins: Vec<JoinHandle<()>>,
}

impl Driver {
    /// Bootstraps one peer per author in `trace`, each with a fresh
    /// keypair, wired into a shared directory sized to the author count.
    pub async fn bootstrap(trace: &Trace, config: SupervisorConfig) -> Self {
        let authors = trace.authors();
        let network_size = authors.len();
        let directory = Directory::new();
        let peer_config = PeerConfig {
            network_size,
            mailbox_capacity: config.mailbox_capacity,
        };

        let mut handles = HashMap::with_capacity(authors.len());
        let mut joins = Vec::with_capacity(authors.len());
        for (i, author) in authors.into_iter().enumerate() {
            let keypair = KeyPair::generate();
            let (handle, join) = syncordian_peer::spawn(
                PeerId::new(i as u32),
                keypair.signing_key,
                directory.clone(),
                peer_config.clone(),
            )
            .await;
            handles.insert(author, handle);
            joins.push(join);
        }

        Self {
            handles,
            directory,
            config,
            joins,
        }
    }

    /// Drives every commit in order, quiescing after each.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::UnknownAuthor`] if a commit names an
    /// author not present at bootstrap, or propagates a fatal peer
    /// error (e.g. dense-id capacity exhaustion, §4.1) encountered while
    /// enqueueing an edit.
    pub async fn replay(&self, trace: &Trace) -> DriverResult<()> {
        for commit in &trace.commits {
            let handle = self
                .handles
                .get(&commit.author_id)
                .ok_or_else(|| DriverError::UnknownAuthor(commit.author_id.clone()))?;

            for edit in &commit.edits {
                match edit {
                    Edit::Insert { content, index } => {
                        handle.insert(content.clone(), *index).await?;
                    }
                    Edit::Delete { index } => {
                        handle.delete(*index).await?;
                    }
                }
            }
            self.quiesce().await;
        }
        Ok(())
    }

    /// Blocks until every peer has drained its mailbox at least once,
    /// `quiescence_rounds` times over (§9's replacement for sleeps).
    pub async fn quiesce(&self) {
        for _ in 0..self.config.quiescence_rounds {
            for handle in self.handles.values() {
                let _ = handle.print_content().await;
            }
        }
    }

    /// Snapshots every peer's alive content, keyed by author.
    ///
    /// # Errors
    ///
    /// Propagates [`DriverError::Peer`] if any peer's mailbox has closed.
    pub async fn snapshot_all(&self) -> DriverResult<HashMap<String, Vec<String>>> {
        let mut snapshots = HashMap::with_capacity(self.handles.len());
        for (author, handle) in &self.handles {
            let content = handle.print_content().await?;
            snapshots.insert(author.clone(), content);
        }
        Ok(snapshots)
    }

    /// Returns the handle for a specific author, if bootstrapped.
    #[must_use]
    pub fn handle_for(&self, author: &str) -> Option<&PeerHandle> {
        self.handles.get(author)
    }

    /// Terminates every registered peer: removes it from the directory
    /// and aborts its mailbox task. In-flight messages are dropped, as
    /// the transport model specifies (§5).
    pub async fn teardown(self) {
        for handle in self.handles.values() {
            self.directory.unregister(handle.peer_id()).await;
        }
        for join in self.joins {
            join.abort();
        }
    }
}
