//! Peer configuration.

/// Configuration for a single peer's message loop.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Size of the vector clock (number of peers in the network), known
    /// at bootstrap (§3).
    pub network_size: usize,
    /// Capacity of the peer's mailbox channel.
    pub mailbox_capacity: usize,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            network_size: 1,
            mailbox_capacity: 256,
        }
    }
}
