//! Supervisor configuration.

/// Configuration for the trace driver.
///
/// Replaces ad hoc inter-operation sleeps with an explicit, configurable
/// quiescence wait (§9): after each commit, the
/// driver round-trips every peer's mailbox `quiescence_rounds` times,
/// which blocks until that peer has drained everything enqueued ahead
/// of the round-trip, including broadcasts from the commit just driven.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// How many full round-trips to make across all peers after each
    /// commit before proceeding. One round suffices for this network's
    /// full-mesh, single-hop broadcast fan-out; kept configurable for
    /// tests that want extra headroom.
    pub quiescence_rounds: usize,
    /// Mailbox capacity handed to each spawned peer.
    pub mailbox_capacity: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            quiescence_rounds: 2,
            mailbox_capacity: 256,
        }
    }
}
