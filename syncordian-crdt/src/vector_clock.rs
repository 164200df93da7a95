//! Vector Clock for causality tracking across a fixed-size peer set.
//!
//! Each peer has a logical counter that increments on each local
//! broadcast. Comparing vector clocks tells us whether two events are
//! causally related or concurrent, and [`VectorClock::projection_distance`]
//! tells us how far behind we are on one specific peer — the quantity
//! that sizes the stash window in [`crate::Document::try_insert_remote`].

use serde::{Deserialize, Serialize};
use syncordian_types::PeerId;

/// Causality relationship between two vector clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CausalOrder {
    /// `self` happened before `other`.
    Before,
    /// `self` happened after `other`.
    After,
    /// Neither clock happened before the other.
    Concurrent,
    /// The clocks are identical.
    Equal,
}

/// A vector clock over a fixed, bootstrap-known set of peers.
///
/// Unlike a clock keyed by an unbounded peer set, this is a dense
/// `Vec<u64>` indexed by `PeerId`, sized once at construction: the
/// network size is known at bootstrap (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClock {
    entries: Vec<u64>,
}

impl VectorClock {
    /// Creates a new all-zero clock sized for `network_size` peers.
    #[must_use]
    pub fn new(network_size: usize) -> Self {
        Self {
            entries: vec![0; network_size],
        }
    }

    /// Returns the number of peers this clock tracks.
    #[must_use]
    pub fn network_size(&self) -> usize {
        self.entries.len()
    }

    /// Returns the logical time recorded for `peer` (0 if out of range).
    #[must_use]
    pub fn get(&self, peer: PeerId) -> u64 {
        self.entries.get(peer.as_usize()).copied().unwrap_or(0)
    }

    /// Increments the entry for `peer` and returns the new value.
    pub fn tick(&mut self, peer: PeerId) -> u64 {
        self.grow_for(peer);
        let entry = &mut self.entries[peer.as_usize()];
        *entry += 1;
        *entry
    }

    /// Merges `other` into `self`, taking the element-wise maximum.
    pub fn merge(&mut self, other: &Self) {
        if other.entries.len() > self.entries.len() {
            self.entries.resize(other.entries.len(), 0);
        }
        for (mine, theirs) in self.entries.iter_mut().zip(other.entries.iter()) {
            if theirs > mine {
                *mine = *theirs;
            }
        }
    }

    /// Returns a new clock that is the merge of `self` and `other`.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// The number of operations originating at `remote_origin` that this
    /// clock has not yet observed, relative to `remote`.
    ///
    /// `max(0, remote[remote_origin] - local[remote_origin] - 1)` (§4.3).
    /// This sizes the sliding-window stash search: the `-1` accounts for
    /// the very operation currently being validated, which `remote` has
    /// already counted but we have not yet applied.
    #[must_use]
    pub fn projection_distance(&self, remote: &Self, remote_origin: PeerId) -> u64 {
        let local_time = self.get(remote_origin);
        let remote_time = remote.get(remote_origin);
        remote_time.saturating_sub(local_time).saturating_sub(1)
    }

    /// Compares `self` with `other` to determine causal ordering.
    #[must_use]
    pub fn compare(&self, other: &Self) -> CausalOrder {
        let len = self.entries.len().max(other.entries.len());
        let mut self_dominates = true;
        let mut other_dominates = true;

        for i in 0..len {
            let a = self.entries.get(i).copied().unwrap_or(0);
            let b = other.entries.get(i).copied().unwrap_or(0);
            if a < b {
                self_dominates = false;
            }
            if b < a {
                other_dominates = false;
            }
        }

        match (self_dominates, other_dominates) {
            (true, true) => CausalOrder::Equal,
            (true, false) => CausalOrder::After,
            (false, true) => CausalOrder::Before,
            (false, false) => CausalOrder::Concurrent,
        }
    }

    fn grow_for(&mut self, peer: PeerId) {
        if peer.as_usize() >= self.entries.len() {
            self.entries.resize(peer.as_usize() + 1, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: u32) -> PeerId {
        PeerId::new(i)
    }

    #[test]
    fn new_clock_is_all_zero() {
        let vc = VectorClock::new(3);
        assert_eq!(vc.get(p(0)), 0);
        assert_eq!(vc.get(p(2)), 0);
    }

    #[test]
    fn tick_increments_own_entry_only() {
        let mut vc = VectorClock::new(2);
        vc.tick(p(0));
        vc.tick(p(0));
        assert_eq!(vc.get(p(0)), 2);
        assert_eq!(vc.get(p(1)), 0);
    }

    #[test]
    fn merge_takes_elementwise_max() {
        let mut a = VectorClock::new(2);
        a.tick(p(0));
        let mut b = VectorClock::new(2);
        b.tick(p(1));
        b.tick(p(1));
        a.merge(&b);
        assert_eq!(a.get(p(0)), 1);
        assert_eq!(a.get(p(1)), 2);
    }

    #[test]
    fn compare_detects_before_after_concurrent_equal() {
        let a = VectorClock::new(2);
        let mut b = a.clone();
        b.tick(p(0));
        assert_eq!(a.compare(&b), CausalOrder::Before);
        assert_eq!(b.compare(&a), CausalOrder::After);
        assert_eq!(a.compare(&a), CausalOrder::Equal);

        let mut c = a.clone();
        c.tick(p(0));
        let mut d = a.clone();
        d.tick(p(1));
        assert_eq!(c.compare(&d), CausalOrder::Concurrent);
    }

    #[test]
    fn projection_distance_counts_unseen_ops() {
        let local = VectorClock::new(2);
        let mut remote = VectorClock::new(2);
        remote.tick(p(1));
        remote.tick(p(1));
        remote.tick(p(1));
        // remote has 3 ops from peer 1; we've seen 0; the one "currently
        // arriving" doesn't count as unseen backlog.
        assert_eq!(local.projection_distance(&remote, p(1)), 2);
    }

    #[test]
    fn projection_distance_is_zero_when_caught_up() {
        let mut local = VectorClock::new(2);
        local.tick(p(1));
        let mut remote = VectorClock::new(2);
        remote.tick(p(1));
        assert_eq!(local.projection_distance(&remote, p(1)), 0);
    }

    #[test]
    fn merge_grows_to_larger_network_size() {
        let mut a = VectorClock::new(1);
        let mut b = VectorClock::new(3);
        b.tick(p(2));
        a.merge(&b);
        assert_eq!(a.network_size(), 3);
        assert_eq!(a.get(p(2)), 1);
    }
}
