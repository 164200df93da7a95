//! The ordered document sequence and its sliding-window stash validation.

use std::cmp::Ordering;
use std::collections::HashMap;

use syncordian_signature::{Signature, SigningKey};
use syncordian_types::PeerId;

use crate::{Line, LineId, VectorClock};

/// How much causally-unseen slack the sliding-window search tolerates
/// beyond the projection distance (§4.5, §9 "stash bound"). Retained
/// from the source without documented rationale beyond "tolerates
/// boundary VC drift".
pub const STASH_WINDOW_SLACK: u64 = 2;

/// Errors raised by document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// Attempted to delete a sentinel (infimum or supremum).
    #[error("cannot delete a sentinel line")]
    SentinelDelete,

    /// `LineId::allocate_between` reported the dense-id space is
    /// exhausted between a document's two neighbours — fatal (§4.1, §7).
    #[error(transparent)]
    CapacityExhausted(#[from] crate::LineIdError),
}

/// The outcome of attempting to apply a remote insert (§4.5, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The line verified and was inserted at the given document index.
    Applied {
        /// The index the line now occupies.
        index: usize,
    },
    /// The line's signature did not verify against any candidate
    /// neighbour pair in the permitted window. The caller must place it
    /// in the per-sender pending stash and retry later.
    Stash,
    /// A line with this id already exists in the document. Discarded
    /// permanently; never mutates the document.
    DuplicateDiscarded,
}

/// An ordered sequence of lines, strictly increasing by [`LineId`].
///
/// Index 0 is always the infimum sentinel; index `len - 1` is always the
/// supremum sentinel. Both exist from construction and are never
/// removed or transmitted (§3).
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<Line>,
    index: HashMap<LineId, usize>,
}

impl Document {
    /// Creates a new document containing only the infimum and supremum
    /// sentinels, owned by `peer_id`.
    #[must_use]
    pub fn new(peer_id: PeerId) -> Self {
        let infimum = Line::sentinel(LineId::infimum(), peer_id, Signature::placeholder());
        let supremum = Line::sentinel(LineId::supremum(), peer_id, Signature::placeholder());
        let lines = vec![infimum, supremum];
        let mut doc = Self {
            lines,
            index: HashMap::new(),
        };
        doc.reindex();
        doc
    }

    /// The number of lines, including both sentinels (always >= 2).
    #[must_use]
    pub fn length(&self) -> usize {
        self.lines.len()
    }

    /// Returns the line at `index`, or `None` if out of range.
    #[must_use]
    pub fn line_at_index(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Returns the document index of `line_id`.
    ///
    /// Falls back to index `1` (just after the infimum) with a warning
    /// if the id is not present — a defensive fallback for contexts
    /// where the line is expected to exist (§7 "position not found").
    #[must_use]
    pub fn index_of(&self, line_id: &LineId) -> usize {
        match self.index.get(line_id) {
            Some(&idx) => idx,
            None => {
                tracing::warn!(%line_id, "index_of: line not found, falling back to index 1");
                1
            }
        }
    }

    /// Returns the line with the given id, if present.
    #[must_use]
    pub fn line_by_id(&self, line_id: &LineId) -> Option<&Line> {
        self.index.get(line_id).and_then(|&idx| self.lines.get(idx))
    }

    /// Returns the smallest index `i` such that `doc[i].line_id >= incoming`.
    ///
    /// This is the resolved semantics for the Open Question in §9: one
    /// consistent definition, used by every caller (tentative-splice
    /// position for both local inserts and the stash search).
    #[must_use]
    pub fn new_index_for_incoming(&self, incoming: &LineId) -> usize {
        let idx = self.lines.partition_point(|l| l.line_id() < incoming);
        if idx >= self.lines.len() {
            tracing::warn!(
                line_id = %incoming,
                "new_index_for_incoming: incoming id exceeds supremum, falling back to index 1"
            );
            return 1;
        }
        idx
    }

    /// Returns the effective left/right neighbours for inserting at `idx`,
    /// clamping to `[0, len-2]` so the result always lands strictly
    /// between two existing lines (§4.4).
    #[must_use]
    pub fn parents_of_index(&self, idx: usize) -> (&Line, &Line) {
        let clamped = self.clamp_index(idx);
        (&self.lines[clamped], &self.lines[clamped + 1])
    }

    fn clamp_index(&self, idx: usize) -> usize {
        let max = self.lines.len().saturating_sub(2);
        idx.min(max)
    }

    /// Inserts new `content` at visible position `idx`, signing it
    /// against its clamped neighbour pair.
    ///
    /// # Errors
    ///
    /// Propagates [`DocumentError::CapacityExhausted`] if the dense-id
    /// space between the neighbours is exhausted — fatal at the
    /// originator (§4.1, §7): the caller must not broadcast anything.
    pub fn insert_by_position(
        &mut self,
        idx: usize,
        content: String,
        peer_id: PeerId,
        signing_key: &SigningKey,
    ) -> Result<Line, DocumentError> {
        let clamped = self.clamp_index(idx);
        let left_id = self.lines[clamped].line_id().clone();
        let right_id = self.lines[clamped + 1].line_id().clone();
        let new_id = LineId::allocate_between(&left_id, &right_id)?;
        let line = Line::new_signed(new_id, content, peer_id, signing_key, &left_id, &right_id);
        self.lines.insert(clamped + 1, line.clone());
        self.reindex();
        Ok(line)
    }

    /// Attempts to apply a remote insert, running the §4.5 sliding-window
    /// stash check. `verify` is supplied by the caller (typically backed
    /// by `syncordian_signature::verify_binding` plus a peer directory
    /// lookup) so this crate stays decoupled from key management.
    pub fn try_insert_remote<F>(
        &mut self,
        line: Line,
        local_vc: &VectorClock,
        remote_vc: &VectorClock,
        verify: F,
    ) -> InsertOutcome
    where
        F: Fn(&Line, &Line, &Line) -> bool,
    {
        if self.line_by_id(line.line_id()).is_some() {
            tracing::warn!(
                line_id = %line.line_id(),
                "duplicate line id on remote insert, discarding"
            );
            return InsertOutcome::DuplicateDiscarded;
        }

        let w = local_vc.projection_distance(remote_vc, line.peer_id());
        let c = self.new_index_for_incoming(line.line_id());

        match self.search_verified_parents(&line, c, w, &verify) {
            Some((left_idx, right_idx)) => {
                tracing::debug!(
                    line_id = %line.line_id(),
                    left_idx,
                    right_idx,
                    "remote insert verified via sliding window"
                );
                self.lines.insert(c, line);
                self.reindex();
                InsertOutcome::Applied { index: c }
            }
            None => {
                tracing::debug!(line_id = %line.line_id(), "remote insert failed verification, stashing");
                InsertOutcome::Stash
            }
        }
    }

    /// The core sliding-window search (§4.5). `c` is the tentative
    /// splice index for `line` (as if it were already inserted); `w` is
    /// the projection distance bounding how far the search may widen.
    fn search_verified_parents<F>(
        &self,
        line: &Line,
        c: usize,
        w: u64,
        verify: &F,
    ) -> Option<(usize, usize)>
    where
        F: Fn(&Line, &Line, &Line) -> bool,
    {
        let vlen = self.lines.len() + 1;
        let bound = w + STASH_WINDOW_SLACK;

        let get = |idx: usize| -> Option<&Line> {
            match idx.cmp(&c) {
                Ordering::Less => self.lines.get(idx),
                Ordering::Equal => Some(line),
                Ordering::Greater => self.lines.get(idx - 1),
            }
        };

        let check = |delta_l: i64, delta_r: i64| -> Option<(usize, usize)> {
            let total = (-delta_l) as u64 + delta_r as u64;
            if total > bound {
                return None;
            }
            let li = c as i64 + delta_l;
            let ri = c as i64 + delta_r;
            if li < 0 || ri < 0 || ri as usize >= vlen {
                return None;
            }
            let (li, ri) = (li as usize, ri as usize);
            let left = get(li)?;
            let right = get(ri)?;
            if verify(left, line, right) {
                Some((li, ri))
            } else {
                None
            }
        };

        // Explores every (Δl, Δr) with Δl <= -1, Δr >= 1, grouped by
        // total width so nearer candidates are tried before farther
        // ones. Within a width, widening the left side first wins over
        // widening the right (§4.5 tie-breaking rule) — this also
        // reaches interior pairs like (-2, +2) that a two-spine search
        // would miss.
        for total in 2..=bound {
            for a in (1..total).rev() {
                let delta_l = -(a as i64);
                let delta_r = (total - a) as i64;
                if let Some(pair) = check(delta_l, delta_r) {
                    return Some(pair);
                }
            }
        }
        None
    }

    /// Marks the line at `idx` as tombstoned. It remains at its position
    /// as a reference anchor for future inserts (§4.4).
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::SentinelDelete`] if `idx` refers to the
    /// infimum or supremum.
    pub fn delete_by_index(&mut self, idx: usize) -> Result<(), DocumentError> {
        if idx == 0 || idx + 1 >= self.lines.len() {
            return Err(DocumentError::SentinelDelete);
        }
        self.lines[idx].tombstone();
        Ok(())
    }

    /// Tombstones the line with `line_id`, by looking up its index.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::SentinelDelete`] if the id belongs to a
    /// sentinel.
    pub fn delete_by_id(&mut self, line_id: &LineId) -> Result<(), DocumentError> {
        let idx = self.index_of(line_id);
        self.delete_by_index(idx)
    }

    /// Returns the content of all alive lines, in document order,
    /// excluding both sentinels and any tombstones.
    #[must_use]
    pub fn alive_content(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.status().is_alive())
            .filter(|l| l.line_id() != &LineId::infimum() && l.line_id() != &LineId::supremum())
            .map(|l| l.content())
            .collect()
    }

    fn reindex(&mut self) {
        self.index.clear();
        self.index.reserve(self.lines.len());
        for (i, line) in self.lines.iter().enumerate() {
            self.index.insert(line.line_id().clone(), i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncordian_signature::KeyPair;

    fn verify_always(left: &Line, line: &Line, right: &Line) -> bool {
        // test-only verifier that trusts any neighbour pair whose ids
        // bracket the line, used where signature validity is orthogonal
        // to what's under test
        left.line_id() < line.line_id() && line.line_id() < right.line_id()
    }

    #[test]
    fn new_document_has_two_sentinels() {
        let doc = Document::new(PeerId::new(0));
        assert_eq!(doc.length(), 2);
        assert!(doc.line_at_index(0).unwrap().line_id() == &LineId::infimum());
        assert!(doc.line_at_index(1).unwrap().line_id() == &LineId::supremum());
    }

    #[test]
    fn insert_by_position_grows_document_in_order() {
        let mut doc = Document::new(PeerId::new(0));
        let kp = KeyPair::generate();
        doc.insert_by_position(0, "A".into(), PeerId::new(0), &kp.signing_key)
            .unwrap();
        doc.insert_by_position(1, "B".into(), PeerId::new(0), &kp.signing_key)
            .unwrap();
        doc.insert_by_position(2, "C".into(), PeerId::new(0), &kp.signing_key)
            .unwrap();
        assert_eq!(doc.alive_content(), vec!["A", "B", "C"]);
        for w in doc_ids(&doc).windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    fn doc_ids(doc: &Document) -> Vec<LineId> {
        (0..doc.length())
            .map(|i| doc.line_at_index(i).unwrap().line_id().clone())
            .collect()
    }

    #[test]
    fn insert_clamps_out_of_range_index() {
        let mut doc = Document::new(PeerId::new(0));
        let kp = KeyPair::generate();
        // idx way past the end clamps to len-2 (== 0 initially)
        doc.insert_by_position(50, "Z".into(), PeerId::new(0), &kp.signing_key)
            .unwrap();
        assert_eq!(doc.alive_content(), vec!["Z"]);
    }

    #[test]
    fn delete_by_index_tombstones_but_keeps_position() {
        let mut doc = Document::new(PeerId::new(0));
        let kp = KeyPair::generate();
        doc.insert_by_position(0, "A".into(), PeerId::new(0), &kp.signing_key)
            .unwrap();
        let len_before = doc.length();
        doc.delete_by_index(1).unwrap();
        assert_eq!(doc.length(), len_before);
        assert!(doc.alive_content().is_empty());
        assert!(doc.line_at_index(1).unwrap().status().is_tombstone());
    }

    #[test]
    fn delete_of_sentinel_is_rejected() {
        let mut doc = Document::new(PeerId::new(0));
        assert_eq!(doc.delete_by_index(0), Err(DocumentError::SentinelDelete));
        let last = doc.length() - 1;
        assert_eq!(doc.delete_by_index(last), Err(DocumentError::SentinelDelete));
    }

    #[test]
    fn parents_of_index_clamps_to_living_bounds() {
        let mut doc = Document::new(PeerId::new(0));
        let kp = KeyPair::generate();
        doc.insert_by_position(0, "X".into(), PeerId::new(0), &kp.signing_key)
            .unwrap();
        let (left, right) = doc.parents_of_index(0);
        assert_eq!(left.line_id(), &LineId::infimum());
        assert_eq!(right.content(), "X");

        let (left, right) = doc.parents_of_index(99);
        assert_eq!(right.line_id(), &LineId::supremum());
        assert_eq!(left.content(), "X");
    }

    #[test]
    fn remote_insert_verifies_against_immediate_neighbours() {
        let mut doc = Document::new(PeerId::new(0));
        let kp = KeyPair::generate();
        let (left, right) = doc.parents_of_index(0);
        let left_id = left.line_id().clone();
        let right_id = right.line_id().clone();
        let mid = LineId::allocate_between(&left_id, &right_id).unwrap();
        let line = Line::new_signed(mid, "R".into(), PeerId::new(1), &kp.signing_key, &left_id, &right_id);

        let local_vc = VectorClock::new(2);
        let mut remote_vc = VectorClock::new(2);
        remote_vc.tick(PeerId::new(1));

        let outcome = doc.try_insert_remote(line, &local_vc, &remote_vc, verify_always);
        assert_eq!(outcome, InsertOutcome::Applied { index: 1 });
    }

    #[test]
    fn duplicate_remote_insert_is_discarded() {
        let mut doc = Document::new(PeerId::new(0));
        let kp = KeyPair::generate();
        let line = doc
            .insert_by_position(0, "A".into(), PeerId::new(0), &kp.signing_key)
            .unwrap();

        let local_vc = VectorClock::new(1);
        let remote_vc = VectorClock::new(1);
        let outcome = doc.try_insert_remote(line, &local_vc, &remote_vc, verify_always);
        assert_eq!(outcome, InsertOutcome::DuplicateDiscarded);
    }

    #[test]
    fn remote_insert_outside_window_is_stashed() {
        let mut doc = Document::new(PeerId::new(0));
        let kp = KeyPair::generate();
        // content "real" neighbours would be two lines neither of which
        // exist locally yet; use ids far from any valid window.
        let forged_left = LineId::infimum();
        let forged_right = LineId::allocate_between(&LineId::infimum(), &LineId::supremum()).unwrap();
        let mid = LineId::allocate_between(&forged_left, &forged_right).unwrap();
        let line = Line::new_signed(
            mid,
            "B".into(),
            PeerId::new(1),
            &kp.signing_key,
            &forged_left,
            &forged_right,
        );

        let local_vc = VectorClock::new(2);
        let mut remote_vc = VectorClock::new(2);
        remote_vc.tick(PeerId::new(1));
        remote_vc.tick(PeerId::new(1));
        remote_vc.tick(PeerId::new(1));

        // verifier that never succeeds, simulating a signature that
        // doesn't match any neighbour currently present locally
        let outcome = doc.try_insert_remote(line, &local_vc, &remote_vc, |_, _, _| false);
        assert_eq!(outcome, InsertOutcome::Stash);
    }
}
