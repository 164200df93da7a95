use serde::{Deserialize, Serialize};

/// Lifecycle state of a line.
///
/// A tombstoned line is never removed from the document — it remains as
/// a position anchor for future inserts (§4.4) — it is simply excluded
/// from the "alive" projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStatus {
    /// The line is part of the live document content.
    Alive,
    /// The line has been deleted but remains as a position anchor.
    Tombstone,
}

impl LineStatus {
    /// Returns true if the line is alive.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// Returns true if the line is tombstoned.
    #[must_use]
    pub const fn is_tombstone(self) -> bool {
        matches!(self, Self::Tombstone)
    }
}
