use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Identifier of a replica (peer) in the network.
///
/// A dense `u32` index rather than an opaque UUID: the vector clock
/// (`syncordian-crdt::VectorClock`) is a fixed-size array sized by
/// `network_size` at bootstrap, and a dense integer index is what that
/// array is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(u32);

impl PeerId {
    /// Creates a peer id from a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.0
    }

    /// Returns the index as a `usize`, for array/vector indexing.
    #[must_use]
    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

impl FromStr for PeerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("peer-").unwrap_or(s);
        digits
            .parse()
            .map(Self)
            .map_err(|_| Error::InvalidPeerId(s.to_string()))
    }
}

impl From<u32> for PeerId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}
