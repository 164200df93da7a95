//! Dense fractional line identifiers.
//!
//! `LineId` is an arbitrary-precision rational in the open interval
//! `(0, 1)`. The infimum sentinel sits at `0`, the supremum sentinel at
//! `1`; every other line gets an id strictly between its two neighbours.
//! Because the underlying type is an arbitrary-precision rational rather
//! than a fixed-width float, no finite sequence of concurrent inserts at
//! the same gap can exhaust the space (§4.1).

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A dense, totally-ordered identifier for a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct LineId(BigRational);

/// Errors allocating a new identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineIdError {
    /// The left neighbour's id is not strictly less than the right
    /// neighbour's id. This is a hard protocol-bug condition (§4.1): it
    /// must propagate as a fatal failure rather than silently produce a
    /// nonsensical id.
    #[error("cannot allocate an id between {left} and {right}: left is not < right")]
    CapacityExhausted {
        /// The left neighbour's id, rendered for diagnostics.
        left: String,
        /// The right neighbour's id, rendered for diagnostics.
        right: String,
    },

    /// The id string could not be parsed as a rational.
    #[error("malformed line id: {0}")]
    Malformed(String),
}

impl LineId {
    /// The infimum sentinel id — always the smallest possible id.
    #[must_use]
    pub fn infimum() -> Self {
        Self(BigRational::zero())
    }

    /// The supremum sentinel id — always the largest possible id.
    #[must_use]
    pub fn supremum() -> Self {
        Self(BigRational::one())
    }

    /// Allocates a new id strictly between `left` and `right`.
    ///
    /// # Errors
    ///
    /// Returns [`LineIdError::CapacityExhausted`] if `left >= right`,
    /// which can only happen if the caller passed neighbours out of
    /// order — a protocol bug, not a runtime resource limit.
    pub fn allocate_between(left: &Self, right: &Self) -> Result<Self, LineIdError> {
        if left.0 >= right.0 {
            return Err(LineIdError::CapacityExhausted {
                left: left.to_string(),
                right: right.to_string(),
            });
        }
        let two = BigRational::from_integer(BigInt::from(2));
        Ok(Self((&left.0 + &right.0) / two))
    }

    /// Compares two line ids, returning `-1`, `0`, or `1` as in `Ord`.
    #[must_use]
    pub fn compare_lines(a: &Self, b: &Self) -> i32 {
        match a.0.cmp(&b.0) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }
}

impl PartialOrd for LineId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LineId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0.numer(), self.0.denom())
    }
}

impl From<LineId> for String {
    fn from(id: LineId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for LineId {
    type Error = LineIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let (numer, denom) = s
            .split_once('/')
            .ok_or_else(|| LineIdError::Malformed(s.clone()))?;
        let numer: BigInt = numer.parse().map_err(|_| LineIdError::Malformed(s.clone()))?;
        let denom: BigInt = denom.parse().map_err(|_| LineIdError::Malformed(s.clone()))?;
        if denom.is_zero() {
            return Err(LineIdError::Malformed(s));
        }
        Ok(Self(BigRational::new(numer, denom)))
    }
}
