//! Shared, plugin-agnostic types used across the Syncordian workspace.
//!
//! This crate defines only the identifiers the rest of the workspace needs
//! to agree on:
//! - [`PeerId`] — a dense, bootstrap-known replica index
//! - [`LineStatus`] — whether a line is live or tombstoned
//!
//! Document-, CRDT- and signature-specific types belong in their own
//! crates, not here.

mod peer_id;
mod status;

pub use peer_id::PeerId;
pub use status::LineStatus;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur constructing or parsing shared types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `PeerId` string failed to parse as an integer.
    #[error("invalid peer id: {0}")]
    InvalidPeerId(String),
}
