//! Dense-identifier sequence CRDT at the heart of Syncordian.
//!
//! A document is a strictly ordered sequence of [`Line`]s keyed by dense
//! [`LineId`]s. Remote inserts are only applied once their binding
//! signature verifies against a neighbour pair within the window sized
//! by [`VectorClock::projection_distance`]; see [`Document::try_insert_remote`].

mod document;
mod line;
mod line_id;
mod vector_clock;

pub use document::{Document, DocumentError, InsertOutcome, STASH_WINDOW_SLACK};
pub use line::Line;
pub use line_id::{LineId, LineIdError};
pub use vector_clock::{CausalOrder, VectorClock};
