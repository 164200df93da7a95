//! The edit-trace format consumed by the driver (§4.7, §6).
//!
//! The driver treats this as opaque, external input: a sequence of
//! commits by author, each carrying a sequence of insert/delete edits.
//! Parsing lives here rather than in `syncordian-peer` because the
//! trace format is test-scaffolding, not part of the replicated core.

use serde::{Deserialize, Serialize};

/// A single edit within a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    /// Insert `content` at visible position `index`.
    Insert {
        /// The text to insert.
        content: String,
        /// The visible document position.
        index: usize,
    },
    /// Delete the line at visible position `index`.
    Delete {
        /// The visible document position.
        index: usize,
    },
}

/// One commit: an author and the edits it contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Opaque commit identifier, carried through unchanged.
    pub commit_hash: String,
    /// The committing author, used to assign this commit's edits to a peer.
    pub author_id: String,
    /// The edits in this commit, applied in order.
    pub edits: Vec<Edit>,
}

/// A full edit trace: an ordered sequence of commits.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Trace {
    /// The commits, in replay order.
    pub commits: Vec<Commit>,
}

impl Trace {
    /// Parses a trace from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error on malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The distinct authors appearing in the trace, in first-seen order.
    #[must_use]
    pub fn authors(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for commit in &self.commits {
            if !seen.contains(&commit.author_id) {
                seen.push(commit.author_id.clone());
            }
        }
        seen
    }
}
