//! Error types for document loading
//!
//! [`DocumentError`] covers the ways a program-structure document can fail to
//! load. Once a document parses, nothing downstream fails: unreadable nodes
//! are downgraded rather than rejected.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// Reading the document from disk failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid JSON
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but none of the accepted envelopes
    #[error(
        "unrecognized document shape: expected a node array, or an object with `ast`, \
         `analysis.ast` or `blocks` (found {found})"
    )]
    UnrecognizedShape { found: &'static str },
}
