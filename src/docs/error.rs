//! Document tree error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::render::RenderError;

/// Construction, lookup and rendering failures of a document tree.
///
/// Construction errors are raised before any mutation, so a rejected
/// `add_document` leaves the tree as it was.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("document `{document}` has more than one child named `{name}`")]
    DuplicateNodeName { document: String, name: String },

    #[error("document `{document}` has more than one child written to `{name}`")]
    DuplicatePhysicalName { document: String, name: String },

    #[error("document `{document}` needs exactly one index child, found {found}")]
    NotAnIndex { document: String, found: usize },

    #[error("node `{0}` is already attached to a document")]
    AlreadyParented(String),

    #[error("path `{0}` not found")]
    PathNotFound(String),

    #[error("invalid node name `{0}`")]
    InvalidName(String),

    #[error("unknown node id {0}")]
    UnknownNode(usize),

    #[error("failed to render `{0}`")]
    Render(PathBuf, #[source] RenderError),
}
