//! Error types for TOC operations
//!
//! Every fallible operation either succeeds completely or returns one of
//! these errors with the tree left exactly as it was.

use crate::item::NodeRef;

/// Errors raised while decoding, encoding or editing a TOC
#[derive(Debug, thiserror::Error)]
pub enum TocError {
    /// Serialized text is not a well-formed TOC
    #[error("invalid TOC format: {message}")]
    Format { message: String },

    /// Referenced node or document is not present in the tree
    #[error("node not found: {0}")]
    NotFound(NodeRef),

    /// Move would place a node inside its own subtree
    #[error("cannot move {node} relative to {target}: target is inside the moved subtree")]
    InvalidMove { node: NodeRef, target: NodeRef },

    /// Unknown position name
    #[error("invalid position: '{0}' (expected before, after, child, left or right)")]
    InvalidPosition(String),

    /// Unparseable node reference
    #[error("invalid node reference: '{0}' (expected an index, doc:<id> or url:<url>)")]
    InvalidNodeRef(String),

    /// Tree nests deeper than the configured limit
    #[error("TOC depth {depth} exceeds the maximum of {max}")]
    TooDeep { depth: usize, max: usize },

    /// Serializer failure
    #[error("failed to encode TOC: {0}")]
    Encode(#[source] serde_yaml::Error),
}

impl TocError {
    /// Create format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

/// Result type alias for TOC operations
pub type TocResult<T> = Result<T, TocError>;
