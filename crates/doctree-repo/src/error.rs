//! Error types for the repository layer

use crate::repository::RepositoryId;
use doctree_toc::{DocId, TocError};

/// Message shown when a submitted TOC cannot be decoded
pub const INVALID_TOC_MESSAGE: &str = "Invalid TOC format (required YAML format).";

/// Errors raised by repository and document operations
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Submitted TOC text was rejected; the stored TOC is unchanged
    #[error("Invalid TOC format (required YAML format).")]
    InvalidToc(#[source] TocError),

    /// Tree edit failed; the stored TOC is unchanged
    #[error("toc error: {0}")]
    Toc(#[from] TocError),

    /// Slug does not match the allowed pattern
    #[error("invalid slug '{0}': use at least 2 letters, digits, '-', '_' or '.'")]
    InvalidSlug(String),

    /// Document record not found
    #[error("document {id} not found in repository {repository}")]
    DocumentNotFound { repository: RepositoryId, id: DocId },

    /// Another document in the repository already uses the slug
    #[error("slug '{slug}' is already taken in repository {repository}")]
    DuplicateSlug { repository: RepositoryId, slug: String },

    /// Unknown document body format
    #[error("unknown document format '{0}' (expected sml or markdown)")]
    UnknownFormat(String),

    /// Backend failure
    #[error("document store error: {0}")]
    Store(String),
}

impl RepoError {
    /// Create document-not-found error
    pub fn document_not_found(repository: RepositoryId, id: DocId) -> Self {
        Self::DocumentNotFound { repository, id }
    }
}

/// Result type alias for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
