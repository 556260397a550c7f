//! TOC entries and references to them
//!
//! Provides [`TocItem`] (one entry of the tree), [`DocId`] (back-reference to
//! a document record) and [`NodeRef`] (how callers address an entry).

use crate::error::TocError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Primary id of a document record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(pub i64);

impl DocId {
    /// Raw id value
    #[inline]
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for DocId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DocId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One entry of a table of contents
///
/// Field order is the serialized key order: `title`, `url`, `id`, `depth`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TocItem {
    /// Display text
    pub title: String,
    /// Slug or link target; `None` for pure grouping entries
    pub url: Option<String>,
    /// Owning document; `None` for external links and groups
    pub id: Option<DocId>,
    /// Nesting level, root = 0
    pub depth: usize,
}

impl TocItem {
    /// Root-level entry with a link and no document
    #[must_use]
    pub fn link(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: Some(url.into()),
            id: None,
            depth: 0,
        }
    }

    /// Root-level grouping entry without a link
    #[must_use]
    pub fn group(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
            id: None,
            depth: 0,
        }
    }

    /// Root-level entry bound to a document
    #[must_use]
    pub fn document(doc: &DocumentSummary) -> Self {
        Self {
            title: doc.title.clone(),
            url: Some(doc.slug.clone()),
            id: Some(doc.id),
            depth: 0,
        }
    }

    /// Same entry at another depth
    #[inline]
    #[must_use]
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Same entry bound to a document id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: DocId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether the entry renders as a link
    #[inline]
    #[must_use]
    pub fn is_link(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// The fields of a document record the tree cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocId,
    pub title: String,
    pub slug: String,
}

impl DocumentSummary {
    #[must_use]
    pub fn new(id: impl Into<DocId>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: slug.into(),
        }
    }
}

impl From<&DocumentSummary> for TocItem {
    fn from(doc: &DocumentSummary) -> Self {
        Self::document(doc)
    }
}

/// Address of an entry within a tree
///
/// Textual form: `3` (pre-order index), `doc:42` (document id) or
/// `url:/hello` (first entry with that url).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// Position in pre-order
    Index(usize),
    /// First entry bound to this document
    Document(DocId),
    /// First entry with this url
    Url(String),
}

impl Display for NodeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Document(id) => write!(f, "doc:{id}"),
            Self::Url(url) => write!(f, "url:{url}"),
        }
    }
}

impl FromStr for NodeRef {
    type Err = TocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix("doc:") {
            return id
                .parse::<i64>()
                .map(|id| Self::Document(DocId(id)))
                .map_err(|_| TocError::InvalidNodeRef(s.to_string()));
        }
        if let Some(url) = s.strip_prefix("url:") {
            if url.is_empty() {
                return Err(TocError::InvalidNodeRef(s.to_string()));
            }
            return Ok(Self::Url(url.to_string()));
        }
        s.parse::<usize>()
            .map(Self::Index)
            .map_err(|_| TocError::InvalidNodeRef(s.to_string()))
    }
}

impl From<DocId> for NodeRef {
    fn from(id: DocId) -> Self {
        Self::Document(id)
    }
}
