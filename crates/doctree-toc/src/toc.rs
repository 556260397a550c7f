//! The TOC tree
//!
//! A [`Toc`] stores its entries as a flat pre-order list. Each entry's
//! children are the entries that follow it with a greater depth, so a
//! subtree is always a contiguous index range (its *span*). The nested view
//! used for rendering is derived on demand by [`Toc::outline`].
//!
//! Invariant: the first entry has depth 0 and every entry is at most one
//! level deeper than the entry before it.

use crate::item::{DocId, NodeRef, TocItem};
use std::ops::Range;

/// Ordered, nested table of contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toc {
    pub(crate) items: Vec<TocItem>,
}

/// Nested view of one entry and its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode<'a> {
    /// Pre-order index of the entry
    pub index: usize,
    pub item: &'a TocItem,
    pub children: Vec<OutlineNode<'a>>,
}

impl Toc {
    /// Empty tree
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pre-order entries, clamping depths that skip levels
    ///
    /// Returns the tree and the number of entries whose depth was changed.
    #[must_use]
    pub fn from_items_normalized(mut items: Vec<TocItem>) -> (Self, usize) {
        let mut clamped = 0;
        let mut max_allowed = 0;
        for item in &mut items {
            if item.depth > max_allowed {
                tracing::warn!(
                    title = %item.title,
                    depth = item.depth,
                    clamped_to = max_allowed,
                    "TOC entry skips a nesting level"
                );
                item.depth = max_allowed;
                clamped += 1;
            }
            max_allowed = item.depth + 1;
        }
        (Self { items }, clamped)
    }

    /// Build from pre-order entries
    #[must_use]
    pub fn from_items(items: Vec<TocItem>) -> Self {
        Self::from_items_normalized(items).0
    }

    /// Entries in pre-order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[TocItem] {
        &self.items
    }

    /// Consume into pre-order entries
    #[inline]
    #[must_use]
    pub fn into_items(self) -> Vec<TocItem> {
        self.items
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entry at pre-order index
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TocItem> {
        self.items.get(index)
    }

    /// Iterator over entries in pre-order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &TocItem> {
        self.items.iter()
    }

    /// Deepest nesting level, `None` for an empty tree
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.items.iter().map(|item| item.depth).max()
    }

    /// Pre-order index of the entry a reference points at
    #[must_use]
    pub fn position(&self, node: &NodeRef) -> Option<usize> {
        match node {
            NodeRef::Index(i) => (*i < self.items.len()).then_some(*i),
            NodeRef::Document(id) => self.position_of_document(*id),
            NodeRef::Url(url) => self
                .items
                .iter()
                .position(|item| item.url.as_deref() == Some(url.as_str())),
        }
    }

    /// Pre-order index of the first entry bound to a document
    #[must_use]
    pub fn position_of_document(&self, id: DocId) -> Option<usize> {
        self.items.iter().position(|item| item.id == Some(id))
    }

    /// Whether any entry references the document
    #[inline]
    #[must_use]
    pub fn contains_document(&self, id: DocId) -> bool {
        self.position_of_document(id).is_some()
    }

    /// Document ids referenced by the tree, in pre-order
    #[must_use]
    pub fn document_ids(&self) -> Vec<DocId> {
        self.items.iter().filter_map(|item| item.id).collect()
    }

    /// Index range covering an entry and all of its descendants, `None` if
    /// there is no entry at `index`
    #[must_use]
    pub fn span(&self, index: usize) -> Option<Range<usize>> {
        (index < self.items.len()).then(|| self.span_of(index))
    }

    /// An entry and its descendants
    #[must_use]
    pub fn subtree(&self, index: usize) -> Option<&[TocItem]> {
        self.span(index).map(|span| &self.items[span])
    }

    /// Span of an index already known to be in bounds
    pub(crate) fn span_of(&self, index: usize) -> Range<usize> {
        let depth = self.items[index].depth;
        let end = self.items[index + 1..]
            .iter()
            .position(|item| item.depth <= depth)
            .map_or(self.items.len(), |offset| index + 1 + offset);
        index..end
    }

    /// Pre-order index of the parent entry
    #[must_use]
    pub fn parent(&self, index: usize) -> Option<usize> {
        let depth = self.items.get(index)?.depth;
        if depth == 0 {
            return None;
        }
        self.items[..index]
            .iter()
            .rposition(|item| item.depth + 1 == depth)
    }

    /// Pre-order indices of an entry's direct children
    #[must_use]
    pub fn children(&self, index: usize) -> Vec<usize> {
        let Some(item) = self.items.get(index) else {
            return Vec::new();
        };
        let child_depth = item.depth + 1;
        self.span_of(index)
            .skip(1)
            .filter(|&i| self.items[i].depth == child_depth)
            .collect()
    }

    /// Pre-order indices of the root-level entries
    #[must_use]
    pub fn roots(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.depth == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Nested view of the whole tree
    #[must_use]
    pub fn outline(&self) -> Vec<OutlineNode<'_>> {
        self.roots().into_iter().map(|i| self.outline_node(i)).collect()
    }

    fn outline_node(&self, index: usize) -> OutlineNode<'_> {
        OutlineNode {
            index,
            item: &self.items[index],
            children: self
                .children(index)
                .into_iter()
                .map(|i| self.outline_node(i))
                .collect(),
        }
    }
}

impl From<Vec<TocItem>> for Toc {
    fn from(items: Vec<TocItem>) -> Self {
        Self::from_items(items)
    }
}

impl<'a> IntoIterator for &'a Toc {
    type Item = &'a TocItem;
    type IntoIter = std::slice::Iter<'a, TocItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
