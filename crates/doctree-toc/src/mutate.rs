//! Tree edits: move, insert, remove and document sync
//!
//! All edits resolve and validate their references before touching the
//! entry list, so an error always leaves the tree unchanged.

use crate::config::RemovePolicy;
use crate::error::{TocError, TocResult};
use crate::item::{DocId, DocumentSummary, NodeRef, TocItem};
use crate::toc::Toc;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Where a moved entry lands relative to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Sibling immediately before the target
    #[serde(alias = "left")]
    Before,
    /// Sibling immediately after the target's subtree
    #[serde(alias = "right")]
    After,
    /// Last child of the target
    Child,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Child => "child",
        })
    }
}

impl FromStr for Position {
    type Err = TocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" | "left" => Ok(Self::Before),
            "after" | "right" => Ok(Self::After),
            "child" => Ok(Self::Child),
            _ => Err(TocError::InvalidPosition(s.to_string())),
        }
    }
}

impl Toc {
    fn resolve(&self, node: &NodeRef) -> TocResult<usize> {
        self.position(node)
            .ok_or_else(|| TocError::NotFound(node.clone()))
    }

    /// Move an entry and its subtree relative to a target entry
    ///
    /// Returns the entry's new pre-order index. Moving an entry to where it
    /// already is leaves the tree untouched.
    ///
    /// # Errors
    /// - [`TocError::NotFound`] if either reference does not resolve
    /// - [`TocError::InvalidMove`] if the target is the entry itself (for
    ///   [`Position::Child`]) or one of its descendants
    pub fn move_to(&mut self, node: &NodeRef, target: &NodeRef, position: Position) -> TocResult<usize> {
        let from = self.resolve(node)?;
        let to = self.resolve(target)?;
        let span = self.span_of(from);

        if to == from && position != Position::Child {
            return Ok(from);
        }
        if span.contains(&to) {
            return Err(TocError::InvalidMove {
                node: node.clone(),
                target: target.clone(),
            });
        }

        let target_depth = self.items[to].depth;
        let new_depth = match position {
            Position::Child => target_depth + 1,
            Position::Before | Position::After => target_depth,
        };
        let insert_at = match position {
            Position::Before => to,
            Position::After | Position::Child => self.span_of(to).end,
        };
        // Target is outside the span, so the insertion point is never inside it.
        let insert_at = if insert_at >= span.end {
            insert_at - span.len()
        } else {
            insert_at
        };

        let mut moved: Vec<TocItem> = self.items.drain(span).collect();
        let old_depth = moved[0].depth;
        for item in &mut moved {
            item.depth = item.depth - old_depth + new_depth;
        }

        tracing::debug!(
            %node,
            %target,
            %position,
            from,
            to = insert_at,
            old_depth,
            new_depth,
            entries = moved.len(),
            "moving TOC entry"
        );

        self.items.splice(insert_at..insert_at, moved);
        Ok(insert_at)
    }

    /// Insert an entry at the end, or relative to an existing entry
    ///
    /// The entry's own depth is ignored; it is placed at the root when
    /// appended, otherwise at the depth [`Toc::move_to`] gives it. Returns
    /// the entry's pre-order index.
    ///
    /// # Errors
    /// Returns [`TocError::NotFound`] if the anchor does not resolve.
    pub fn insert(&mut self, item: TocItem, anchor: Option<(&NodeRef, Position)>) -> TocResult<usize> {
        if let Some((target, _)) = anchor {
            self.resolve(target)?;
        }

        self.items.push(item.at_depth(0));
        let index = self.items.len() - 1;
        tracing::debug!(index, "appended TOC entry");

        match anchor {
            Some((target, position)) => self.move_to(&NodeRef::Index(index), target, position),
            None => Ok(index),
        }
    }

    /// Insert an entry bound to a document
    ///
    /// # Errors
    /// See [`Toc::insert`].
    pub fn insert_document(
        &mut self,
        doc: &DocumentSummary,
        anchor: Option<(&NodeRef, Position)>,
    ) -> TocResult<usize> {
        self.insert(TocItem::document(doc), anchor)
    }

    /// Point the entry at a pre-order index to a document, keeping its place
    ///
    /// Returns `false` if there is no such entry.
    pub fn bind_document(&mut self, index: usize, doc: &DocumentSummary) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        *item = TocItem::document(doc).at_depth(item.depth);
        true
    }

    /// Remove the entry at a pre-order index
    ///
    /// Returns the removed entries, the entry itself first.
    ///
    /// # Errors
    /// Returns [`TocError::NotFound`] if there is no entry at `index`.
    pub fn remove_at(&mut self, index: usize, policy: RemovePolicy) -> TocResult<Vec<TocItem>> {
        if index >= self.items.len() {
            return Err(TocError::NotFound(NodeRef::Index(index)));
        }
        Ok(self.remove_entry(index, policy))
    }

    fn remove_entry(&mut self, index: usize, policy: RemovePolicy) -> Vec<TocItem> {
        let span = self.span_of(index);
        match policy {
            RemovePolicy::Cascade => self.items.drain(span).collect(),
            RemovePolicy::Promote => {
                let removed = self.items.remove(index);
                for child in &mut self.items[index..span.end - 1] {
                    child.depth -= 1;
                }
                vec![removed]
            }
        }
    }

    /// Remove every entry bound to a document
    ///
    /// Returns all removed entries.
    ///
    /// # Errors
    /// Returns [`TocError::NotFound`] if no entry references the document.
    pub fn remove_document(&mut self, id: DocId, policy: RemovePolicy) -> TocResult<Vec<TocItem>> {
        if !self.contains_document(id) {
            return Err(TocError::NotFound(NodeRef::Document(id)));
        }

        let mut removed = Vec::new();
        while let Some(index) = self.position_of_document(id) {
            removed.extend(self.remove_entry(index, policy));
        }
        tracing::debug!(%id, ?policy, removed = removed.len(), "removed TOC entries for document");
        Ok(removed)
    }

    /// Refresh title and url of every entry bound to a document
    ///
    /// Returns the number of entries changed.
    pub fn update_document(&mut self, doc: &DocumentSummary) -> usize {
        let mut changed = 0;
        for item in self.items.iter_mut().filter(|item| item.id == Some(doc.id)) {
            let url = Some(doc.slug.clone());
            if item.title != doc.title || item.url != url {
                item.title.clone_from(&doc.title);
                item.url = url;
                changed += 1;
            }
        }
        changed
    }

    /// Remove entries whose document no longer exists
    ///
    /// Returns the ids of the dangling documents that were removed.
    pub fn prune_dangling<F>(&mut self, exists: F, policy: RemovePolicy) -> Vec<DocId>
    where
        F: Fn(DocId) -> bool,
    {
        let mut pruned = Vec::new();
        let mut index = 0;
        while index < self.items.len() {
            match self.items[index].id {
                Some(id) if !exists(id) => {
                    tracing::warn!(%id, title = %self.items[index].title, "pruning dangling TOC entry");
                    if !pruned.contains(&id) {
                        pruned.push(id);
                    }
                    self.remove_entry(index, policy);
                }
                _ => index += 1,
            }
        }
        pruned
    }
}
