//! Editing configuration

use crate::error::{TocError, TocResult};
use crate::mutate::Position;
use crate::toc::Toc;
use serde::{Deserialize, Serialize};

/// What happens to the children of a removed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovePolicy {
    /// Children move up one level into the removed entry's place
    #[default]
    Promote,
    /// The whole subtree is removed
    Cascade,
}

/// TOC editing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// Policy for removing entries that have children
    pub remove_policy: RemovePolicy,
    /// Deepest nesting level an edit may produce
    pub max_depth: usize,
    /// Position used when a target is given without one
    pub default_position: Position,
}

impl TocConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With remove policy
    #[inline]
    #[must_use]
    pub fn with_remove_policy(mut self, policy: RemovePolicy) -> Self {
        self.remove_policy = policy;
        self
    }

    /// With maximum depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// With default position
    #[inline]
    #[must_use]
    pub fn with_default_position(mut self, position: Position) -> Self {
        self.default_position = position;
        self
    }

    /// Check a tree against the depth limit
    ///
    /// # Errors
    /// Returns [`TocError::TooDeep`] if any entry is nested too deeply.
    pub fn check(&self, toc: &Toc) -> TocResult<()> {
        match toc.max_depth() {
            Some(depth) if depth > self.max_depth => Err(TocError::TooDeep {
                depth,
                max: self.max_depth,
            }),
            _ => Ok(()),
        }
    }
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            remove_policy: RemovePolicy::Promote,
            max_depth: 10,
            default_position: Position::After,
        }
    }
}
