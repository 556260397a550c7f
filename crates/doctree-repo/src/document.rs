//! Document records as seen by the repository layer

use crate::error::RepoError;
use crate::repository::RepositoryId;
use chrono::{DateTime, Utc};
use doctree_toc::{DocId, DocumentSummary};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Body content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    /// Structured markup produced by the rich editor
    #[default]
    Sml,
    Markdown,
}

impl Display for DocFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sml => "sml",
            Self::Markdown => "markdown",
        })
    }
}

impl FromStr for DocFormat {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sml" => Ok(Self::Sml),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(RepoError::UnknownFormat(s.to_string())),
        }
    }
}

/// A stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocId,
    pub repository_id: RepositoryId,
    pub title: String,
    pub slug: String,
    /// Markdown body
    pub body: String,
    /// Rich-editor body
    pub body_sml: String,
    pub format: DocFormat,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Fields the TOC keeps a copy of
    #[must_use]
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary::new(self.id, self.title.clone(), self.slug.clone())
    }
}

/// Attributes for a new document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    /// Generated by the store when `None`
    pub slug: Option<String>,
    pub body: String,
    pub body_sml: String,
    pub format: DocFormat,
}

impl NewDocument {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// With slug
    #[inline]
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// With body content and its format
    #[inline]
    #[must_use]
    pub fn with_body(mut self, format: DocFormat, body: impl Into<String>, body_sml: impl Into<String>) -> Self {
        self.format = format;
        self.body = body.into();
        self.body_sml = body_sml.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parse_and_display() {
        assert_eq!("sml".parse::<DocFormat>().unwrap(), DocFormat::Sml);
        assert_eq!("Markdown".parse::<DocFormat>().unwrap(), DocFormat::Markdown);
        assert_eq!("md".parse::<DocFormat>().unwrap(), DocFormat::Markdown);
        assert!(matches!("html".parse::<DocFormat>(), Err(RepoError::UnknownFormat(_))));
        assert_eq!(DocFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn new_document_builder() {
        let attrs = NewDocument::new("Intro")
            .with_slug("intro")
            .with_body(DocFormat::Markdown, "# Intro", "");
        assert_eq!(attrs.title, "Intro");
        assert_eq!(attrs.slug.as_deref(), Some("intro"));
        assert_eq!(attrs.format, DocFormat::Markdown);
        assert_eq!(attrs.body, "# Intro");
    }
}
