//! Repository model
//!
//! A repository owns a list of documents (through a [`DocumentStore`]) and an
//! optional custom TOC. Until a custom TOC is saved, the repository shows the
//! default flat tree built from its documents.

use crate::error::{RepoError, RepoResult};
use crate::slug::validate_slug;
use crate::store::DocumentStore;
use doctree_toc::{build_from_documents, codec, RenderOptions, Toc, TocConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Primary id of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(pub i64);

impl Display for RepositoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Loosely typed per-repository preferences
///
/// Values are stored as submitted (`1`, `"0"`, `"true"`, ...) and
/// interpreted when read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences(BTreeMap<String, Value>);

impl Preferences {
    const HAS_TOC: &'static str = "has_toc";

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw `has_toc` value, `true` when never set
    #[must_use]
    pub fn has_toc_raw(&self) -> Value {
        self.get(Self::HAS_TOC).cloned().unwrap_or(Value::Bool(true))
    }

    /// Whether the TOC sidebar is shown
    #[must_use]
    pub fn has_toc(&self) -> bool {
        truthy(&self.has_toc_raw())
    }

    pub fn set_has_toc(&mut self, value: impl Into<Value>) {
        self.set(Self::HAS_TOC, value);
    }
}

/// `true`, `1`, `"1"` and `"true"` are truthy; everything else is not
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}

/// A documentation repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    /// Slug of the owning user or group
    pub owner_slug: String,
    slug: String,
    pub name: String,
    pub description: Option<String>,
    toc: Option<String>,
    pub preferences: Preferences,
}

impl Repository {
    /// Create repository without a custom TOC
    ///
    /// # Errors
    /// Returns [`RepoError::InvalidSlug`] if the slug is not valid.
    pub fn new(
        id: RepositoryId,
        owner_slug: impl Into<String>,
        slug: impl Into<String>,
        name: impl Into<String>,
    ) -> RepoResult<Self> {
        let slug = slug.into();
        validate_slug(&slug)?;
        Ok(Self {
            id,
            owner_slug: owner_slug.into(),
            slug,
            name: name.into(),
            description: None,
            toc: None,
            preferences: Preferences::default(),
        })
    }

    #[inline]
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Change slug
    ///
    /// # Errors
    /// Returns [`RepoError::InvalidSlug`]; the old slug is kept.
    pub fn set_slug(&mut self, slug: impl Into<String>) -> RepoResult<()> {
        let slug = slug.into();
        validate_slug(&slug)?;
        self.slug = slug;
        Ok(())
    }

    /// Site-relative path, `/{owner}/{slug}`
    #[must_use]
    pub fn to_path(&self) -> String {
        format!("/{}/{}", self.owner_slug, self.slug)
    }

    /// Absolute url under a host
    #[must_use]
    pub fn to_url(&self, host: &str) -> String {
        format!("{}{}", host.trim_end_matches('/'), self.to_path())
    }

    /// `"{name} ({slug})"`
    #[must_use]
    pub fn fullname(&self) -> String {
        format!("{} ({})", self.name, self.slug)
    }

    #[inline]
    #[must_use]
    pub fn has_toc(&self) -> bool {
        self.preferences.has_toc()
    }

    /// Custom TOC text exactly as stored
    #[inline]
    #[must_use]
    pub fn custom_toc(&self) -> Option<&str> {
        self.toc.as_deref()
    }

    /// Replace the custom TOC text; `None` or blank text resets to the
    /// default tree
    ///
    /// # Errors
    /// Returns [`RepoError::InvalidToc`] if the text does not decode; the
    /// stored TOC is kept.
    pub fn set_toc(&mut self, text: Option<String>) -> RepoResult<()> {
        let text = text.filter(|t| !t.trim().is_empty());
        if let Some(text) = &text {
            codec::decode(text).map_err(RepoError::InvalidToc)?;
        }
        self.toc = text;
        Ok(())
    }

    /// Persist an edited tree as the custom TOC
    ///
    /// # Errors
    /// Returns [`RepoError::Toc`] if the tree exceeds the configured depth or
    /// fails to encode; the stored TOC is kept.
    pub fn save_toc(&mut self, toc: &Toc, config: &TocConfig) -> RepoResult<()> {
        self.toc = Some(Self::prepare_toc(toc, config)?);
        Ok(())
    }

    /// Check and encode a tree without storing it
    ///
    /// Pair with [`Repository::commit_toc`] when another write has to succeed
    /// in between.
    ///
    /// # Errors
    /// Returns [`RepoError::Toc`] if the tree exceeds the configured depth or
    /// fails to encode.
    pub fn prepare_toc(toc: &Toc, config: &TocConfig) -> RepoResult<String> {
        config.check(toc)?;
        Ok(codec::encode(toc)?)
    }

    /// Store text returned by [`Repository::prepare_toc`]
    pub(crate) fn commit_toc(&mut self, text: String) {
        self.toc = Some(text);
    }

    /// Current tree: the custom TOC, or the default built from documents
    ///
    /// # Errors
    /// Store failures, or [`RepoError::InvalidToc`] for a corrupt stored TOC.
    pub fn load_toc<S>(&self, store: &S) -> RepoResult<Toc>
    where
        S: DocumentStore + ?Sized,
    {
        match &self.toc {
            Some(text) => codec::decode(text).map_err(RepoError::InvalidToc),
            None => self.default_toc(store),
        }
    }

    /// Flat tree of all documents in creation order
    ///
    /// # Errors
    /// Store failures.
    pub fn default_toc<S>(&self, store: &S) -> RepoResult<Toc>
    where
        S: DocumentStore + ?Sized,
    {
        let summaries: Vec<_> = store.list(self.id)?.iter().map(|d| d.summary()).collect();
        Ok(build_from_documents(&summaries))
    }

    /// TOC text as served to editors
    ///
    /// The stored text is returned verbatim; without one, the encoded default
    /// tree.
    ///
    /// # Errors
    /// Store or encoding failures.
    pub fn toc_text<S>(&self, store: &S) -> RepoResult<String>
    where
        S: DocumentStore + ?Sized,
    {
        match &self.toc {
            Some(text) => Ok(text.clone()),
            None => Ok(codec::encode(&self.default_toc(store)?)?),
        }
    }

    /// Rendered TOC; entries of deleted documents render without links
    ///
    /// # Errors
    /// Store failures, or [`RepoError::InvalidToc`] for a corrupt stored TOC.
    pub fn toc_html<S>(&self, store: &S, prefix: Option<&str>) -> RepoResult<String>
    where
        S: DocumentStore + ?Sized,
    {
        let toc = self.load_toc(store)?;
        let mut options =
            RenderOptions::new().with_known_documents(store.list(self.id)?.into_iter().map(|d| d.id));
        if let Some(prefix) = prefix {
            options = options.with_prefix(prefix);
        }
        Ok(toc.to_html(&options))
    }
}
