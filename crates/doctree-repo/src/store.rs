//! Document storage collaborator
//!
//! The repository layer never owns document content; it reaches records
//! through [`DocumentStore`]. [`MemoryStore`] is the in-process backend used
//! by the CLI and tests.

use crate::document::{DocumentRecord, NewDocument};
use crate::error::{RepoError, RepoResult};
use crate::repository::RepositoryId;
use crate::slug::{random_slug, validate_slug};
use chrono::Utc;
use doctree_toc::DocId;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Storage operations on document records
#[cfg_attr(test, mockall::automock)]
pub trait DocumentStore {
    /// Fetch one document of a repository
    ///
    /// # Errors
    /// [`RepoError::DocumentNotFound`] if the repository has no such document.
    fn find(&self, repository: RepositoryId, id: DocId) -> RepoResult<DocumentRecord>;

    /// Create a document, generating a slug if none is given
    ///
    /// # Errors
    /// [`RepoError::InvalidSlug`] or [`RepoError::DuplicateSlug`].
    fn create(&self, repository: RepositoryId, attrs: NewDocument) -> RepoResult<DocumentRecord>;

    /// All documents of a repository in creation order
    ///
    /// # Errors
    /// Backend failures only.
    fn list(&self, repository: RepositoryId) -> RepoResult<Vec<DocumentRecord>>;

    /// Replace a stored document's title, slug and body
    ///
    /// # Errors
    /// [`RepoError::DocumentNotFound`], [`RepoError::InvalidSlug`] or
    /// [`RepoError::DuplicateSlug`].
    fn update(&self, record: DocumentRecord) -> RepoResult<DocumentRecord>;

    /// Delete a document, returning the removed record
    ///
    /// # Errors
    /// [`RepoError::DocumentNotFound`] if the repository has no such document.
    fn destroy(&self, repository: RepositoryId, id: DocId) -> RepoResult<DocumentRecord>;
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    documents: BTreeMap<DocId, DocumentRecord>,
}

impl Inner {
    fn slug_taken(&self, repository: RepositoryId, slug: &str, except: Option<DocId>) -> bool {
        self.documents.values().any(|doc| {
            doc.repository_id == repository && doc.slug == slug && Some(doc.id) != except
        })
    }

    fn get(&self, repository: RepositoryId, id: DocId) -> RepoResult<&DocumentRecord> {
        self.documents
            .get(&id)
            .filter(|doc| doc.repository_id == repository)
            .ok_or_else(|| RepoError::document_not_found(repository, id))
    }
}

/// In-memory document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all repositories
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, repository: RepositoryId, id: DocId) -> RepoResult<DocumentRecord> {
        self.inner.read().get(repository, id).cloned()
    }

    fn create(&self, repository: RepositoryId, attrs: NewDocument) -> RepoResult<DocumentRecord> {
        let mut inner = self.inner.write();

        let slug = match attrs.slug.filter(|s| !s.is_empty()) {
            Some(slug) => {
                validate_slug(&slug)?;
                if inner.slug_taken(repository, &slug, None) {
                    return Err(RepoError::DuplicateSlug { repository, slug });
                }
                slug
            }
            None => loop {
                let slug = random_slug();
                if !inner.slug_taken(repository, &slug, None) {
                    break slug;
                }
            },
        };

        inner.next_id += 1;
        let now = Utc::now();
        let record = DocumentRecord {
            id: DocId(inner.next_id),
            repository_id: repository,
            title: attrs.title,
            slug,
            body: attrs.body,
            body_sml: attrs.body_sml,
            format: attrs.format,
            created_at: now,
            updated_at: now,
        };
        inner.documents.insert(record.id, record.clone());

        tracing::debug!(%repository, id = %record.id, slug = %record.slug, "created document");
        Ok(record)
    }

    fn list(&self, repository: RepositoryId) -> RepoResult<Vec<DocumentRecord>> {
        Ok(self
            .inner
            .read()
            .documents
            .values()
            .filter(|doc| doc.repository_id == repository)
            .cloned()
            .collect())
    }

    fn update(&self, mut record: DocumentRecord) -> RepoResult<DocumentRecord> {
        let mut inner = self.inner.write();
        let existing = inner.get(record.repository_id, record.id)?;
        let created_at = existing.created_at;

        validate_slug(&record.slug)?;
        if inner.slug_taken(record.repository_id, &record.slug, Some(record.id)) {
            return Err(RepoError::DuplicateSlug {
                repository: record.repository_id,
                slug: record.slug,
            });
        }

        record.created_at = created_at;
        record.updated_at = Utc::now();
        inner.documents.insert(record.id, record.clone());
        Ok(record)
    }

    fn destroy(&self, repository: RepositoryId, id: DocId) -> RepoResult<DocumentRecord> {
        let mut inner = self.inner.write();
        inner.get(repository, id)?;
        inner
            .documents
            .remove(&id)
            .ok_or_else(|| RepoError::document_not_found(repository, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO: RepositoryId = RepositoryId(1);
    const OTHER: RepositoryId = RepositoryId(2);

    #[test]
    fn create_and_find() {
        let store = MemoryStore::new();
        let doc = store.create(REPO, NewDocument::new("Intro").with_slug("intro")).unwrap();
        assert_eq!(doc.id, DocId(1));
        assert_eq!(store.find(REPO, doc.id).unwrap(), doc);
        assert!(matches!(
            store.find(OTHER, doc.id),
            Err(RepoError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn create_generates_slug() {
        let store = MemoryStore::new();
        let doc = store.create(REPO, NewDocument::new("Untitled")).unwrap();
        assert_eq!(doc.slug.len(), 10);

        let blank = store.create(REPO, NewDocument::new("Blank").with_slug("")).unwrap();
        assert_ne!(blank.slug, doc.slug);
    }

    #[test]
    fn create_rejects_bad_or_duplicate_slug() {
        let store = MemoryStore::new();
        store.create(REPO, NewDocument::new("A").with_slug("intro")).unwrap();
        assert!(matches!(
            store.create(REPO, NewDocument::new("B").with_slug("intro")),
            Err(RepoError::DuplicateSlug { .. })
        ));
        assert!(matches!(
            store.create(REPO, NewDocument::new("C").with_slug("has space")),
            Err(RepoError::InvalidSlug(_))
        ));
        // Slugs are scoped per repository.
        assert!(store.create(OTHER, NewDocument::new("D").with_slug("intro")).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn list_is_scoped_and_ordered() {
        let store = MemoryStore::new();
        store.create(REPO, NewDocument::new("A").with_slug("aa")).unwrap();
        store.create(OTHER, NewDocument::new("X").with_slug("xx")).unwrap();
        store.create(REPO, NewDocument::new("B").with_slug("bb")).unwrap();

        let titles: Vec<_> = store.list(REPO).unwrap().into_iter().map(|d| d.title).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn update_renames() {
        let store = MemoryStore::new();
        let mut doc = store.create(REPO, NewDocument::new("A").with_slug("aa")).unwrap();
        store.create(REPO, NewDocument::new("B").with_slug("bb")).unwrap();

        doc.title = "Renamed".into();
        doc.slug = "renamed".into();
        let updated = store.update(doc.clone()).unwrap();
        assert_eq!(store.find(REPO, doc.id).unwrap().title, "Renamed");
        assert!(updated.updated_at >= updated.created_at);

        doc.slug = "bb".into();
        assert!(matches!(store.update(doc), Err(RepoError::DuplicateSlug { .. })));
    }

    #[test]
    fn destroy_removes() {
        let store = MemoryStore::new();
        let doc = store.create(REPO, NewDocument::new("A").with_slug("aa")).unwrap();
        assert!(store.destroy(OTHER, doc.id).is_err());
        assert_eq!(store.destroy(REPO, doc.id).unwrap().id, doc.id);
        assert!(store.is_empty());
        assert!(store.destroy(REPO, doc.id).is_err());
    }
}
