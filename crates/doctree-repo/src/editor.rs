//! TOC mutation layer
//!
//! [`TocEditor`] is what request handlers call to change a repository's
//! tree. Each operation decodes a working copy, applies the edit, checks it
//! against [`TocConfig`] and only then writes the encoded text back, so a
//! failed call leaves both the repository and the store as they were.

use crate::document::{DocFormat, DocumentRecord, NewDocument};
use crate::error::RepoResult;
use crate::repository::Repository;
use crate::store::DocumentStore;
use doctree_toc::{DocId, NodeRef, Position, TocConfig, TocItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Input for creating a TOC entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateToc {
    pub title: String,
    /// Link target for external entries, slug for document entries
    pub url: Option<String>,
    /// Only add a TOC entry; otherwise a blank document is created too
    pub external: bool,
    /// Entry to position the new one against; appended at the end if `None`
    pub target: Option<NodeRef>,
    /// Defaults to [`TocConfig::default_position`]
    pub position: Option<Position>,
    pub body: String,
    pub body_sml: String,
    pub format: DocFormat,
}

impl CreateToc {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// With url or slug
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// As an external link entry without a document
    #[inline]
    #[must_use]
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Positioned against another entry
    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: NodeRef, position: Option<Position>) -> Self {
        self.target = Some(target);
        self.position = position;
        self
    }

    /// With initial document body
    #[inline]
    #[must_use]
    pub fn with_body(mut self, format: DocFormat, body: impl Into<String>, body_sml: impl Into<String>) -> Self {
        self.format = format;
        self.body = body.into();
        self.body_sml = body_sml.into();
        self
    }
}

/// Outcome of [`TocEditor::sync`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Documents whose entries were removed because the record is gone
    pub pruned: Vec<DocId>,
    /// Documents appended because no entry referenced them
    pub appended: Vec<DocId>,
}

impl SyncReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.pruned.is_empty() && self.appended.is_empty()
    }
}

/// Applies TOC edits to one repository
#[derive(Debug)]
pub struct TocEditor<'a, S: ?Sized> {
    repository: &'a mut Repository,
    store: &'a S,
    config: &'a TocConfig,
}

impl<'a, S> TocEditor<'a, S>
where
    S: DocumentStore + ?Sized,
{
    /// Create editor for a repository
    #[inline]
    #[must_use]
    pub fn new(repository: &'a mut Repository, store: &'a S, config: &'a TocConfig) -> Self {
        Self {
            repository,
            store,
            config,
        }
    }

    /// The edited repository
    #[inline]
    #[must_use]
    pub fn repository(&self) -> &Repository {
        self.repository
    }

    /// Add an entry, creating a blank document for it unless external
    ///
    /// Returns the entry as saved.
    ///
    /// # Errors
    /// - [`RepoError::Toc`](crate::RepoError::Toc) if the target does not
    ///   resolve or the result is too deep
    /// - [`RepoError::InvalidSlug`](crate::RepoError::InvalidSlug) or other
    ///   store errors when creating the document
    pub fn create_toc(&mut self, input: CreateToc) -> RepoResult<TocItem> {
        let mut toc = self.repository.load_toc(self.store)?;
        let position = input.position.unwrap_or(self.config.default_position);

        // Place a provisional entry first so a bad target or depth fails
        // before any document exists.
        let provisional = match &input.url {
            Some(url) => TocItem::link(input.title.clone(), url.clone()),
            None => TocItem::group(input.title.clone()),
        };
        let anchor = input.target.as_ref().map(|target| (target, position));
        let index = toc.insert(provisional, anchor)?;
        self.config.check(&toc)?;

        if !input.external {
            let mut attrs = NewDocument::new(input.title).with_body(input.format, input.body, input.body_sml);
            if let Some(slug) = input.url {
                attrs = attrs.with_slug(slug);
            }
            let record = self.store.create(self.repository.id, attrs)?;
            toc.bind_document(index, &record.summary());
        }

        self.repository.save_toc(&toc, self.config)?;

        let item = toc.items()[index].clone();
        tracing::info!(
            repository = %self.repository.id,
            title = %item.title,
            id = ?item.id,
            index,
            "created TOC entry"
        );
        Ok(item)
    }

    /// Move an entry relative to another
    ///
    /// Returns the entry's new pre-order index.
    ///
    /// # Errors
    /// [`RepoError::Toc`](crate::RepoError::Toc) if a reference does not
    /// resolve, the move is invalid or the result is too deep.
    pub fn move_toc(&mut self, node: &NodeRef, target: &NodeRef, position: Option<Position>) -> RepoResult<usize> {
        let mut toc = self.repository.load_toc(self.store)?;
        let position = position.unwrap_or(self.config.default_position);
        let index = toc.move_to(node, target, position)?;
        self.repository.save_toc(&toc, self.config)?;

        tracing::info!(
            repository = %self.repository.id,
            %node,
            %target,
            %position,
            index,
            "moved TOC entry"
        );
        Ok(index)
    }

    /// Delete a document and its TOC entries
    ///
    /// Children of the removed entry are handled per
    /// [`TocConfig::remove_policy`]. A repository still on the default tree
    /// keeps it.
    ///
    /// # Errors
    /// - [`RepoError::DocumentNotFound`](crate::RepoError::DocumentNotFound)
    ///   or other store errors
    /// - [`RepoError::Toc`](crate::RepoError::Toc) if the edited TOC is too
    ///   deep to save; the document is not deleted
    pub fn destroy_doc(&mut self, id: DocId) -> RepoResult<DocumentRecord> {
        self.store.find(self.repository.id, id)?;

        // The edited TOC is encoded before the record goes, so a TOC that
        // cannot be saved keeps the document.
        let edited = match self.repository.custom_toc() {
            Some(_) => {
                let mut toc = self.repository.load_toc(self.store)?;
                if toc.contains_document(id) {
                    toc.remove_document(id, self.config.remove_policy)?;
                    Some(Repository::prepare_toc(&toc, self.config)?)
                } else {
                    None
                }
            }
            None => None,
        };

        let record = self.store.destroy(self.repository.id, id)?;
        if let Some(text) = edited {
            self.repository.commit_toc(text);
        }

        tracing::info!(
            repository = %self.repository.id,
            %id,
            policy = ?self.config.remove_policy,
            "destroyed document"
        );
        Ok(record)
    }

    /// Rename a document and refresh its TOC entries
    ///
    /// # Errors
    /// Store errors such as
    /// [`RepoError::DuplicateSlug`](crate::RepoError::DuplicateSlug), or
    /// [`RepoError::Toc`](crate::RepoError::Toc) if the edited TOC is too deep
    /// to save. Either way neither the record nor the TOC changes.
    pub fn rename_doc(&mut self, id: DocId, title: impl Into<String>, slug: Option<String>) -> RepoResult<DocumentRecord> {
        let mut record = self.store.find(self.repository.id, id)?;
        record.title = title.into();
        if let Some(slug) = slug {
            record.slug = slug;
        }

        let edited = match self.repository.custom_toc() {
            Some(_) => {
                let mut toc = self.repository.load_toc(self.store)?;
                if toc.update_document(&record.summary()) > 0 {
                    Some(Repository::prepare_toc(&toc, self.config)?)
                } else {
                    None
                }
            }
            None => None,
        };

        let record = self.store.update(record)?;
        if let Some(text) = edited {
            self.repository.commit_toc(text);
        }

        tracing::info!(repository = %self.repository.id, %id, slug = %record.slug, "renamed document");
        Ok(record)
    }

    /// Reconcile a custom TOC with the stored documents
    ///
    /// Entries of deleted documents are removed and unreferenced documents
    /// are appended at the end. No-op for repositories on the default tree.
    ///
    /// # Errors
    /// Store failures, or [`RepoError::InvalidToc`](crate::RepoError::InvalidToc)
    /// for a corrupt stored TOC.
    pub fn sync(&mut self) -> RepoResult<SyncReport> {
        if self.repository.custom_toc().is_none() {
            return Ok(SyncReport::default());
        }

        let documents = self.store.list(self.repository.id)?;
        let existing: HashSet<DocId> = documents.iter().map(|d| d.id).collect();
        let summaries: Vec<_> = documents.iter().map(DocumentRecord::summary).collect();

        let mut toc = self.repository.load_toc(self.store)?;
        let pruned = toc.prune_dangling(|id| existing.contains(&id), self.config.remove_policy);

        let missing: Vec<_> = toc.missing_documents(&summaries).into_iter().cloned().collect();
        let mut appended = Vec::with_capacity(missing.len());
        for doc in &missing {
            toc.insert_document(doc, None)?;
            appended.push(doc.id);
        }

        let report = SyncReport { pruned, appended };
        if !report.is_clean() {
            self.repository.save_toc(&toc, self.config)?;
            tracing::info!(
                repository = %self.repository.id,
                pruned = report.pruned.len(),
                appended = report.appended.len(),
                "synced TOC with documents"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use crate::repository::RepositoryId;
    use crate::store::{MemoryStore, MockDocumentStore};
    use doctree_toc::{codec, RemovePolicy, TocError};

    fn repo() -> Repository {
        Repository::new(RepositoryId(1), "team", "handbook", "Handbook").unwrap()
    }

    fn titles(repo: &Repository, store: &MemoryStore) -> Vec<(String, usize)> {
        repo.load_toc(store)
            .unwrap()
            .iter()
            .map(|i| (i.title.clone(), i.depth))
            .collect()
    }

    #[test]
    fn create_toc_appends_document_entry() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);

        let item = editor.create_toc(CreateToc::new("Intro").with_url("intro")).unwrap();
        assert_eq!(item.url.as_deref(), Some("intro"));
        let id = item.id.unwrap();

        let doc = store.find(repo.id, id).unwrap();
        assert_eq!(doc.title, "Intro");
        assert_eq!(doc.slug, "intro");
        assert_eq!(repo.load_toc(&store).unwrap().document_ids(), vec![id]);
    }

    #[test]
    fn create_toc_generates_slug_without_url() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let item = TocEditor::new(&mut repo, &store, &config)
            .create_toc(CreateToc::new("Untitled"))
            .unwrap();
        let doc = store.find(repo.id, item.id.unwrap()).unwrap();
        assert_eq!(item.url.as_deref(), Some(doc.slug.as_str()));
    }

    #[test]
    fn create_external_entry_positioned_as_child() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);

        let guide = editor.create_toc(CreateToc::new("Guide").with_url("guide")).unwrap();
        let link = editor
            .create_toc(
                CreateToc::new("Homepage")
                    .with_url("https://example.com")
                    .external()
                    .with_target(NodeRef::Document(guide.id.unwrap()), Some(Position::Child)),
            )
            .unwrap();

        assert_eq!(link.id, None);
        assert_eq!(link.depth, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(
            titles(&repo, &store),
            vec![("Guide".to_string(), 0), ("Homepage".to_string(), 1)]
        );
    }

    #[test]
    fn create_toc_default_position_is_after() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);

        let a = editor.create_toc(CreateToc::new("A").with_url("aa")).unwrap();
        editor.create_toc(CreateToc::new("B").with_url("bb")).unwrap();
        editor
            .create_toc(CreateToc::new("C").with_url("cc").with_target(NodeRef::Document(a.id.unwrap()), None))
            .unwrap();

        assert_eq!(
            titles(&repo, &store),
            vec![("A".to_string(), 0), ("C".to_string(), 0), ("B".to_string(), 0)]
        );
    }

    #[test]
    fn create_toc_with_missing_target_creates_nothing() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let result = TocEditor::new(&mut repo, &store, &config).create_toc(
            CreateToc::new("Orphan")
                .with_url("orphan")
                .with_target(NodeRef::Document(DocId(404)), Some(Position::Child)),
        );

        assert!(matches!(result, Err(RepoError::Toc(TocError::NotFound(_)))));
        assert!(store.is_empty());
        assert_eq!(repo.custom_toc(), None);
    }

    #[test]
    fn create_toc_respects_depth_limit() {
        let store = MemoryStore::new();
        let config = TocConfig::new().with_max_depth(0);
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);

        let root = editor.create_toc(CreateToc::new("Root").with_url("root")).unwrap();
        let result = editor.create_toc(
            CreateToc::new("Nested")
                .with_url("nested")
                .with_target(NodeRef::Document(root.id.unwrap()), Some(Position::Child)),
        );
        assert!(matches!(result, Err(RepoError::Toc(TocError::TooDeep { .. }))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn create_toc_store_failure_leaves_toc_untouched() {
        let mut store = MockDocumentStore::new();
        store.expect_list().returning(|_| Ok(Vec::new()));
        store
            .expect_create()
            .times(1)
            .returning(|_, _| Err(RepoError::Store("disk full".into())));

        let config = TocConfig::new();
        let mut repo = repo();
        let result = TocEditor::new(&mut repo, &store, &config).create_toc(CreateToc::new("Doc"));

        assert!(matches!(result, Err(RepoError::Store(_))));
        assert_eq!(repo.custom_toc(), None);
    }

    #[test]
    fn move_toc_reparents_entry() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);

        let a = editor.create_toc(CreateToc::new("A").with_url("aa")).unwrap();
        let b = editor.create_toc(CreateToc::new("B").with_url("bb")).unwrap();
        let index = editor
            .move_toc(
                &NodeRef::Document(b.id.unwrap()),
                &NodeRef::Document(a.id.unwrap()),
                Some(Position::Child),
            )
            .unwrap();

        assert_eq!(index, 1);
        assert_eq!(
            titles(&repo, &store),
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );
    }

    #[test]
    fn move_toc_materializes_default_tree() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let a = store.create(repo.id, NewDocument::new("A").with_slug("aa")).unwrap();
        let b = store.create(repo.id, NewDocument::new("B").with_slug("bb")).unwrap();

        TocEditor::new(&mut repo, &store, &config)
            .move_toc(&NodeRef::Document(b.id), &NodeRef::Document(a.id), Some(Position::Before))
            .unwrap();

        assert!(repo.custom_toc().is_some());
        assert_eq!(repo.load_toc(&store).unwrap().document_ids(), vec![b.id, a.id]);
    }

    #[test]
    fn move_toc_failure_keeps_stored_text() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        repo.set_toc(Some("- title: A\n  url: a\n".into())).unwrap();

        let result = TocEditor::new(&mut repo, &store, &config).move_toc(
            &NodeRef::Url("a".into()),
            &NodeRef::Url("missing".into()),
            None,
        );
        assert!(result.is_err());
        assert_eq!(repo.custom_toc(), Some("- title: A\n  url: a\n"));
    }

    #[test]
    fn move_to_current_position_keeps_encoding() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);
        let a = editor.create_toc(CreateToc::new("A").with_url("aa")).unwrap();
        let b = editor.create_toc(CreateToc::new("B").with_url("bb")).unwrap();
        let before = editor.repository().custom_toc().unwrap().to_string();

        editor
            .move_toc(&NodeRef::Document(b.id.unwrap()), &NodeRef::Document(a.id.unwrap()), Some(Position::After))
            .unwrap();
        assert_eq!(editor.repository().custom_toc().unwrap(), before);
    }

    #[test]
    fn destroy_doc_promotes_children() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);

        let parent = editor.create_toc(CreateToc::new("Parent").with_url("parent")).unwrap();
        let parent_ref = NodeRef::Document(parent.id.unwrap());
        editor
            .create_toc(CreateToc::new("One").with_url("one").with_target(parent_ref.clone(), Some(Position::Child)))
            .unwrap();
        editor
            .create_toc(CreateToc::new("Two").with_url("two").with_target(parent_ref, Some(Position::Child)))
            .unwrap();

        let removed = editor.destroy_doc(parent.id.unwrap()).unwrap();
        assert_eq!(removed.title, "Parent");
        assert_eq!(
            titles(&repo, &store),
            vec![("One".to_string(), 0), ("Two".to_string(), 0)]
        );
    }

    #[test]
    fn destroy_doc_cascades_when_configured() {
        let store = MemoryStore::new();
        let config = TocConfig::new().with_remove_policy(RemovePolicy::Cascade);
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);

        let parent = editor.create_toc(CreateToc::new("Parent").with_url("parent")).unwrap();
        editor
            .create_toc(
                CreateToc::new("Child")
                    .with_url("child")
                    .with_target(NodeRef::Document(parent.id.unwrap()), Some(Position::Child)),
            )
            .unwrap();
        editor.destroy_doc(parent.id.unwrap()).unwrap();

        // The child's document survives; only its entry went with the subtree.
        assert_eq!(store.len(), 1);
        assert!(titles(&repo, &store).is_empty());
    }

    #[test]
    fn destroy_doc_keeps_default_tree_implicit() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let a = store.create(repo.id, NewDocument::new("A").with_slug("aa")).unwrap();

        TocEditor::new(&mut repo, &store, &config).destroy_doc(a.id).unwrap();
        assert_eq!(repo.custom_toc(), None);
        assert_eq!(repo.toc_text(&store).unwrap(), "[]\n");
    }

    #[test]
    fn destroy_missing_doc_fails() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let result = TocEditor::new(&mut repo, &store, &config).destroy_doc(DocId(5));
        assert!(matches!(result, Err(RepoError::DocumentNotFound { .. })));
    }

    /// Stored text with documents `a` and `b` at the root next to a group
    /// nested two levels deep
    fn deep_toc(a: DocId, b: DocId) -> String {
        format!(
            "- title: A\n  url: aa\n  id: {a}\n  depth: 0\n\
             - title: B\n  url: bb\n  id: {b}\n  depth: 0\n\
             - title: Notes\n  url: null\n  id: null\n  depth: 1\n\
             - title: Drafts\n  url: null\n  id: null\n  depth: 2\n"
        )
    }

    #[test]
    fn destroy_doc_keeps_document_when_toc_cannot_be_saved() {
        let store = MemoryStore::new();
        let config = TocConfig::new().with_max_depth(1);
        let mut repo = repo();
        let a = store.create(repo.id, NewDocument::new("A").with_slug("aa")).unwrap();
        let b = store.create(repo.id, NewDocument::new("B").with_slug("bb")).unwrap();
        let text = deep_toc(a.id, b.id);
        repo.set_toc(Some(text.clone())).unwrap();

        let result = TocEditor::new(&mut repo, &store, &config).destroy_doc(a.id);
        assert!(matches!(result, Err(RepoError::Toc(TocError::TooDeep { depth: 2, max: 1 }))));
        assert!(store.find(repo.id, a.id).is_ok());
        assert_eq!(repo.custom_toc(), Some(text.as_str()));
    }

    #[test]
    fn rename_doc_keeps_record_when_toc_cannot_be_saved() {
        let store = MemoryStore::new();
        let config = TocConfig::new().with_max_depth(1);
        let mut repo = repo();
        let a = store.create(repo.id, NewDocument::new("A").with_slug("aa")).unwrap();
        let b = store.create(repo.id, NewDocument::new("B").with_slug("bb")).unwrap();
        let text = deep_toc(a.id, b.id);
        repo.set_toc(Some(text.clone())).unwrap();

        let result = TocEditor::new(&mut repo, &store, &config).rename_doc(b.id, "Renamed", None);
        assert!(matches!(result, Err(RepoError::Toc(TocError::TooDeep { .. }))));
        assert_eq!(store.find(repo.id, b.id).unwrap().title, "B");
        assert_eq!(repo.custom_toc(), Some(text.as_str()));
    }

    #[test]
    fn rename_doc_duplicate_slug_keeps_toc() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);
        editor.create_toc(CreateToc::new("One").with_url("one")).unwrap();
        let two = editor.create_toc(CreateToc::new("Two").with_url("two")).unwrap();
        let before = editor.repository().custom_toc().unwrap().to_string();

        let result = editor.rename_doc(two.id.unwrap(), "Uno", Some("one".into()));
        assert!(matches!(result, Err(RepoError::DuplicateSlug { .. })));
        assert_eq!(repo.custom_toc(), Some(before.as_str()));
    }

    #[test]
    fn rename_doc_updates_entry() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let mut editor = TocEditor::new(&mut repo, &store, &config);
        let item = editor.create_toc(CreateToc::new("Draft").with_url("draft")).unwrap();

        editor
            .rename_doc(item.id.unwrap(), "Final", Some("final".into()))
            .unwrap();

        let toc = repo.load_toc(&store).unwrap();
        assert_eq!(toc.items()[0].title, "Final");
        assert_eq!(toc.items()[0].url.as_deref(), Some("final"));
    }

    #[test]
    fn sync_prunes_and_appends() {
        let store = MemoryStore::new();
        let config = TocConfig::new();
        let mut repo = repo();
        let kept = store.create(repo.id, NewDocument::new("Kept").with_slug("kept")).unwrap();
        let fresh = store.create(repo.id, NewDocument::new("Fresh").with_slug("fresh")).unwrap();

        let text = format!(
            "- title: Kept\n  url: kept\n  id: {}\n- title: Gone\n  url: gone\n  id: 99\n",
            kept.id
        );
        repo.set_toc(Some(text)).unwrap();

        let report = TocEditor::new(&mut repo, &store, &config).sync().unwrap();
        assert_eq!(report.pruned, vec![DocId(99)]);
        assert_eq!(report.appended, vec![fresh.id]);
        assert_eq!(
            repo.load_toc(&store).unwrap().document_ids(),
            vec![kept.id, fresh.id]
        );

        let again = TocEditor::new(&mut repo, &store, &config).sync().unwrap();
        assert!(again.is_clean());
        assert!(codec::decode(repo.custom_toc().unwrap()).is_ok());
    }
}
