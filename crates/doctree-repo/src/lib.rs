//! Doctree Repository Layer
//!
//! Ties a repository's TOC to its document records.
//!
//! # Core Concepts
//!
//! - [`Repository`]: slug, paths, preferences and the optional custom TOC
//! - [`DocumentStore`]: find/create/list/update/destroy on document records
//! - [`MemoryStore`]: in-process [`DocumentStore`]
//! - [`TocEditor`]: create, move, destroy, rename and sync operations that
//!   keep the TOC consistent with the store
//!
//! # Example
//!
//! ```rust
//! use doctree_repo::{CreateToc, DocumentStore, MemoryStore, Repository, RepositoryId, TocEditor};
//! use doctree_toc::{NodeRef, Position, TocConfig};
//!
//! let store = MemoryStore::new();
//! let config = TocConfig::new();
//! let mut repo = Repository::new(RepositoryId(1), "team", "handbook", "Handbook")?;
//!
//! let mut editor = TocEditor::new(&mut repo, &store, &config);
//! editor.create_toc(CreateToc::new("Intro").with_url("intro"))?;
//! editor.create_toc(
//!     CreateToc::new("Setup")
//!         .with_url("setup")
//!         .with_target(NodeRef::Url("intro".into()), Some(Position::Child)),
//! )?;
//!
//! assert_eq!(store.list(repo.id)?.len(), 2);
//! assert!(repo.toc_html(&store, Some("/team/handbook"))?.contains("/team/handbook/setup"));
//! # Ok::<(), doctree_repo::RepoError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod editor;
mod error;
mod repository;
mod slug;
mod store;

pub use document::{DocFormat, DocumentRecord, NewDocument};
pub use editor::{CreateToc, SyncReport, TocEditor};
pub use error::{RepoError, RepoResult, INVALID_TOC_MESSAGE};
pub use repository::{Preferences, Repository, RepositoryId};
pub use slug::{random_slug, validate_slug};
pub use store::{DocumentStore, MemoryStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
