//! Doctree TOC
//!
//! The table-of-contents tree of a documentation repository.
//!
//! # Core Concepts
//!
//! - [`Toc`]: ordered, nested tree of [`TocItem`] entries (flat pre-order arena)
//! - [`codec`]: stable YAML form, `decode(encode(toc)) == toc`
//! - [`Toc::move_to`], [`Toc::insert`], [`Toc::remove_document`]: edits that
//!   either fully apply or leave the tree untouched
//! - [`to_html`]: nested `<ul>` outline with optional url prefix
//! - [`TocConfig`]: remove policy, depth limit, default position
//!
//! # Example
//!
//! ```rust
//! use doctree_toc::{DocId, DocumentSummary, NodeRef, Position, RenderOptions, Toc};
//!
//! let docs = vec![
//!     DocumentSummary::new(1, "Intro", "intro"),
//!     DocumentSummary::new(2, "Setup", "setup"),
//! ];
//! let mut toc = Toc::from_documents(&docs);
//! toc.move_to(&NodeRef::Document(DocId(2)), &NodeRef::Document(DocId(1)), Position::Child)?;
//!
//! let yaml = toc.to_yaml()?;
//! assert_eq!(yaml.parse::<Toc>()?, toc);
//!
//! let html = toc.to_html(&RenderOptions::new().with_prefix("/docs"));
//! assert!(html.contains(r#"href="/docs/setup""#));
//! # Ok::<(), doctree_toc::TocError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod builder;
pub mod codec;
mod config;
mod error;
mod item;
mod mutate;
mod render;
mod toc;

pub use builder::build_from_documents;
pub use codec::{decode, encode};
pub use config::{RemovePolicy, TocConfig};
pub use error::{TocError, TocResult};
pub use item::{DocId, DocumentSummary, NodeRef, TocItem};
pub use mutate::Position;
pub use render::{to_html, RenderOptions};
pub use toc::{OutlineNode, Toc};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
