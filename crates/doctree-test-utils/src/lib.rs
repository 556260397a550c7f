//! Testing utilities for the doctree workspace
//!
//! Shared fixtures and proptest strategies.

#![allow(missing_docs)]

use doctree_repo::{DocumentRecord, DocumentStore, MemoryStore, NewDocument, Repository, RepositoryId};
use doctree_toc::{DocId, DocumentSummary, Toc, TocItem};
use proptest::prelude::*;

pub const TEST_REPOSITORY: RepositoryId = RepositoryId(1);

pub fn summaries(count: usize) -> Vec<DocumentSummary> {
    (1_i64..)
        .take(count)
        .map(|i| DocumentSummary::new(i, format!("Doc {i}"), format!("doc-{i}")))
        .collect()
}

/// Guides
///   Install     (doc 1)
///     Upgrade   (doc 2)
///   Configure   (doc 3)
/// Reference     (doc 4)
/// Website       (external)
pub fn sample_toc() -> Toc {
    Toc::from_items(vec![
        TocItem::group("Guides"),
        TocItem::link("Install", "install").at_depth(1).with_id(DocId(1)),
        TocItem::link("Upgrade", "upgrade").at_depth(2).with_id(DocId(2)),
        TocItem::link("Configure", "configure").at_depth(1).with_id(DocId(3)),
        TocItem::link("Reference", "reference").with_id(DocId(4)),
        TocItem::link("Website", "https://example.com"),
    ])
}

pub fn test_repository() -> Repository {
    Repository::new(TEST_REPOSITORY, "team", "handbook", "Handbook").unwrap()
}

/// Store holding `titles` as documents of [`TEST_REPOSITORY`], slugged by
/// lowercased title
pub fn seeded_store(titles: &[&str]) -> (MemoryStore, Vec<DocumentRecord>) {
    let store = MemoryStore::new();
    let docs = titles
        .iter()
        .map(|title| {
            store
                .create(
                    TEST_REPOSITORY,
                    NewDocument::new(*title).with_slug(title.to_lowercase().replace(' ', "-")),
                )
                .unwrap()
        })
        .collect();
    (store, docs)
}

pub fn depths(toc: &Toc) -> Vec<usize> {
    toc.iter().map(|item| item.depth).collect()
}

/// Whether every entry is at most one level deeper than the previous one
pub fn depths_are_consistent(toc: &Toc) -> bool {
    let mut max_allowed = 0;
    for item in toc {
        if item.depth > max_allowed {
            return false;
        }
        max_allowed = item.depth + 1;
    }
    true
}

fn arb_item() -> impl Strategy<Value = (TocItem, usize)> {
    (
        "[A-Za-z][A-Za-z0-9 ,:#&'\"<>-]{0,20}",
        proptest::option::of("/?[a-z][a-z0-9/_.-]{0,15}"),
        proptest::option::of(1i64..10_000),
        0usize..4,
    )
        .prop_map(|(title, url, id, step)| {
            let item = TocItem {
                title,
                url,
                id: id.map(DocId),
                depth: 0,
            };
            (item, step)
        })
}

/// Well-formed trees of up to `max_len` entries
///
/// Each entry's depth is derived from a random step so that it never
/// exceeds the previous depth plus one.
pub fn arb_toc(max_len: usize) -> impl Strategy<Value = Toc> {
    proptest::collection::vec(arb_item(), 0..=max_len).prop_map(|entries| {
        let mut previous: Option<usize> = None;
        let items = entries
            .into_iter()
            .map(|(item, step)| {
                let depth = match previous {
                    None => 0,
                    // step 0 goes one deeper, the rest climb back up
                    Some(prev) if step == 0 => prev + 1,
                    Some(prev) => prev.saturating_sub(step - 1),
                };
                previous = Some(depth);
                item.at_depth(depth)
            })
            .collect();
        Toc::from_items(items)
    })
}
