//! Default trees built from document lists

use crate::item::{DocumentSummary, TocItem};
use crate::toc::Toc;

/// Flat root-level tree listing documents in the given order
///
/// This is the tree a repository shows until a custom TOC is saved.
#[must_use]
pub fn build_from_documents<'a, I>(documents: I) -> Toc
where
    I: IntoIterator<Item = &'a DocumentSummary>,
{
    Toc {
        items: documents.into_iter().map(TocItem::document).collect(),
    }
}

impl Toc {
    /// See [`build_from_documents`]
    #[must_use]
    pub fn from_documents(documents: &[DocumentSummary]) -> Self {
        build_from_documents(documents)
    }

    /// Documents not referenced by any entry, in input order
    #[must_use]
    pub fn missing_documents<'a>(&self, documents: &'a [DocumentSummary]) -> Vec<&'a DocumentSummary> {
        documents
            .iter()
            .filter(|doc| !self.contains_document(doc.id))
            .collect()
    }
}
