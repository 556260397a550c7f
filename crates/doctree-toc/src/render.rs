//! HTML outline rendering
//!
//! Produces a nested list of links:
//!
//! ```html
//! <ul class="toc-items">
//!   <li class="toc-item" data-depth="0" data-id="1"><a class="item-link" href="/prefix/hello">Hello</a></li>
//! </ul>
//! ```
//!
//! (shown indented; the actual output has no whitespace between tags).

use crate::item::{DocId, TocItem};
use crate::toc::{OutlineNode, Toc};
use std::collections::HashSet;
use std::fmt::Write;

/// Rendering options
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Base path prepended to every relative url
    pub prefix: Option<String>,
    /// Ids of documents that still exist; entries pointing elsewhere are
    /// rendered without a link. `None` trusts every id.
    pub known_documents: Option<HashSet<DocId>>,
}

impl RenderOptions {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With url prefix
    #[inline]
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// With the set of existing documents
    #[inline]
    #[must_use]
    pub fn with_known_documents(mut self, ids: impl IntoIterator<Item = DocId>) -> Self {
        self.known_documents = Some(ids.into_iter().collect());
        self
    }

    fn is_dangling(&self, item: &TocItem) -> bool {
        match (item.id, &self.known_documents) {
            (Some(id), Some(known)) => !known.contains(&id),
            _ => false,
        }
    }

    /// Final href for an entry url
    ///
    /// A prefix that is empty or only slashes leaves the url as it is.
    #[must_use]
    pub fn href(&self, url: &str) -> String {
        let prefix = self
            .prefix
            .as_deref()
            .map(|prefix| prefix.trim_end_matches('/'))
            .filter(|prefix| !prefix.is_empty());
        match prefix {
            Some(prefix) if !is_absolute(url) => {
                let url = url.trim_start_matches('/');
                format!("{prefix}/{url}")
            }
            _ => url.to_string(),
        }
    }
}

fn is_absolute(url: &str) -> bool {
    url.contains("://") || url.starts_with("mailto:") || url.starts_with('#')
}

/// Render a tree as a nested HTML list
#[must_use]
pub fn to_html(toc: &Toc, options: &RenderOptions) -> String {
    let mut html = String::new();
    render_list(&mut html, &toc.outline(), options);
    html
}

fn render_list(html: &mut String, nodes: &[OutlineNode<'_>], options: &RenderOptions) {
    html.push_str(r#"<ul class="toc-items">"#);
    for node in nodes {
        render_node(html, node, options);
    }
    html.push_str("</ul>");
}

fn render_node(html: &mut String, node: &OutlineNode<'_>, options: &RenderOptions) {
    let item = node.item;
    let _ = write!(html, r#"<li class="toc-item" data-depth="{}""#, item.depth);
    if let Some(id) = item.id {
        let _ = write!(html, r#" data-id="{id}""#);
    }
    html.push('>');

    let title = escape(&item.title);
    match item.url.as_deref().filter(|_| item.is_link()) {
        Some(_) if options.is_dangling(item) => {
            tracing::warn!(id = ?item.id, title = %item.title, "rendering dangling TOC entry without link");
            let _ = write!(html, r#"<span class="item-link dangling">{title}</span>"#);
        }
        Some(url) => {
            let href = escape(&options.href(url));
            let _ = write!(html, r#"<a class="item-link" href="{href}">{title}</a>"#);
        }
        None => {
            let _ = write!(html, r#"<span class="item-group">{title}</span>"#);
        }
    }

    if !node.children.is_empty() {
        render_list(html, &node.children, options);
    }
    html.push_str("</li>");
}

/// Escape text for use in HTML content and double-quoted attributes
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl Toc {
    /// See [`to_html`]
    #[must_use]
    pub fn to_html(&self, options: &RenderOptions) -> String {
        to_html(self, options)
    }
}
