//! Subcommand implementations
//!
//! Each command reads its input files, runs one library operation and
//! returns the text to print (or to write back with `--in-place`).

use anyhow::{Context, Result};
use doctree_toc::{
    build_from_documents, codec, DocId, DocumentSummary, NodeRef, Position, RemovePolicy,
    RenderOptions, Toc, TocConfig,
};
use std::fs;
use std::path::Path;

/// Load `TocConfig` from a TOML file, defaults when no file is given
pub(crate) fn load_config(path: Option<&Path>) -> Result<TocConfig> {
    let Some(path) = path else {
        return Ok(TocConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = toml::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

fn read_toc(path: &Path) -> Result<Toc> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    codec::decode(&text).with_context(|| format!("{} is not a valid TOC", path.display()))
}

/// Print to stdout or replace the input file
pub(crate) fn emit(path: &Path, text: &str, in_place: bool) -> Result<()> {
    if in_place {
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "updated TOC file");
    } else {
        print!("{text}");
    }
    Ok(())
}

/// One-line summary of a valid TOC file
pub(crate) fn validate(path: &Path, config: &TocConfig) -> Result<String> {
    let toc = read_toc(path)?;
    config.check(&toc)?;
    let documents = toc.document_ids().len();
    Ok(format!(
        "{}: {} entries, {} documents, max depth {}\n",
        path.display(),
        toc.len(),
        documents,
        toc.max_depth().unwrap_or(0)
    ))
}

pub(crate) fn render(path: &Path, prefix: Option<&str>) -> Result<String> {
    let toc = read_toc(path)?;
    let mut options = RenderOptions::new();
    if let Some(prefix) = prefix {
        options = options.with_prefix(prefix);
    }
    Ok(toc.to_html(&options) + "\n")
}

/// Canonical encoding of a TOC file
pub(crate) fn format(path: &Path) -> Result<String> {
    Ok(codec::encode(&read_toc(path)?)?)
}

pub(crate) fn move_entry(
    path: &Path,
    node: &str,
    target: &str,
    position: Option<&str>,
    config: &TocConfig,
) -> Result<String> {
    let mut toc = read_toc(path)?;
    let node: NodeRef = node.parse()?;
    let target: NodeRef = target.parse()?;
    let position = match position {
        Some(name) => name.parse::<Position>()?,
        None => config.default_position,
    };

    toc.move_to(&node, &target, position)
        .with_context(|| format!("cannot move {node} {position} {target}"))?;
    config.check(&toc)?;
    Ok(codec::encode(&toc)?)
}

pub(crate) fn remove(path: &Path, doc: i64, cascade: bool, config: &TocConfig) -> Result<String> {
    let mut toc = read_toc(path)?;
    let policy = if cascade {
        RemovePolicy::Cascade
    } else {
        config.remove_policy
    };
    let removed = toc.remove_document(DocId(doc), policy)?;
    tracing::debug!(doc, ?policy, removed = removed.len(), "removed entries");
    Ok(codec::encode(&toc)?)
}

/// Default tree from a JSON array of `{id, title, slug}` records
pub(crate) fn build(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let documents: Vec<DocumentSummary> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON list of documents", path.display()))?;
    Ok(codec::encode(&build_from_documents(&documents))?)
}
