//! YAML codec for TOC trees
//!
//! The persisted form is a YAML sequence of mappings, one per entry in
//! pre-order, keys in the order `title`, `url`, `id`, `depth`:
//!
//! ```yaml
//! - title: Hello world
//!   url: /hello
//!   id: null
//!   depth: 0
//! ```
//!
//! Decoding is shape-checked before anything is built, so a malformed blob
//! never produces a partial tree.

use crate::error::{TocError, TocResult};
use crate::item::{DocId, TocItem};
use crate::toc::Toc;
use serde_yaml::{Mapping, Value};
use std::str::FromStr;

/// Serialize a tree to its stable YAML form
///
/// # Errors
/// Returns [`TocError::Encode`] if the serializer fails.
pub fn encode(toc: &Toc) -> TocResult<String> {
    serde_yaml::to_string(toc.items()).map_err(TocError::Encode)
}

/// Parse YAML text into a tree
///
/// Empty, whitespace-only and `null` input decode to an empty tree.
///
/// # Errors
/// Returns [`TocError::Format`] if the text is not YAML, is not a sequence,
/// or contains an entry that is not a mapping with a scalar `title`.
/// Numeric and boolean titles and urls are read as their text.
pub fn decode(text: &str) -> TocResult<Toc> {
    if text.trim().is_empty() {
        return Ok(Toc::new());
    }

    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| TocError::format(format!("YAML parse error: {e}")))?;

    let entries = match value {
        Value::Null => return Ok(Toc::new()),
        Value::Sequence(entries) => entries,
        other => {
            return Err(TocError::format(format!(
                "expected a sequence of entries, found {}",
                kind(&other)
            )))
        }
    };

    let items = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| decode_entry(i, entry))
        .collect::<TocResult<Vec<_>>>()?;

    let (toc, clamped) = Toc::from_items_normalized(items);
    if clamped > 0 {
        tracing::warn!(clamped, "normalized TOC depths while decoding");
    }
    Ok(toc)
}

fn decode_entry(index: usize, entry: &Value) -> TocResult<TocItem> {
    let Value::Mapping(map) = entry else {
        return Err(TocError::format(format!(
            "entry {index}: expected a mapping, found {}",
            kind(entry)
        )));
    };

    let title = match field(map, "title") {
        Some(Value::String(title)) => title.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(TocError::format(format!(
                "entry {index}: title must be a string, found {}",
                kind(other)
            )))
        }
        None => return Err(TocError::format(format!("entry {index}: missing title"))),
    };

    let url = match field(map, "url") {
        None | Some(Value::Null) => None,
        Some(Value::String(url)) => Some(url.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(TocError::format(format!(
                "entry {index}: url must be a string, found {}",
                kind(other)
            )))
        }
    };

    let id = match field(map, "id") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(n.as_i64().map(DocId).ok_or_else(|| {
            TocError::format(format!("entry {index}: id must be an integer, found {n}"))
        })?),
        Some(Value::String(s)) => Some(s.parse::<i64>().map(DocId).map_err(|_| {
            TocError::format(format!("entry {index}: id must be an integer, found '{s}'"))
        })?),
        Some(other) => {
            return Err(TocError::format(format!(
                "entry {index}: id must be an integer, found {}",
                kind(other)
            )))
        }
    };

    let depth = match field(map, "depth") {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|d| usize::try_from(d).ok())
            .ok_or_else(|| {
                TocError::format(format!(
                    "entry {index}: depth must be a non-negative integer, found {n}"
                ))
            })?,
        Some(other) => {
            return Err(TocError::format(format!(
                "entry {index}: depth must be a non-negative integer, found {}",
                kind(other)
            )))
        }
    };

    Ok(TocItem {
        title,
        url,
        id,
        depth,
    })
}

fn field<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(Value::String(key.to_string()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

impl Toc {
    /// Serialize to the stable YAML form
    ///
    /// # Errors
    /// See [`encode`].
    pub fn to_yaml(&self) -> TocResult<String> {
        encode(self)
    }
}

impl FromStr for Toc {
    type Err = TocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}
