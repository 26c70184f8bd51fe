//! Plugin pack parsers
//!
//! A plugin pack is a single file mapping category labels to lists of option
//! values. Three formats are understood:
//!
//! - `.json` - one JSON object
//! - `.yaml` / `.yml` - one YAML mapping
//! - `.md` / `.markdown` - fenced code blocks tagged `json` or `yaml`
//!   (untagged blocks are read as YAML)
//!
//! Every parser funnels its document through the same normalization: labels
//! go through [`normalize_category`], items are stringified and trimmed, and
//! values are appended in first-seen order. Deduplication is left to the
//! directory loader. A label repeated verbatim within one document keeps only
//! its last value, in JSON and YAML alike.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::category::normalize_category;
use crate::error::{CanonicalError, Result};

/// Option values keyed by canonical plugin category
pub type PluginOptions = BTreeMap<String, Vec<String>>;

/// Opening fence of a Markdown code block, capturing its info string
static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[ \t]*([^`\s]*)[ \t]*$").expect("fence regex is valid"));

/// Plugin file format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginFormat {
    Json,
    Yaml,
    Markdown,
}

impl PluginFormat {
    /// Pick the format for a path, or `None` for an unrecognized extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Parse a single plugin pack
///
/// Fails with [`CanonicalError::UnsupportedFormat`] unless the extension is
/// `.json`, `.yaml`, `.yml`, `.md` or `.markdown` (any case).
pub fn parse_plugin_file(path: &Path) -> Result<PluginOptions> {
    debug!(?path, "parse_plugin_file: called");
    let format = PluginFormat::from_path(path).ok_or_else(|| CanonicalError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let text = fs::read_to_string(path).map_err(|e| CanonicalError::io(path, e))?;
    debug!(?path, ?format, len = text.len(), "parse_plugin_file: read content");

    match format {
        PluginFormat::Json => parse_json(&text, path),
        PluginFormat::Yaml => parse_yaml(&text, path),
        PluginFormat::Markdown => parse_markdown(&text, path),
    }
}

/// Parse a JSON document; `path` is only used for error reporting
pub fn parse_json(text: &str, path: &Path) -> Result<PluginOptions> {
    let doc: PackDocument = serde_json::from_str(text).map_err(|e| CanonicalError::malformed(path, e))?;
    let mut out = PluginOptions::new();
    extend_from_document(&mut out, doc, path)?;
    Ok(out)
}

/// Parse a YAML document; an empty document yields no options
pub fn parse_yaml(text: &str, path: &Path) -> Result<PluginOptions> {
    let mut out = PluginOptions::new();
    if text.trim().is_empty() {
        return Ok(out);
    }
    let doc: PackDocument = serde_yaml::from_str(text).map_err(|e| CanonicalError::malformed(path, e))?;
    extend_from_document(&mut out, doc, path)?;
    Ok(out)
}

/// Parse every fenced `json`/`yaml` block of a Markdown document, in order
pub fn parse_markdown(text: &str, path: &Path) -> Result<PluginOptions> {
    let mut out = PluginOptions::new();
    let mut lines = text.lines();
    let mut block_count = 0usize;

    while let Some(line) = lines.next() {
        let Some(caps) = FENCE_OPEN.captures(line) else {
            continue;
        };
        let lang = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();

        let mut body = Vec::new();
        let mut closed = false;
        for inner in lines.by_ref() {
            if inner.trim() == "```" {
                closed = true;
                break;
            }
            body.push(inner);
        }
        if !closed {
            warn!(?path, %lang, "Ignoring unterminated code block in plugin pack");
            break;
        }

        let body = body.join("\n");
        block_count += 1;
        debug!(?path, %lang, block = block_count, "parse_markdown: parsing block");
        let block = match lang.as_str() {
            "json" => parse_json(&body, path)?,
            "yaml" | "yml" | "" => parse_yaml(&body, path)?,
            other => {
                return Err(CanonicalError::malformed(
                    path,
                    format!("unknown code block format '{}' in block {}", other, block_count),
                ));
            }
        };
        for (category, values) in block {
            out.entry(category).or_default().extend(values);
        }
    }

    debug!(?path, block_count, "parse_markdown: complete");
    Ok(out)
}

/// Top level of a pack document: a mapping, or nothing for `null`
///
/// Collected entry by entry so a repeated key overwrites the earlier one
/// instead of failing the whole document.
struct PackDocument(Option<Mapping>);

impl<'de> Deserialize<'de> for PackDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(PackDocumentVisitor)
    }
}

struct PackDocumentVisitor;

impl<'de> Visitor<'de> for PackDocumentVisitor {
    type Value = PackDocument;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping of category to values")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(PackDocument(None))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(PackDocument(None))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut mapping = Mapping::new();
        while let Some((key, value)) = access.next_entry::<Value, Value>()? {
            mapping.insert(key, value);
        }
        Ok(PackDocument(Some(mapping)))
    }
}

/// Fold one parsed document into `out`
fn extend_from_document(out: &mut PluginOptions, doc: PackDocument, path: &Path) -> Result<()> {
    let Some(mapping) = doc.0 else {
        return Ok(());
    };

    for (label, items) in mapping {
        let label = stringify(&label);
        let category = normalize_category(&label);
        let values = out.entry(category.as_str().to_string()).or_default();
        match items {
            Value::Sequence(items) => {
                values.extend(items.iter().filter(|i| !i.is_null()).map(|i| stringify(i).trim().to_string()));
            }
            Value::Null => {}
            Value::Mapping(_) => {
                return Err(CanonicalError::malformed(
                    path,
                    format!("expected a list of values for '{}', found a mapping", label),
                ));
            }
            scalar => values.push(stringify(&scalar).trim().to_string()),
        }
    }
    Ok(())
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
