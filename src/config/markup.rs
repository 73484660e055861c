//! Structured-markup configuration source.
//!
//! A markup document's top-level elements become the store's sections. Four
//! attribute names are reserved: `name` keys an element, `value` ends it with
//! a literal scalar, `ref` ends it with an object-reference marker, and
//! `list="true"` turns its children into a positional sequence. Every other
//! attribute becomes a key/value entry of the composite.
//!
//! `<import file="..."/>` directives are expanded depth-first before section
//! extraction: the imported document's top-level elements are spliced in
//! place of the directive, preserving document order, and the imported path
//! is appended once to the contributing-file list. Missing import targets are
//! skipped, not an error.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::error::ConfigError;
use super::value::{Value, ValueMap};

const IMPORT_TAG: &str = "import";
const FILE_ATTR: &str = "file";
const NAME_ATTR: &str = "name";
const VALUE_ATTR: &str = "value";
const REF_ATTR: &str = "ref";
const LIST_ATTR: &str = "list";

/// A fully import-expanded markup document.
pub(crate) struct MarkupDocument {
    pub sections: IndexMap<String, Value>,
    pub files: Vec<PathBuf>,
}

/// Parses `entry` and every document it imports into section data.
pub(crate) fn load(entry: &Path) -> Result<MarkupDocument, ConfigError> {
    let mut files = vec![entry.to_path_buf()];
    let elements = expand_file(entry, &mut files)?;

    let mut sections = IndexMap::new();
    for (key, value) in elements {
        // Later definitions override earlier ones; first-seen position wins.
        sections.insert(key, value);
    }
    Ok(MarkupDocument { sections, files })
}

fn expand_file(path: &Path, files: &mut Vec<PathBuf>) -> Result<Vec<(String, Value)>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::SourceNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let doc = roxmltree::Document::parse(&text).map_err(|source| ConfigError::MarkupError {
        path: path.to_path_buf(),
        source,
    })?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    collect(doc.root_element().children(), &dir, files)
}

/// Walks sibling elements in document order, expanding import directives in
/// place. Import paths resolve relative to the importing file's directory.
fn collect<'a, 'input: 'a, I>(
    children: I,
    dir: &Path,
    files: &mut Vec<PathBuf>,
) -> Result<Vec<(String, Value)>, ConfigError>
where
    I: Iterator<Item = roxmltree::Node<'a, 'input>>,
{
    let mut out = Vec::new();
    for node in children.filter(|n| n.is_element()) {
        if node.tag_name().name() == IMPORT_TAG {
            let Some(file) = node.attribute(FILE_ATTR) else {
                continue;
            };
            let target = dir.join(file.trim_start_matches('/'));
            if !target.exists() {
                tracing::debug!(file = %target.display(), "skipping missing import");
                continue;
            }
            out.extend(expand_file(&target, files)?);
            if !files.contains(&target) {
                files.push(target);
            }
        } else {
            out.push((node_key(&node), node_value(&node, dir, files)?));
        }
    }
    Ok(out)
}

/// An element is keyed by its `name` attribute when present, else its tag.
fn node_key(node: &roxmltree::Node) -> String {
    node.attribute(NAME_ATTR)
        .unwrap_or_else(|| node.tag_name().name())
        .to_string()
}

fn node_value(
    node: &roxmltree::Node,
    dir: &Path,
    files: &mut Vec<PathBuf>,
) -> Result<Value, ConfigError> {
    // `value` and `ref` end the node with a scalar.
    if let Some(value) = node.attribute(VALUE_ATTR) {
        return Ok(Value::String(value.to_string()));
    }
    if let Some(id) = node.attribute(REF_ATTR) {
        return Ok(Value::String(format!("ref:{id}")));
    }

    let is_list = node
        .attribute(LIST_ATTR)
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");

    let children = collect(node.children(), dir, files)?;
    if is_list {
        // Positional sequence; attribute-derived keys on the node itself are
        // discarded.
        return Ok(Value::List(children.into_iter().map(|(_, v)| v).collect()));
    }

    let mut entries = ValueMap::new();
    for attr in node.attributes() {
        let name = attr.name();
        if name != NAME_ATTR && name != VALUE_ATTR && name != REF_ATTR && name != LIST_ATTR {
            entries.insert(name.to_string(), Value::String(attr.value().to_string()));
        }
    }
    for (key, value) in children {
        entries.insert(key, value);
    }
    Ok(Value::Map(entries))
}
