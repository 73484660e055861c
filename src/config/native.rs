//! Native serialized configuration source.
//!
//! A native source is a TOML file whose top-level tables are the store's
//! sections, loaded without any markup processing. The same reader backs
//! hand-authored fallback sources and compiled cache artifacts.

use std::path::Path;

use indexmap::IndexMap;

use super::error::ConfigError;
use super::store::ConfigStore;
use super::value::Value;

/// Loads a native source into section data.
pub(crate) fn load(path: &Path) -> Result<IndexMap<String, Value>, ConfigError> {
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
    let table: toml::Table = toml::from_str(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, Value::from_toml(value)))
        .collect())
}

/// Loads a compiled cache artifact.
///
/// The returned store keeps the original markup entry file as its config file
/// and sole logical dependency; the cache file itself is never a contributor.
pub(crate) fn load_cache(cache_file: &Path, entry: &Path) -> Result<ConfigStore, ConfigError> {
    let sections = load(cache_file)?;
    Ok(ConfigStore::new(
        entry.to_path_buf(),
        sections,
        vec![entry.to_path_buf()],
    ))
}
