//! The merged, section-keyed configuration store.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use super::resolve;
use super::value::{Value, ValueMap};
use super::ConfigError;

/// Reserved section whose scalar entries are injected as properties into
/// every object the factory constructs.
pub const GLOBAL_SECTION: &str = "global";

/// Reserved section configuring the object factory itself.
pub const OBJECT_FACTORY_SECTION: &str = "objectFactory";

fn empty_map() -> &'static ValueMap {
    static EMPTY: OnceLock<ValueMap> = OnceLock::new();
    EMPTY.get_or_init(ValueMap::new)
}

/// The resolved configuration tree: an ordered mapping from section name to
/// section value, plus the list of files that contributed to it.
///
/// Lookups are case-sensitive exact matches. A missing section reads as an
/// empty mapping, never an error.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_file: PathBuf,
    config_files: Vec<PathBuf>,
    sections: IndexMap<String, Value>,
    base_dir: String,
    user_dir: String,
}

impl ConfigStore {
    /// Creates a store from already-parsed section data.
    ///
    /// `config_files` is the ordered contributing-file list: the entry file
    /// followed by every file merged through an import directive.
    pub fn new(
        config_file: PathBuf,
        sections: IndexMap<String, Value>,
        config_files: Vec<PathBuf>,
    ) -> Self {
        Self {
            config_file,
            config_files,
            sections,
            base_dir: String::new(),
            user_dir: String::new(),
        }
    }

    /// The entry configuration file this store was loaded from.
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Every file that contributed to this store, entry file first.
    pub fn config_files(&self) -> &[PathBuf] {
        &self.config_files
    }

    /// The directory containing the entry configuration file.
    pub fn config_dir(&self) -> String {
        self.config_file
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    /// The application root directory, falling back to the entry file's
    /// directory when unset.
    pub fn base_dir(&self) -> String {
        if self.base_dir.is_empty() {
            self.config_dir()
        } else {
            self.base_dir.clone()
        }
    }

    pub fn set_base_dir(&mut self, value: impl Into<String>) {
        self.base_dir = value.into();
    }

    /// The user directory, falling back to [`base_dir`](Self::base_dir) when
    /// unset.
    pub fn user_dir(&self) -> String {
        if self.user_dir.is_empty() {
            self.base_dir()
        } else {
            self.user_dir.clone()
        }
    }

    pub fn set_user_dir(&mut self, value: impl Into<String>) {
        self.user_dir = value.into();
    }

    /// The full section tree, including reserved hidden keys.
    pub fn all_values(&self) -> &IndexMap<String, Value> {
        &self.sections
    }

    /// All entries of one section. Missing sections and sections that are not
    /// maps read as an empty mapping.
    pub fn values(&self, section: &str) -> &ValueMap {
        match self.sections.get(section) {
            Some(Value::Map(entries)) => entries,
            _ => empty_map(),
        }
    }

    /// One entry of one section.
    pub fn get(&self, section: &str, name: &str) -> Option<&Value> {
        self.values(section).get(name)
    }

    /// Shorthand for a lookup in the reserved global section.
    pub fn global_value(&self, name: &str) -> Option<&Value> {
        self.get(GLOBAL_SECTION, name)
    }

    /// Inserts or overwrites one entry, creating the section as needed.
    pub fn set_value(&mut self, section: &str, name: &str, value: impl Into<Value>) {
        let slot = self
            .sections
            .entry(section.to_string())
            .or_insert_with(|| Value::Map(ValueMap::new()));
        if !matches!(slot, Value::Map(_)) {
            *slot = Value::Map(ValueMap::new());
        }
        if let Value::Map(entries) = slot {
            entries.insert(name.to_string(), value.into());
        }
    }

    /// Expands placeholder expressions in `raw` against this store.
    ///
    /// See the module documentation of [`resolve`](super::resolve) for the
    /// substitution rules.
    pub fn resolve(&self, raw: &str) -> String {
        resolve::resolve(raw, self)
    }

    /// Deserializes one section into a typed struct.
    ///
    /// Deserialization happens once per call; callers that read a section
    /// repeatedly should keep the returned value.
    pub fn section_as<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
        let table: toml::value::Table = self
            .values(section)
            .iter()
            .map(|(key, value)| (key.clone(), value.to_toml()))
            .collect();
        toml::Value::Table(table)
            .try_into()
            .map_err(|source| ConfigError::DeserializeError {
                section: section.to_string(),
                source,
            })
    }
}
