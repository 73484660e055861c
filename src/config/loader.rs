//! Entry-point loading and the store registry.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::cache;
use super::markup;
use super::native;
use super::store::ConfigStore;
use super::value::Value;
use super::ConfigError;

/// Loads configuration entry files into [`ConfigStore`]s and owns the
/// per-path registry of loaded stores.
///
/// Markup sources (`.xml`) go through the compiled-cache layer; native
/// sources (`.toml`) are read directly. Repeated loads of the same path
/// return the same shared store.
///
/// ## Example
///
/// ```no_run
/// use conwire::ConfigLoader;
///
/// let mut loader = ConfigLoader::new()
///     .with_base_dir("/srv/app")
///     .with_cache_dir("${baseDir}/var/cache");
/// let store = loader.load("conf/app.xml")?;
/// # Ok::<(), conwire::ConfigError>(())
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    base_dir: String,
    user_dir: String,
    cache_dir: String,
    debug: bool,
    ext_values: Vec<(String, String, Value)>,
    loaded: HashMap<PathBuf, Rc<ConfigStore>>,
}

impl ConfigLoader {
    /// Creates a loader with the default cache directory template
    /// (`${configDir}/../var/cache`).
    pub fn new() -> Self {
        Self {
            cache_dir: cache::DEFAULT_CACHE_DIR.to_string(),
            ..Self::default()
        }
    }

    /// Sets the application root directory bound to `${baseDir}`.
    #[must_use]
    pub fn with_base_dir(mut self, value: impl Into<String>) -> Self {
        self.base_dir = value.into();
        self
    }

    /// Sets the user directory bound to `${userDir}`.
    #[must_use]
    pub fn with_user_dir(mut self, value: impl Into<String>) -> Self {
        self.user_dir = value.into();
        self
    }

    /// Sets the cache directory template. The template may use the
    /// `${baseDir}`, `${userDir}` and `${configDir}` tokens.
    #[must_use]
    pub fn with_cache_dir(mut self, value: impl Into<String>) -> Self {
        self.cache_dir = value.into();
        self
    }

    /// Debug mode treats every cache artifact as stale.
    #[must_use]
    pub fn with_debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    /// Adds an overlay entry written into every loaded store before it is
    /// shared, overriding whatever the sources declared for that key.
    #[must_use]
    pub fn with_ext_value(
        mut self,
        section: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.ext_values
            .push((section.into(), name.into(), value.into()));
        self
    }

    /// Loads the configuration rooted at `path`.
    ///
    /// A path loaded before returns its already-built store.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Rc<ConfigStore>, ConfigError> {
        let path = path.as_ref();
        if let Some(store) = self.loaded.get(path) {
            return Ok(store.clone());
        }

        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let mut store = match ext.as_str() {
            "toml" => {
                let sections = native::load(path)?;
                ConfigStore::new(path.to_path_buf(), sections, vec![path.to_path_buf()])
            }
            "xml" => self.load_markup(path)?,
            _ => return Err(ConfigError::UnsupportedSourceType(path.to_path_buf())),
        };

        store.set_base_dir(&self.base_dir);
        store.set_user_dir(&self.user_dir);
        for (section, name, value) in &self.ext_values {
            store.set_value(section, name, value.clone());
        }
        let store = Rc::new(store);
        self.loaded.insert(path.to_path_buf(), store.clone());
        Ok(store)
    }

    fn load_markup(&self, entry: &Path) -> Result<ConfigStore, ConfigError> {
        let cache_file = cache::cache_file(&self.cache_dir, entry, &self.base_dir, &self.user_dir);
        if cache_file.exists() {
            if let Some(store) = self.try_cache(&cache_file, entry) {
                return Ok(store);
            }
        }

        if !entry.exists() {
            return Err(ConfigError::SourceNotFound(entry.to_path_buf()));
        }
        let doc = markup::load(entry)?;
        let store = ConfigStore::new(entry.to_path_buf(), doc.sections, doc.files);
        if let Err(e) = cache::write(&cache_file, &store) {
            // The cache is an optimization; a failed write never fails the load.
            tracing::warn!(cache = %cache_file.display(), error = %e, "failed to write configuration cache");
        }
        Ok(store)
    }

    fn try_cache(&self, cache_file: &Path, entry: &Path) -> Option<ConfigStore> {
        let store = match native::load_cache(cache_file, entry) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(cache = %cache_file.display(), error = %e, "failed to read configuration cache");
                return None;
            }
        };
        if !entry.exists() {
            // The source is gone; the cache is all there is.
            tracing::debug!(entry = %entry.display(), "markup source missing, trusting cache");
            return Some(store);
        }
        if self.debug {
            return None;
        }
        if cache::is_stale(cache_file, &store) {
            tracing::debug!(entry = %entry.display(), "configuration cache is stale");
            return None;
        }
        tracing::debug!(entry = %entry.display(), "configuration cache hit");
        Some(store)
    }
}
