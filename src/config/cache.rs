//! Compiled configuration cache.
//!
//! Parsing markup with import expansion on every load is wasteful, so a
//! resolved store is persisted as a native TOML artifact next to a hidden
//! record of its contributing files. Validity is a pure mtime comparison:
//! cheap, no checksum index, and good enough for developer-controlled
//! configuration sources.

use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::resolve::{BASE_DIR_TOKEN, CONFIG_DIR_TOKEN, USER_DIR_TOKEN};
use super::store::ConfigStore;
use super::value::Value;

/// Hidden section key holding the ordered contributing-file list inside a
/// cache artifact.
pub(crate) const CONFIG_FILES_KEY: &str = "_markup-source-files";

/// Default cache directory template.
pub(crate) const DEFAULT_CACHE_DIR: &str = "${configDir}/../var/cache";

/// Computes the cache artifact path for an entry file: the directory template
/// with its reserved tokens substituted, joined with a deterministic hash of
/// the entry path.
pub(crate) fn cache_file(template: &str, entry: &Path, base_dir: &str, user_dir: &str) -> PathBuf {
    let config_dir = entry
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let dir = template
        .replace(BASE_DIR_TOKEN, base_dir)
        .replace(USER_DIR_TOKEN, user_dir)
        .replace(CONFIG_DIR_TOKEN, &config_dir);
    Path::new(&dir).join(cache_key(entry))
}

/// FNV-1a over the entry path bytes, rendered as fixed-width hex. Stable
/// across processes, unlike the std hasher.
fn cache_key(entry: &Path) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in entry.as_os_str().as_encoded_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!("{hash:016x}")
}

/// The contributing-file list recorded inside a cache-loaded store.
pub(crate) fn contributors(store: &ConfigStore) -> Vec<PathBuf> {
    match store.all_values().get(CONFIG_FILES_KEY) {
        Some(Value::List(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(PathBuf::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// True when any recorded contributor has been modified after the cache
/// artifact was written. Unreadable metadata counts as stale.
pub(crate) fn is_stale(cache_file: &Path, store: &ConfigStore) -> bool {
    let cache_time = match std::fs::metadata(cache_file).and_then(|m| m.modified()) {
        Ok(time) => time,
        Err(_) => return true,
    };
    for file in contributors(store) {
        if let Ok(time) = std::fs::metadata(&file).and_then(|m| m.modified()) {
            if time > cache_time {
                return true;
            }
        }
    }
    false
}

/// Serializes a resolved store to `cache_file`, creating intermediate
/// directories as needed. The contributing-file list is embedded under
/// [`CONFIG_FILES_KEY`].
pub(crate) fn write(cache_file: &Path, store: &ConfigStore) -> Result<(), ConfigError> {
    let mut values = store.all_values().clone();
    // Top-level scalars and arrays must precede tables in the artifact.
    values.shift_insert(
        0,
        CONFIG_FILES_KEY.to_string(),
        Value::List(
            store
                .config_files()
                .iter()
                .map(|f| Value::String(f.display().to_string()))
                .collect(),
        ),
    );

    let table: toml::value::Table = values
        .iter()
        .map(|(key, value)| (key.clone(), value.to_toml()))
        .collect();
    let body =
        toml::to_string(&table).map_err(|source| ConfigError::CacheEncodeError {
            path: cache_file.to_path_buf(),
            source,
        })?;

    let io_err = |source| ConfigError::CacheWriteError {
        path: cache_file.to_path_buf(),
        source,
    };
    if let Some(dir) = cache_file.parent() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    std::fs::write(cache_file, body).map_err(io_err)
}
